//! Overview progress, driven by completed requests.

use serde::Serialize;

/// Shown once every request has settled.
pub const DONE: &str = "分析完成！";

/// Status text for a completion percentage.
pub fn phase_text(percent: u8) -> &'static str {
    match percent {
        100.. => DONE,
        0..30 => "正在加载数据...",
        30..60 => "正在进行统计分析...",
        60..90 => "正在生成可视化图表...",
        _ => "正在训练预测模型...",
    }
}

/// Completed-of-total request counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    /// Record one settled request (success or failure alike).
    pub fn advance(&mut self) {
        self.completed = (self.completed + 1).min(self.total);
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.completed * 100 / self.total) as u8
    }

    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }

    pub fn status(&self) -> &'static str {
        phase_text(self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_boundaries() {
        assert_eq!(phase_text(0), "正在加载数据...");
        assert_eq!(phase_text(29), "正在加载数据...");
        assert_eq!(phase_text(30), "正在进行统计分析...");
        assert_eq!(phase_text(60), "正在生成可视化图表...");
        assert_eq!(phase_text(90), "正在训练预测模型...");
        assert_eq!(phase_text(100), DONE);
    }

    #[test]
    fn progress_tracks_completions() {
        let mut p = Progress::new(4);
        assert_eq!(p.percent(), 0);
        p.advance();
        assert_eq!(p.percent(), 25);
        assert_eq!(p.status(), "正在加载数据...");
        p.advance();
        p.advance();
        assert_eq!(p.status(), "正在生成可视化图表...");
        p.advance();
        p.advance();
        assert!(p.is_done());
        assert_eq!(p.completed, 4);
        assert_eq!(p.status(), DONE);
    }
}
