//! Terminal rendering of panel view-models and chart slots.

use colored::{ColoredString, Colorize};

use crate::panels::clustering::ClusteringView;
use crate::panels::competitive::CompetitiveView;
use crate::panels::overview::OverviewPanel;
use crate::panels::sentiment::{Bucket, SentimentView};
use crate::panels::trend::{BAND_LABEL, TrendView};
use crate::view::chart::{ChartKind, ChartSlot, ChartSpec, Datum, SlotContent};
use crate::view::format::{self, Polarity, SignedPct};

/// Terminal layout knobs from `[display]`.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub top_n: usize,
    pub bar_width: usize,
}

pub fn heading(title: &str) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(60));
}

fn section(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
}

fn field(name: &str, value: &str) {
    println!("  {} {}", format!("{name}:").bold(), value);
}

fn diff(d: &SignedPct) -> ColoredString {
    match d.polarity {
        Polarity::Positive => d.text.green(),
        Polarity::Negative => d.text.red(),
    }
}

/// Horizontal bar of `fraction` (0..=1) of `width` cells.
pub fn bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width.saturating_sub(filled)))
}

/// Truncate to `max_len` characters, appending "…" if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

pub fn chart_slot(title: &str, slot: &ChartSlot, layout: Layout) {
    section(title);
    match slot.content() {
        SlotContent::Empty => println!("  {}", "(not loaded)".dimmed()),
        SlotContent::Placeholder { message } => println!("  {}", message.dimmed()),
        SlotContent::Chart { config } => chart(config, layout),
    }
}

pub fn chart(spec: &ChartSpec, layout: Layout) {
    match spec.kind {
        ChartKind::Bar | ChartKind::Doughnut => category_chart(spec, layout),
        ChartKind::Line => line_table(spec),
        ChartKind::Scatter | ChartKind::Bubble => point_list(spec),
    }
}

fn category_chart(spec: &ChartSpec, layout: Layout) {
    let Some(dataset) = spec.datasets().first() else {
        return;
    };
    let values: Vec<f64> = dataset.data.iter().map(|d| d.magnitude().unwrap_or(0.0)).collect();
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let total: f64 = values.iter().sum();

    for (label, value) in spec.labels().iter().zip(&values).take(layout.top_n) {
        let fraction = if max > 0.0 { value / max } else { 0.0 };
        let suffix = if spec.kind == ChartKind::Doughnut && total > 0.0 {
            format!(" ({}%)", format::fixed(value / total * 100.0, 0))
        } else {
            String::new()
        };
        println!(
            "  {:<18} {} {}{}",
            truncate(label, 18),
            bar(fraction, layout.bar_width).blue(),
            format::plain(*value),
            suffix.dimmed()
        );
    }
}

fn line_table(spec: &ChartSpec) {
    let datasets = spec.datasets();
    let headers: Vec<&str> = datasets
        .iter()
        .enumerate()
        .map(|(i, ds)| match ds.label.as_str() {
            BAND_LABEL => "上限",
            "" if i > 0 => "下限",
            other => other,
        })
        .collect();

    print!("  {:<12}", "日期");
    for h in &headers {
        print!(" {h:>10}");
    }
    println!();

    for (row, label) in spec.labels().iter().enumerate() {
        print!("  {label:<12}");
        for ds in datasets {
            let cell = match ds.data.get(row).and_then(Datum::magnitude) {
                Some(v) => format::fixed(v, 2),
                None => "-".to_string(),
            };
            print!(" {cell:>10}");
        }
        println!();
    }
}

fn point_list(spec: &ChartSpec) {
    for ds in spec.datasets() {
        for d in &ds.data {
            match *d {
                Datum::Bubble { x, y, r } => println!(
                    "  {:<24} x={} y={} r={}",
                    ds.label,
                    format::fixed(x, 2),
                    format::fixed(y, 0),
                    format::fixed(r, 1)
                ),
                Datum::Point { x, y } => println!(
                    "  {} {:>10}  {} {}",
                    "价格".dimmed(),
                    format::yuan_fixed(x),
                    "销量".dimmed(),
                    format::fixed(y, 0)
                ),
                Datum::Value(_) => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

pub fn overview(panel: &OverviewPanel, layout: Layout) {
    heading("笔记本电脑市场概览");
    field("分析状态", panel.status);
    field("商品总数", &panel.summary.total_products);
    field("平均价格", &panel.summary.avg_price);
    field("总销量", &panel.summary.total_sales);
    field("品牌数量", &panel.summary.total_brands);

    if !panel.brand_rows.is_empty() {
        section("品牌统计");
        println!(
            "  {:<16} {:>6} {:>12} {:>12} {:>8}",
            "品牌", "商品数", "平均价格", "总销量", "份额"
        );
        println!("  {}", "-".repeat(58));
        for (i, row) in panel.brand_rows.iter().take(layout.top_n).enumerate() {
            let line = format!(
                "  {:<16} {:>6} {:>12} {:>12} {:>8} {}",
                truncate(&row.brand, 16),
                row.product_count,
                row.avg_price,
                row.total_sales,
                row.market_share,
                bar(row.bar_width / 100.0, layout.bar_width / 2),
            );
            if i % 2 == 0 {
                println!("{line}");
            } else {
                println!("{}", line.dimmed());
            }
        }
    }

    chart_slot("价格分布", &panel.price_distribution, layout);
    chart_slot("品牌市场份额", &panel.brand_share, layout);
    chart_slot("价格与销量关系", &panel.price_sales, layout);
    if let Some(c) = &panel.correlation {
        println!("  {} {}", "相关系数:".bold(), c);
    }
    chart_slot("内存分布", &panel.ram_distribution, layout);
    chart_slot("CPU分布", &panel.cpu_distribution, layout);
}

pub fn competitive(view: &CompetitiveView, layout: Layout) {
    heading(&format!("竞品分析 · {}", view.brand));
    field("产品数量", &view.product_count.to_string());
    field("平均价格", &view.avg_price);
    field("总销量", &view.total_sales);
    field("市场份额", &view.market_share);

    section("竞争对手");
    if let Some(message) = view.empty_message {
        println!("  {}", message.dimmed());
        return;
    }
    println!(
        "  {:<16} {:>6} {:>12} {:>10} {:>12} {:>10}",
        "品牌", "商品数", "平均价格", "价差", "总销量", "销量差"
    );
    println!("  {}", "-".repeat(72));
    for card in view.competitors.iter().take(layout.top_n) {
        println!(
            "  {:<16} {:>6} {:>12} {:>10} {:>12} {:>10}",
            truncate(&card.brand, 16),
            card.product_count,
            card.avg_price,
            diff(&card.price_diff),
            card.total_sales,
            diff(&card.sales_diff),
        );
    }
}

pub fn trend(view: &TrendView, slot: &ChartSlot, layout: Layout) {
    heading("价格趋势预测");
    field("筛选条件", &view.filter_info);
    field("当前均价", &view.current_price);
    field("预测价格", &view.predicted_price);
    field("变化幅度", &view.change_percent);
    let direction = match view.direction.class {
        "text-red-500" => view.direction.text.red(),
        "text-green-500" => view.direction.text.green(),
        _ => view.direction.text.yellow(),
    };
    println!("  {} {}", "趋势:".bold(), direction.bold());
    chart_slot("价格走势", slot, layout);
}

pub fn sentiment(view: &SentimentView, layout: Layout) {
    heading("用户评价分析");
    field("筛选条件", &view.filter_info);
    field("情感得分", &view.score);
    field("评价总数", &view.total_reviews);

    section("情感分布");
    for b in &view.bars {
        let cells = bar(b.fraction, layout.bar_width);
        let cells = match b.bucket {
            Bucket::Positive => cells.green(),
            Bucket::Neutral => cells.yellow(),
            Bucket::Negative => cells.red(),
        };
        println!("  {:<8} {} {}", b.label, cells, b.text);
    }

    section("关键词");
    println!("  {} {}", "正面:".green(), view.positive_keywords.join("  "));
    println!("  {} {}", "负面:".red(), view.negative_keywords.join("  "));

    section("平均评分");
    let stars: String = view.rating.stars.iter().map(|s| s.glyph()).collect();
    println!("  {} {}", view.rating.average.bold(), stars.yellow());
}

pub fn clustering(view: &ClusteringView, slot: &ChartSlot, layout: Layout) {
    heading("产品聚类分析");
    field("最佳聚类数", &view.best_k.to_string());

    if let Some(message) = view.empty_message {
        println!();
        println!("  {}", message.dimmed());
    }
    for card in &view.cards {
        section(&format!("{} [{}]", card.title, card.segment));
        println!("  {}", card.summary.dimmed());
        println!(
            "  平均价格 {}  平均销量 {}  平均内存 {}  受欢迎程度 {}",
            card.avg_price, card.avg_sales, card.avg_ram, card.popularity
        );
        if let Some(range) = &card.price_range {
            println!("  价格区间 {range}");
        }
        if !card.brands.is_empty() {
            println!("  主要品牌 {}", card.brands.join("  "));
        }
    }

    if !view.silhouette_scores.is_empty() {
        section("轮廓系数");
        for (k, score) in &view.silhouette_scores {
            println!("  k={k:<4} {score}");
        }
    }

    chart_slot("聚类分布", slot, layout);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(0.5, 4), "██░░");
        assert_eq!(bar(0.0, 3), "░░░");
        assert_eq!(bar(2.0, 2), "██");
        assert_eq!(bar(f64::NAN, 2), "░░");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("联想拯救者", 10), "联想拯救者");
        assert_eq!(truncate("ThinkPad X1 Carbon", 8), "ThinkPa…");
    }
}
