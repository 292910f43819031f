//! Tab groups: exactly one tab (and its content panel) active at a time.

use serde::Serialize;

/// A tab and the content panel it reveals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tab {
    pub id: String,
    pub label: String,
    pub target: String,
}

impl Tab {
    pub fn new(id: &str, label: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            target: target.to_string(),
        }
    }
}

/// Mutually exclusive set of tabs.
#[derive(Debug, Clone, Serialize)]
pub struct TabGroup {
    tabs: Vec<Tab>,
    active: usize,
}

impl TabGroup {
    /// Build a group with the tab named `initial` active, or the first tab
    /// when `initial` is absent or unknown.
    pub fn new(tabs: Vec<Tab>, initial: Option<&str>) -> Self {
        let active = initial
            .and_then(|id| tabs.iter().position(|t| t.id == id))
            .unwrap_or(0);
        Self { tabs, active }
    }

    /// Chart tabs of the overview section.
    pub fn chart_tabs() -> Self {
        Self::new(
            vec![
                Tab::new("price-tab", "价格分布", "price-distribution"),
                Tab::new("brand-tab", "品牌份额", "brand-share"),
                Tab::new("relation-tab", "价格与销量", "price-sales"),
                Tab::new("ram-tab", "内存分布", "ram-distribution"),
                Tab::new("cpu-tab", "CPU分布", "cpu-distribution"),
            ],
            None,
        )
    }

    /// Tabs of the advanced analysis section.
    pub fn advanced_tabs() -> Self {
        Self::new(
            vec![
                Tab::new("competitive-tab", "竞品分析", "competitive"),
                Tab::new("trend-tab", "价格趋势预测", "trend"),
                Tab::new("sentiment-tab", "用户评价分析", "sentiment"),
                Tab::new("clustering-tab", "产品聚类", "clustering"),
            ],
            None,
        )
    }

    /// Activate `id`, deactivating every sibling.
    ///
    /// Returns the now-visible panel's target, or `None` (state unchanged)
    /// when no tab has that id.
    pub fn activate(&mut self, id: &str) -> Option<&str> {
        let idx = self.tabs.iter().position(|t| t.id == id)?;
        self.active = idx;
        Some(self.tabs[idx].target.as_str())
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.get(self.active)
    }

    /// Visible panel target; empty groups have none.
    pub fn visible_panel(&self) -> Option<&str> {
        self.active().map(|t| t.target.as_str())
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active().is_some_and(|t| t.id == id)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tab_active_by_default() {
        let group = TabGroup::advanced_tabs();
        assert!(group.is_active("competitive-tab"));
        assert_eq!(group.visible_panel(), Some("competitive"));
    }

    #[test]
    fn declared_initial_tab_wins() {
        let group = TabGroup::new(
            vec![Tab::new("a", "A", "pa"), Tab::new("b", "B", "pb")],
            Some("b"),
        );
        assert_eq!(group.visible_panel(), Some("pb"));
    }

    #[test]
    fn activate_switches_exactly_one() {
        let mut group = TabGroup::chart_tabs();
        assert_eq!(group.activate("ram-tab"), Some("ram-distribution"));
        let active: Vec<_> = group
            .tabs()
            .iter()
            .filter(|t| group.is_active(&t.id))
            .collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "ram-tab");
    }

    #[test]
    fn unknown_tab_leaves_state() {
        let mut group = TabGroup::chart_tabs();
        group.activate("cpu-tab");
        assert_eq!(group.activate("missing"), None);
        assert!(group.is_active("cpu-tab"));
    }
}
