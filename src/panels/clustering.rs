//! Market segmentation: one card per cluster and a bubble chart.

use serde::Serialize;
use serde_json::json;

use crate::api::{ApiError, Endpoint};
use crate::model::{Cluster, ClusterSet};
use crate::view::chart::{ChartKind, ChartSlot, ChartSpec, Dataset, Datum};
use crate::view::format;

use super::{Alert, PanelState, PanelUpdate, Sequencer, Session, Ticket};

pub const NO_CLUSTERS: &str = "没有找到聚类数据";

/// Bubble colours, cycled by cluster index.
pub const PALETTE: [&str; 5] = ["#4361ee", "#f72585", "#4cc9f0", "#f8961e", "#43aa8b"];

/// Segment badge, chosen by exact segment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Economy,
    Premium,
    Mainstream,
}

impl Badge {
    pub fn for_segment(segment: &str) -> Self {
        match segment {
            "经济实惠型" => Self::Economy,
            "高端豪华型" => Self::Premium,
            _ => Self::Mainstream,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Economy => "cluster-badge economy",
            Self::Premium => "cluster-badge premium",
            Self::Mainstream => "cluster-badge mainstream",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterCard {
    pub title: String,
    pub segment: String,
    pub badge: Badge,
    pub badge_class: &'static str,
    pub summary: String,
    pub avg_price: String,
    pub avg_sales: String,
    pub avg_ram: String,
    pub popularity: String,
    /// `brand (count)` in server order.
    pub brands: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
}

impl From<&Cluster> for ClusterCard {
    fn from(c: &Cluster) -> Self {
        let badge = Badge::for_segment(&c.segment);
        Self {
            title: format!("聚类 {}", c.cluster_id + 1),
            segment: c.segment.clone(),
            badge,
            badge_class: badge.css_class(),
            summary: format!(
                "该聚类包含 {} 款产品，占总数的 {}%",
                c.size,
                format::plain(c.percentage)
            ),
            avg_price: format::yuan(c.avg_price),
            avg_sales: format::fixed(c.avg_sales, 0),
            avg_ram: format!("{}GB", format::plain(c.avg_ram)),
            popularity: c.popularity.clone(),
            brands: c
                .top_brands
                .iter()
                .map(|(brand, count)| format!("{brand} ({count})"))
                .collect(),
            price_range: c
                .price_range
                .map(|r| format!("{} - {}", format::yuan(r.min), format::yuan(r.max))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteringView {
    pub best_k: u64,
    pub cards: Vec<ClusterCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
    /// `(k, score)` pairs as reported, scores to three decimals.
    pub silhouette_scores: Vec<(String, String)>,
}

impl ClusteringView {
    pub fn build(set: &ClusterSet) -> Self {
        let cards: Vec<ClusterCard> = set.clusters.iter().map(ClusterCard::from).collect();
        Self {
            best_k: set.best_k,
            empty_message: cards.is_empty().then_some(NO_CLUSTERS),
            cards,
            silhouette_scores: set
                .silhouette_scores
                .iter()
                .map(|(k, score)| (k.clone(), format::fixed(*score, 3)))
                .collect(),
        }
    }
}

/// Bubble radius for a cluster of `size` products.
pub fn bubble_radius(size: u64) -> f64 {
    (size as f64).sqrt() * 3.0
}

/// One dataset per cluster: a single bubble at (avg price, avg sales).
pub fn cluster_chart(clusters: &[Cluster]) -> Option<ChartSpec> {
    if clusters.is_empty() {
        return None;
    }
    let datasets = clusters
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let color = PALETTE[i % PALETTE.len()];
            Dataset::new(
                format!("{} ({}款)", c.segment, c.size),
                vec![Datum::Bubble {
                    x: c.avg_price,
                    y: c.avg_sales,
                    r: bubble_radius(c.size),
                }],
            )
            // `4D` ≈ 30% alpha.
            .with("backgroundColor", json!(format!("{color}4D")))
            .with("borderColor", json!(color))
            .with("borderWidth", json!(1))
        })
        .collect();

    let grid = json!({ "color": "rgba(0, 0, 0, 0.05)" });
    Some(
        ChartSpec::new(ChartKind::Bubble, Vec::new(), datasets)
            .axis_title("x", "平均价格 (¥)")
            .axis_title("y", "平均销量")
            .option(&["scales", "x", "grid"], grid.clone())
            .option(&["scales", "y", "grid"], grid)
            .option(&["plugins", "legend", "position"], json!("top")),
    )
}

#[derive(Debug, Serialize)]
pub struct ClusteringPanel {
    #[serde(skip)]
    seq: Sequencer,
    #[serde(flatten)]
    pub state: PanelState<ClusteringView>,
    pub chart: ChartSlot,
}

impl Default for ClusteringPanel {
    fn default() -> Self {
        Self {
            seq: Sequencer::default(),
            state: PanelState::default(),
            chart: ChartSlot::new("clusteringChart"),
        }
    }
}

impl ClusteringPanel {
    pub const NAME: &'static str = "clustering";
    const FAILURE_PREFIX: &'static str = "分析失败";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.state.start();
        self.seq.issue()
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<ClusterSet, ApiError>) -> PanelUpdate {
        if !self.seq.is_current(ticket) {
            return PanelUpdate::Stale;
        }
        match result {
            Ok(set) => {
                self.chart.fill(cluster_chart(&set.clusters));
                self.state.show(ClusteringView::build(&set));
                PanelUpdate::Rendered
            }
            Err(e) => {
                self.chart.dispose();
                self.state.fail();
                PanelUpdate::Failed(Alert::from_api(Self::FAILURE_PREFIX, &e))
            }
        }
    }

    pub fn run(&mut self, session: &Session) -> PanelUpdate {
        let ticket = self.begin();
        let fetched = session.fetch(Endpoint::LaptopClustering, |c| c.laptop_clustering());
        let meta = fetched.meta();
        let update = self.apply(ticket, fetched.result);
        session.record(Self::NAME, ticket, &meta, &update);
        update
    }

    pub fn view(&self) -> Option<&ClusteringView> {
        self.state.shown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(id: u64, segment: &str, size: u64) -> Cluster {
        Cluster {
            cluster_id: id,
            segment: segment.to_string(),
            size,
            percentage: 33.3,
            avg_price: 4000.0 + id as f64 * 2000.0,
            avg_sales: 1234.6,
            avg_ram: 16.0,
            popularity: "高".to_string(),
            top_brands: vec![("Lenovo".to_string(), 40), ("Acer".to_string(), 12)],
            price_range: None,
        }
    }

    fn three_clusters() -> ClusterSet {
        ClusterSet {
            best_k: 3,
            clusters: vec![
                cluster(0, "经济实惠型", 100),
                cluster(1, "高端豪华型", 25),
                cluster(2, "主流均衡型", 64),
            ],
            silhouette_scores: vec![("3".to_string(), 0.61234)],
        }
    }

    #[test]
    fn three_clusters_render_three_cards_and_datasets() {
        let mut panel = ClusteringPanel::new();
        let ticket = panel.begin();
        assert!(panel.apply(ticket, Ok(three_clusters())).is_rendered());

        let view = panel.view().unwrap();
        assert_eq!(view.best_k, 3);
        assert_eq!(view.cards.len(), 3);
        assert_eq!(view.cards[0].title, "聚类 1");
        assert_eq!(view.cards[0].badge, Badge::Economy);
        assert_eq!(view.cards[1].badge_class, "cluster-badge premium");
        assert_eq!(view.cards[2].badge, Badge::Mainstream);
        assert_eq!(view.cards[0].avg_sales, "1235");
        assert_eq!(view.cards[0].avg_ram, "16GB");
        assert_eq!(view.cards[0].brands, ["Lenovo (40)", "Acer (12)"]);
        assert_eq!(view.silhouette_scores, [("3".to_string(), "0.612".to_string())]);

        let chart = panel.chart.chart().unwrap();
        assert_eq!(chart.datasets().len(), 3);
        let radii: Vec<f64> = chart
            .datasets()
            .iter()
            .map(|ds| match ds.data[0] {
                Datum::Bubble { r, .. } => r,
                _ => panic!("expected bubble"),
            })
            .collect();
        assert_eq!(radii, [30.0, 15.0, 24.0]);
        assert_eq!(chart.datasets()[0].label, "经济实惠型 (100款)");
        assert_eq!(chart.datasets()[1].style("borderColor"), Some(&json!("#f72585")));
    }

    #[test]
    fn palette_cycles_past_five_clusters() {
        let clusters: Vec<Cluster> = (0..6).map(|i| cluster(i, "主流", 4)).collect();
        let chart = cluster_chart(&clusters).unwrap();
        assert_eq!(chart.datasets()[5].style("borderColor"), Some(&json!(PALETTE[0])));
    }

    #[test]
    fn empty_clusters_show_message_and_placeholder() {
        let mut panel = ClusteringPanel::new();
        let ticket = panel.begin();
        let empty = ClusterSet {
            best_k: 0,
            clusters: Vec::new(),
            silhouette_scores: Vec::new(),
        };
        panel.apply(ticket, Ok(empty));
        assert_eq!(panel.view().unwrap().empty_message, Some(NO_CLUSTERS));
        assert!(panel.chart.is_placeholder());
    }

    #[test]
    fn failure_after_success_drops_chart() {
        let mut panel = ClusteringPanel::new();
        let ticket = panel.begin();
        assert!(panel.apply(ticket, Ok(three_clusters())).is_rendered());

        let ticket = panel.begin();
        let err = ApiError::Server {
            endpoint: Endpoint::LaptopClustering,
            message: "数据不足".to_string(),
        };
        let update = panel.apply(ticket, Err(err));
        assert_eq!(update.alert().unwrap().message, "分析失败: 数据不足");
        assert!(panel.chart.chart().is_none());
        assert_eq!(panel.chart.disposed_count(), 1);
        assert!(panel.view().is_none());
    }
}
