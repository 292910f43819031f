//! Market overview: summary figures, brand table and five distribution
//! charts.
//!
//! All six requests go out at once on scoped threads. Each result is sent
//! back over a channel and applied the moment it arrives, so a slow
//! endpoint never holds up the others. Progress counts settled requests.

use std::sync::mpsc;
use std::thread;

use serde::Serialize;
use serde_json::json;

use crate::api::{ApiError, Endpoint};
use crate::model::{
    BrandStat, CpuStat, OverviewStats, PriceRangeBucket, PriceSalesCorrelation, RamStat,
};
use crate::view::chart::{ChartKind, ChartSlot, ChartSpec, Dataset, Datum};
use crate::view::dropdown::ram_magnitude;
use crate::view::format;
use crate::view::progress::Progress;

use super::{Fetched, PanelUpdate, Sequencer, Session, Ticket};

/// Doughnut colours, repeated to cover every brand.
pub const SHARE_PALETTE: [&str; 9] = [
    "rgba(37, 99, 235, 0.6)",
    "rgba(6, 182, 212, 0.6)",
    "rgba(16, 185, 129, 0.6)",
    "rgba(245, 158, 11, 0.6)",
    "rgba(239, 68, 68, 0.6)",
    "rgba(139, 92, 246, 0.6)",
    "rgba(5, 150, 105, 0.6)",
    "rgba(251, 146, 60, 0.6)",
    "rgba(107, 114, 128, 0.6)",
];

// ---------------------------------------------------------------------------
// View-models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_products: String,
    pub avg_price: String,
    pub total_sales: String,
    pub total_brands: String,
}

impl From<&OverviewStats> for Summary {
    fn from(s: &OverviewStats) -> Self {
        Self {
            total_products: s.total_products.to_string(),
            avg_price: format::yuan_fixed(s.avg_price),
            total_sales: format::grouped(s.total_sales),
            total_brands: s.total_brands.to_string(),
        }
    }
}

impl Default for Summary {
    fn default() -> Self {
        Self::from(&OverviewStats::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandRow {
    pub brand: String,
    pub product_count: u64,
    pub avg_price: String,
    pub total_sales: String,
    /// `42.5%` or `--`.
    pub market_share: String,
    /// Bar width in `[0, 100]`; 0 when the share is `--`.
    pub bar_width: f64,
}

/// Table rows with each brand's share of summed sales.
pub fn brand_rows(stats: &[BrandStat]) -> Vec<BrandRow> {
    let total: u64 = stats.iter().map(|b| b.total_sales).sum();
    stats
        .iter()
        .map(|b| {
            let share = format::share(b.total_sales, total);
            BrandRow {
                brand: b.brand.clone(),
                product_count: b.count,
                avg_price: format::yuan_fixed(b.avg_price),
                total_sales: format::grouped(b.total_sales),
                market_share: format::share_label(b.total_sales, total),
                bar_width: share.map(format::clamp_pct).unwrap_or(0.0),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart builders. `None` means the dataset was empty.
// ---------------------------------------------------------------------------

fn count_bar(
    labels: Vec<String>,
    counts: Vec<f64>,
    title: &str,
    x_title: &str,
    color: (&str, &str),
) -> ChartSpec {
    let dataset = Dataset::values("商品数量", counts)
        .with("backgroundColor", json!(color.0))
        .with("borderColor", json!(color.1))
        .with("borderWidth", json!(1));
    ChartSpec::new(ChartKind::Bar, labels, vec![dataset])
        .titled(title)
        .hide_legend()
        .axis_title("x", x_title)
        .axis_title("y", "商品数量")
}

pub fn price_distribution_chart(buckets: &[PriceRangeBucket]) -> Option<ChartSpec> {
    if buckets.is_empty() {
        return None;
    }
    Some(count_bar(
        buckets.iter().map(|b| b.range.clone()).collect(),
        buckets.iter().map(|b| b.count as f64).collect(),
        "笔记本电脑价格分布",
        "价格区间 (元)",
        ("rgba(37, 99, 235, 0.6)", "rgba(37, 99, 235, 1)"),
    ))
}

pub fn brand_share_chart(stats: &[BrandStat]) -> Option<ChartSpec> {
    if stats.is_empty() {
        return None;
    }
    let colors: Vec<&str> = SHARE_PALETTE.iter().copied().cycle().take(stats.len()).collect();
    let dataset = Dataset::values("", stats.iter().map(|b| b.total_sales as f64))
        .with("backgroundColor", json!(colors))
        .with("borderWidth", json!(1))
        .with("hoverOffset", json!(15));
    Some(
        ChartSpec::new(
            ChartKind::Doughnut,
            stats.iter().map(|b| b.brand.clone()).collect(),
            vec![dataset],
        )
        .titled("品牌市场份额 (按销量)")
        .option(&["cutout"], json!("60%")),
    )
}

pub fn price_sales_chart(correlation: &PriceSalesCorrelation) -> Option<ChartSpec> {
    let points: Vec<Datum> = correlation
        .price_sales_data
        .iter()
        .filter_map(|row| match (row.avg_price, row.avg_sales) {
            (Some(x), Some(y)) => Some(Datum::Point { x, y }),
            _ => None,
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    let dataset = Dataset::new("笔记本电脑", points)
        .with("backgroundColor", json!("rgba(37, 99, 235, 0.5)"))
        .with("borderColor", json!("rgba(37, 99, 235, 1)"))
        .with("borderWidth", json!(1))
        .with("pointRadius", json!(4))
        .with("pointHoverRadius", json!(7));
    Some(
        ChartSpec::new(ChartKind::Scatter, Vec::new(), vec![dataset])
            .titled("价格与销量关系")
            .axis_title("x", "价格 (元)")
            .axis_title("y", "销量"),
    )
}

/// RAM bars, ordered by RAM size (unparsable labels last).
pub fn ram_distribution_chart(stats: &[RamStat]) -> Option<ChartSpec> {
    if stats.is_empty() {
        return None;
    }
    let mut sorted: Vec<&RamStat> = stats.iter().collect();
    sorted.sort_by_key(|s| match ram_magnitude(&s.ram) {
        Some(n) => (0, n),
        None => (1, 0),
    });
    Some(
        count_bar(
            sorted.iter().map(|s| s.ram.clone()).collect(),
            sorted.iter().map(|s| s.count as f64).collect(),
            "笔记本电脑内存分布",
            "内存容量",
            ("rgba(14, 165, 233, 0.6)", "rgba(14, 165, 233, 1)"),
        )
        .option(&["scales", "y", "beginAtZero"], json!(true))
        .option(&["scales", "y", "ticks", "precision"], json!(0)),
    )
}

pub fn cpu_distribution_chart(stats: &[CpuStat]) -> Option<ChartSpec> {
    if stats.is_empty() {
        return None;
    }
    Some(
        count_bar(
            stats.iter().map(|s| s.cpu.clone()).collect(),
            stats.iter().map(|s| s.count as f64).collect(),
            "笔记本电脑CPU分布",
            "CPU类型",
            ("rgba(139, 92, 246, 0.6)", "rgba(139, 92, 246, 1)"),
        )
        .option(&["scales", "x", "ticks"], json!({ "maxRotation": 45, "minRotation": 45 })),
    )
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// One settled overview request.
#[derive(Debug)]
pub enum OverviewMsg {
    Stats(Fetched<OverviewStats>),
    Brands(Fetched<Vec<BrandStat>>),
    PriceRanges(Fetched<Vec<PriceRangeBucket>>),
    Correlation(Fetched<PriceSalesCorrelation>),
    Rams(Fetched<Vec<RamStat>>),
    Cpus(Fetched<Vec<CpuStat>>),
}

impl OverviewMsg {
    /// Requests issued per overview run.
    pub const COUNT: usize = 6;

    fn meta(&self) -> super::RequestMeta {
        match self {
            Self::Stats(f) => f.meta(),
            Self::Brands(f) => f.meta(),
            Self::PriceRanges(f) => f.meta(),
            Self::Correlation(f) => f.meta(),
            Self::Rams(f) => f.meta(),
            Self::Cpus(f) => f.meta(),
        }
    }
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct OverviewPanel {
    #[serde(skip)]
    seq: Sequencer,
    pub progress: Progress,
    pub status: &'static str,
    pub summary: Summary,
    pub brand_rows: Vec<BrandRow>,
    /// Pearson coefficient shown beside the scatter chart.
    pub correlation: Option<String>,
    pub price_distribution: ChartSlot,
    pub brand_share: ChartSlot,
    pub price_sales: ChartSlot,
    pub ram_distribution: ChartSlot,
    pub cpu_distribution: ChartSlot,
}

impl Default for OverviewPanel {
    fn default() -> Self {
        let progress = Progress::new(OverviewMsg::COUNT);
        Self {
            seq: Sequencer::default(),
            status: progress.status(),
            progress,
            summary: Summary::default(),
            brand_rows: Vec::new(),
            correlation: None,
            price_distribution: ChartSlot::new("priceDistributionChart"),
            brand_share: ChartSlot::new("brandMarketShareChart"),
            price_sales: ChartSlot::new("priceSalesRelationshipChart"),
            ram_distribution: ChartSlot::new("ramDistributionChart"),
            cpu_distribution: ChartSlot::new("cpuDistributionChart"),
        }
    }
}

impl OverviewPanel {
    pub const NAME: &'static str = "overview";

    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run: reset progress and issue a ticket.
    pub fn begin(&mut self) -> Ticket {
        self.progress = Progress::new(OverviewMsg::COUNT);
        self.status = self.progress.status();
        self.seq.issue()
    }

    /// Apply one settled request. Failures never alert: the summary falls
    /// back to zeros, the table to empty, and a chart keeps its slot as is.
    pub fn apply(&mut self, ticket: Ticket, msg: OverviewMsg) -> PanelUpdate {
        if !self.seq.is_current(ticket) {
            return PanelUpdate::Stale;
        }

        match msg {
            OverviewMsg::Stats(f) => {
                let stats = f.result.unwrap_or_else(|e| {
                    log::warn!("overview stats unavailable: {e}");
                    OverviewStats::default()
                });
                self.summary = Summary::from(&stats);
            }
            OverviewMsg::Brands(f) => match f.result {
                Ok(stats) => {
                    self.brand_rows = brand_rows(&stats);
                    self.brand_share.fill(brand_share_chart(&stats));
                }
                Err(e) => {
                    log::warn!("brand analysis unavailable: {e}");
                    self.brand_rows.clear();
                }
            },
            OverviewMsg::PriceRanges(f) => {
                if let Some(buckets) = chart_input(f.result) {
                    self.price_distribution.fill(price_distribution_chart(&buckets));
                }
            }
            OverviewMsg::Correlation(f) => {
                if let Some(corr) = chart_input(f.result) {
                    self.correlation = corr.correlation.map(|c| format::fixed(c, 3));
                    self.price_sales.fill(price_sales_chart(&corr));
                }
            }
            OverviewMsg::Rams(f) => {
                if let Some(stats) = chart_input(f.result) {
                    self.ram_distribution.fill(ram_distribution_chart(&stats));
                }
            }
            OverviewMsg::Cpus(f) => {
                if let Some(stats) = chart_input(f.result) {
                    self.cpu_distribution.fill(cpu_distribution_chart(&stats));
                }
            }
        }

        self.progress.advance();
        self.status = self.progress.status();
        PanelUpdate::Rendered
    }

    /// Fetch everything concurrently, applying results as they arrive.
    /// `on_update` runs after each applied message.
    pub fn run(&mut self, session: &Session, mut on_update: impl FnMut(&OverviewPanel)) {
        let ticket = self.begin();
        let (tx, rx) = mpsc::channel::<OverviewMsg>();

        let jobs: [fn(&Session) -> OverviewMsg; OverviewMsg::COUNT] = [
            |s| OverviewMsg::Stats(s.fetch(Endpoint::OverviewStats, |c| c.overview_stats())),
            |s| OverviewMsg::Brands(s.fetch(Endpoint::BrandAnalysis, |c| c.brand_analysis())),
            |s| {
                OverviewMsg::PriceRanges(
                    s.fetch(Endpoint::PriceRangeAnalysis, |c| c.price_range_analysis()),
                )
            },
            |s| {
                OverviewMsg::Correlation(
                    s.fetch(Endpoint::PriceSalesCorrelation, |c| c.price_sales_correlation()),
                )
            },
            |s| OverviewMsg::Rams(s.fetch(Endpoint::RamAnalysis, |c| c.ram_analysis())),
            |s| OverviewMsg::Cpus(s.fetch(Endpoint::CpuAnalysis, |c| c.cpu_analysis())),
        ];

        thread::scope(|scope| {
            for job in jobs {
                let tx = tx.clone();
                scope.spawn(move || {
                    // The receiver outlives every sender inside this scope.
                    let _ = tx.send(job(session));
                });
            }
            drop(tx);

            for msg in rx {
                let meta = msg.meta();
                let update = self.apply(ticket, msg);
                session.record(Self::NAME, ticket, &meta, &update);
                on_update(&*self);
            }
        });
    }
}

/// Chart sources only render on success; failures are logged.
fn chart_input<T>(result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(data) => Some(data),
        Err(e) => {
            log::warn!("overview chart data unavailable: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PriceSalesRow;

    fn brand(name: &str, sales: u64) -> BrandStat {
        BrandStat {
            brand: name.to_string(),
            count: 10,
            avg_price: 5000.0,
            total_sales: sales,
        }
    }

    fn ram(label: &str, count: u64) -> RamStat {
        RamStat {
            ram: label.to_string(),
            count,
            avg_price: 0.0,
            total_sales: 0,
        }
    }

    #[test]
    fn brand_rows_compute_share() {
        let rows = brand_rows(&[brand("A", 300), brand("B", 700), brand("C", 0)]);
        assert_eq!(rows[0].market_share, "30.0%");
        assert_eq!(rows[0].bar_width, 30.0);
        assert_eq!(rows[1].total_sales, "700");
        assert_eq!(rows[2].market_share, "--");
        assert_eq!(rows[2].bar_width, 0.0);
    }

    #[test]
    fn zero_total_sales_gives_placeholder_everywhere() {
        let rows = brand_rows(&[brand("A", 0), brand("B", 0)]);
        assert!(rows.iter().all(|r| r.market_share == "--"));
    }

    #[test]
    fn doughnut_cycles_palette() {
        let stats: Vec<BrandStat> = (0..11).map(|i| brand(&format!("B{i}"), 1)).collect();
        let chart = brand_share_chart(&stats).unwrap();
        let colors = chart.datasets()[0].style("backgroundColor").unwrap();
        assert_eq!(colors.as_array().unwrap().len(), 11);
        assert_eq!(colors[9], json!(SHARE_PALETTE[0]));
        assert_eq!(chart.options["cutout"], "60%");
    }

    #[test]
    fn ram_chart_sorted_by_size() {
        let chart = ram_distribution_chart(&[ram("32GB", 3), ram("8GB", 9), ram("其他", 1), ram("16GB", 5)])
            .unwrap();
        assert_eq!(chart.labels(), ["8GB", "16GB", "32GB", "其他"]);
    }

    #[test]
    fn scatter_drops_null_points() {
        let corr = PriceSalesCorrelation {
            correlation: Some(-0.42),
            price_sales_data: vec![
                PriceSalesRow {
                    price_range: Some("0-3000".into()),
                    avg_price: Some(2500.0),
                    avg_sales: Some(800.0),
                    count: 4,
                },
                PriceSalesRow {
                    price_range: None,
                    avg_price: None,
                    avg_sales: Some(10.0),
                    count: 1,
                },
            ],
        };
        let chart = price_sales_chart(&corr).unwrap();
        assert_eq!(chart.datasets()[0].data, vec![Datum::Point { x: 2500.0, y: 800.0 }]);
    }

    #[test]
    fn empty_dataset_shows_placeholder() {
        let mut panel = OverviewPanel::new();
        let ticket = panel.begin();
        panel.apply(
            ticket,
            OverviewMsg::Cpus(Fetched::ready(Endpoint::CpuAnalysis, Ok(Vec::new()))),
        );
        assert!(panel.cpu_distribution.is_placeholder());
        assert_eq!(panel.progress.completed, 1);
    }

    #[test]
    fn failed_stats_fall_back_to_zeros() {
        let mut panel = OverviewPanel::new();
        let ticket = panel.begin();
        panel.apply(
            ticket,
            OverviewMsg::Stats(Fetched::ready(
                Endpoint::OverviewStats,
                Err(ApiError::Status {
                    endpoint: Endpoint::OverviewStats,
                    status: 500,
                }),
            )),
        );
        assert_eq!(panel.summary.avg_price, "¥0.00");
        assert_eq!(panel.summary.total_products, "0");
    }

    #[test]
    fn results_from_an_earlier_run_are_stale() {
        let mut panel = OverviewPanel::new();
        let old = panel.begin();
        let _new = panel.begin();
        let update = panel.apply(
            old,
            OverviewMsg::Brands(Fetched::ready(Endpoint::BrandAnalysis, Ok(vec![brand("A", 1)]))),
        );
        assert_eq!(update, PanelUpdate::Stale);
        assert!(panel.brand_rows.is_empty());
        assert_eq!(panel.progress.completed, 0);
    }

    #[test]
    fn progress_reaches_done_after_all_sources() {
        let mut panel = OverviewPanel::new();
        let ticket = panel.begin();
        let msgs = vec![
            OverviewMsg::Stats(Fetched::ready(Endpoint::OverviewStats, Ok(OverviewStats::default()))),
            OverviewMsg::Brands(Fetched::ready(Endpoint::BrandAnalysis, Ok(Vec::new()))),
            OverviewMsg::PriceRanges(Fetched::ready(Endpoint::PriceRangeAnalysis, Ok(Vec::new()))),
            OverviewMsg::Correlation(Fetched::ready(
                Endpoint::PriceSalesCorrelation,
                Ok(PriceSalesCorrelation::default()),
            )),
            OverviewMsg::Rams(Fetched::ready(Endpoint::RamAnalysis, Ok(Vec::new()))),
            OverviewMsg::Cpus(Fetched::ready(Endpoint::CpuAnalysis, Ok(Vec::new()))),
        ];
        for msg in msgs {
            panel.apply(ticket, msg);
        }
        assert!(panel.progress.is_done());
        assert_eq!(panel.status, crate::view::progress::DONE);
    }
}
