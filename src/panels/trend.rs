//! Price trend prediction with a confidence band.

use serde::Serialize;
use serde_json::json;

use crate::api::{ApiError, Endpoint, Query};
use crate::model::{PriceData, TrendDirection, TrendFilter, TrendResult};
use crate::view::chart::{ChartKind, ChartSlot, ChartSpec, Dataset, Datum};
use crate::view::format;

use super::{Alert, PanelState, PanelUpdate, Sequencer, Session, Ticket};

pub const INSUFFICIENT_DATA: &str =
    "该品牌和内存组合没有足够的数据，无法预测价格趋势，请更换条件。";

/// Label of the upper band dataset; the lower band has an empty label.
pub const BAND_LABEL: &str = "预测区间";

/// Form input of the trend panel. Empty fields are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendRequest {
    pub brand: String,
    pub ram: String,
    pub days: String,
}

impl TrendRequest {
    pub fn new(brand: Option<&str>, ram: Option<&str>, days: Option<u32>) -> Self {
        Self {
            brand: brand.unwrap_or_default().to_string(),
            ram: ram.unwrap_or_default().to_string(),
            days: days.map(|d| d.to_string()).unwrap_or_default(),
        }
    }

    /// Form values as submitted; `days` is passed through unparsed.
    pub fn from_form(brand: Option<&str>, ram: Option<&str>, days: Option<&str>) -> Self {
        Self {
            brand: brand.unwrap_or_default().to_string(),
            ram: ram.unwrap_or_default().to_string(),
            days: days.unwrap_or_default().to_string(),
        }
    }

    /// Query pairs in fixed order `brand`, `ram`, `days`, non-empty only.
    pub fn query(&self) -> Query {
        [("brand", &self.brand), ("ram", &self.ram), ("days", &self.days)]
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect()
    }
}

/// Trend label and its colour class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectionLabel {
    pub text: &'static str,
    pub class: &'static str,
}

pub fn direction_label(trend: TrendDirection) -> DirectionLabel {
    match trend {
        TrendDirection::Rising => DirectionLabel {
            text: "上涨",
            class: "text-red-500",
        },
        TrendDirection::Falling => DirectionLabel {
            text: "下降",
            class: "text-green-500",
        },
        TrendDirection::Stable => DirectionLabel {
            text: "稳定",
            class: "text-yellow-500",
        },
    }
}

/// `品牌: X`, `品牌: X, 内存: Y`, or `全部数据`. RAM alone is not mentioned.
pub fn filter_description(filter: &TrendFilter) -> String {
    match (filter.brand.as_deref(), filter.ram.as_deref()) {
        (Some(brand), Some(ram)) if !brand.is_empty() && !ram.is_empty() => {
            format!("品牌: {brand}, 内存: {ram}")
        }
        (Some(brand), _) if !brand.is_empty() => format!("品牌: {brand}"),
        _ => "全部数据".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendView {
    pub filter_info: String,
    pub current_price: String,
    pub predicted_price: String,
    pub change_percent: String,
    pub direction: DirectionLabel,
    pub historical_points: usize,
    pub prediction_points: usize,
}

impl TrendView {
    pub fn build(result: &TrendResult) -> Self {
        let analysis = &result.trend_analysis;
        Self {
            filter_info: filter_description(&result.filter),
            current_price: format::yuan(result.current_avg_price),
            predicted_price: format::yuan(analysis.end_price),
            change_percent: format::signed_pct(analysis.change_percent).text,
            direction: direction_label(analysis.trend),
            historical_points: result.price_data.historical.len(),
            prediction_points: result.price_data.prediction.len(),
        }
    }
}

/// Combined history + prediction line chart.
///
/// Labels are history dates followed by prediction dates. History fills
/// `[0, h)`, prediction and band fill `[h, h + p)`; every other slot is
/// `null` so the lines do not overlap.
pub fn trend_chart(data: &PriceData) -> ChartSpec {
    let h = data.historical.len();
    let p = data.prediction.len();

    let labels: Vec<String> = data
        .historical
        .iter()
        .map(|pt| pt.date.clone())
        .chain(data.prediction.iter().map(|pt| pt.date.clone()))
        .collect();

    let historical: Vec<Datum> = data
        .historical
        .iter()
        .map(|pt| Datum::Value(Some(pt.price)))
        .chain(std::iter::repeat_n(Datum::Value(None), p))
        .collect();

    let pad = || std::iter::repeat_n(Datum::Value(None), h);
    let predicted: Vec<Datum> = pad()
        .chain(data.prediction.iter().map(|pt| Datum::Value(Some(pt.price))))
        .collect();
    let upper: Vec<Datum> = pad()
        .chain(data.prediction.iter().map(|pt| Datum::Value(Some(pt.upper))))
        .collect();
    let lower: Vec<Datum> = pad()
        .chain(data.prediction.iter().map(|pt| Datum::Value(Some(pt.lower))))
        .collect();

    let band = |label: &str, data: Vec<Datum>, fill: serde_json::Value| {
        Dataset::new(label, data)
            .with("borderColor", json!("rgba(247,37,133,0.0)"))
            .with("backgroundColor", json!("rgba(247,37,133,0.08)"))
            .with("pointRadius", json!(0))
            .with("borderWidth", json!(0))
            .with("fill", fill)
            .with("order", json!(1))
    };

    let datasets = vec![
        Dataset::new("历史价格", historical)
            .with("borderColor", json!("#4361ee"))
            .with("backgroundColor", json!("rgba(67, 97, 238, 0.1)"))
            .with("borderWidth", json!(2))
            .with("pointRadius", json!(3))
            .with("tension", json!(0.3))
            .with("fill", json!(false)),
        Dataset::new("预测价格", predicted)
            .with("borderColor", json!("#f72585"))
            .with("backgroundColor", json!("rgba(247, 37, 133, 0.1)"))
            .with("borderWidth", json!(2))
            .with("borderDash", json!([5, 5]))
            .with("pointRadius", json!(3))
            .with("tension", json!(0.3))
            .with("fill", json!(false)),
        band(BAND_LABEL, upper, json!("-1")),
        band("", lower, json!(false)),
    ];

    ChartSpec::new(ChartKind::Line, labels, datasets)
        .titled("价格趋势预测")
        .axis_title("x", "日期")
        .axis_title("y", "价格 (元)")
        .option(&["plugins", "legend", "display"], json!(true))
        // Band datasets are excluded from legend and tooltip by index.
        .option(&["plugins", "legend", "hiddenDatasets"], json!([2, 3]))
        .option(&["plugins", "tooltip", "hiddenDatasets"], json!([2, 3]))
}

#[derive(Debug, Serialize)]
pub struct TrendPanel {
    #[serde(skip)]
    seq: Sequencer,
    #[serde(flatten)]
    pub state: PanelState<TrendView>,
    pub chart: ChartSlot,
}

impl Default for TrendPanel {
    fn default() -> Self {
        Self {
            seq: Sequencer::default(),
            state: PanelState::default(),
            chart: ChartSlot::new("priceTrendChart"),
        }
    }
}

impl TrendPanel {
    pub const NAME: &'static str = "trend";
    const FAILURE_PREFIX: &'static str = "预测失败";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Ticket {
        self.state.start();
        self.seq.issue()
    }

    pub fn apply(&mut self, ticket: Ticket, result: Result<TrendResult, ApiError>) -> PanelUpdate {
        if !self.seq.is_current(ticket) {
            return PanelUpdate::Stale;
        }
        match result {
            Ok(data) if !data.has_data() => {
                self.chart.dispose();
                self.state.fail();
                PanelUpdate::Failed(Alert::new(INSUFFICIENT_DATA))
            }
            Ok(data) => {
                self.chart.replace(trend_chart(&data.price_data));
                self.state.show(TrendView::build(&data));
                PanelUpdate::Rendered
            }
            Err(e) => {
                self.chart.dispose();
                self.state.fail();
                PanelUpdate::Failed(Alert::from_api(Self::FAILURE_PREFIX, &e))
            }
        }
    }

    pub fn run(&mut self, session: &Session, request: &TrendRequest) -> PanelUpdate {
        let ticket = self.begin();
        let query = request.query();
        let fetched = session.fetch(Endpoint::PriceTrendPrediction, |c| {
            c.price_trend_prediction(&query)
        });
        let meta = fetched.meta();
        let update = self.apply(ticket, fetched.result);
        session.record(Self::NAME, ticket, &meta, &update);
        update
    }

    pub fn view(&self) -> Option<&TrendView> {
        self.state.shown()
    }
}
