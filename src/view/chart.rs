//! Chart specifications and the per-panel slots that own them.
//!
//! A [`ChartSpec`] serializes to a Chart.js configuration object
//! (`{type, data: {labels, datasets}, options}`); the web frontend hands it
//! to `new Chart(..)` unchanged and the terminal renderer reads the same
//! datasets to draw text bars.

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Message shown in a slot whose dataset came back empty.
pub const NO_DATA: &str = "暂无数据";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Doughnut,
    Scatter,
    Bubble,
}

/// One datum. Category charts use `Value`, scatter `Point`, bubble `Bubble`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Datum {
    /// `null` leaves a gap in a line chart.
    Value(Option<f64>),
    Point { x: f64, y: f64 },
    Bubble { x: f64, y: f64, r: f64 },
}

impl Datum {
    /// The plotted magnitude: the value itself, or `y` for points.
    pub fn magnitude(&self) -> Option<f64> {
        match *self {
            Self::Value(v) => v,
            Self::Point { y, .. } | Self::Bubble { y, .. } => Some(y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Datum>,
    /// Chart.js styling keys (`borderColor`, `borderDash`, `fill`, ...).
    #[serde(flatten)]
    pub style: Map<String, Value>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, data: Vec<Datum>) -> Self {
        Self {
            label: label.into(),
            data,
            style: Map::new(),
        }
    }

    /// Category dataset from plain values.
    pub fn values<I: IntoIterator<Item = f64>>(label: impl Into<String>, values: I) -> Self {
        Self::new(label, values.into_iter().map(|v| Datum::Value(Some(v))).collect())
    }

    /// Attach a style key.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.style.insert(key.to_string(), value);
        self
    }

    pub fn style(&self, key: &str) -> Option<&Value> {
        self.style.get(key)
    }
}

/// Chart.js configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, labels: Vec<String>, datasets: Vec<Dataset>) -> Self {
        Self {
            kind,
            data: ChartData { labels, datasets },
            options: json!({ "responsive": true, "maintainAspectRatio": false }),
        }
    }

    /// Bold 16px title at the top.
    pub fn titled(self, title: &str) -> Self {
        self.option(
            &["plugins", "title"],
            json!({ "display": true, "text": title, "font": { "size": 16, "weight": "bold" } }),
        )
    }

    /// Titled axis. `axis` is `"x"` or `"y"`.
    pub fn axis_title(self, axis: &str, text: &str) -> Self {
        self.option(
            &["scales", axis, "title"],
            json!({ "display": true, "text": text }),
        )
    }

    pub fn hide_legend(self) -> Self {
        self.option(&["plugins", "legend", "display"], json!(false))
    }

    /// Set a nested option, creating intermediate objects.
    pub fn option(mut self, path: &[&str], value: Value) -> Self {
        let Some((last, parents)) = path.split_last() else {
            return self;
        };
        let mut node = &mut self.options;
        for key in parents {
            if !node.get(*key).is_some_and(Value::is_object) {
                node[*key] = json!({});
            }
            node = &mut node[*key];
        }
        node[*last] = value;
        self
    }

    pub fn labels(&self) -> &[String] {
        &self.data.labels
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.data.datasets
    }
}

/// What a slot currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SlotContent {
    Empty,
    Chart { config: ChartSpec },
    Placeholder { message: &'static str },
}

/// Single owner of one panel's chart. Installing a new chart always
/// disposes the previous one first.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSlot {
    pub id: &'static str,
    #[serde(flatten)]
    content: SlotContent,
    #[serde(skip)]
    disposed: usize,
}

impl ChartSlot {
    pub fn new(id: &'static str) -> Self {
        Self {
            id,
            content: SlotContent::Empty,
            disposed: 0,
        }
    }

    /// Install `spec`, disposing whatever chart was there.
    pub fn replace(&mut self, spec: ChartSpec) {
        self.dispose();
        self.content = SlotContent::Chart { config: spec };
    }

    /// Dispose the chart and show the "no data" message instead.
    pub fn show_placeholder(&mut self) {
        self.dispose();
        self.content = SlotContent::Placeholder { message: NO_DATA };
    }

    /// `Some` → chart, `None` → placeholder.
    pub fn fill(&mut self, spec: Option<ChartSpec>) {
        match spec {
            Some(spec) => self.replace(spec),
            None => self.show_placeholder(),
        }
    }

    pub fn dispose(&mut self) {
        if matches!(self.content, SlotContent::Chart { .. }) {
            self.disposed += 1;
            log::trace!("disposed chart in slot {}", self.id);
        }
        self.content = SlotContent::Empty;
    }

    pub fn content(&self) -> &SlotContent {
        &self.content
    }

    pub fn chart(&self) -> Option<&ChartSpec> {
        match &self.content {
            SlotContent::Chart { config } => Some(config),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, SlotContent::Placeholder { .. })
    }

    /// How many charts this slot has torn down.
    pub fn disposed_count(&self) -> usize {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> ChartSpec {
        ChartSpec::new(
            ChartKind::Bar,
            vec!["a".into(), "b".into()],
            vec![Dataset::values("商品数量", [1.0, 2.0])],
        )
    }

    #[test]
    fn serializes_as_chartjs_config() {
        let spec = bar().titled("分布").axis_title("x", "区间").hide_legend();
        let v = serde_json::to_value(&spec).unwrap();
        assert_eq!(v["type"], "bar");
        assert_eq!(v["data"]["labels"], json!(["a", "b"]));
        assert_eq!(v["data"]["datasets"][0]["data"], json!([1.0, 2.0]));
        assert_eq!(v["options"]["plugins"]["title"]["text"], "分布");
        assert_eq!(v["options"]["plugins"]["legend"]["display"], false);
        assert_eq!(v["options"]["scales"]["x"]["title"]["text"], "区间");
    }

    #[test]
    fn dataset_style_is_flattened() {
        let ds = Dataset::new("预测价格", vec![Datum::Value(None), Datum::Value(Some(3.0))])
            .with("borderDash", json!([5, 5]));
        let v = serde_json::to_value(&ds).unwrap();
        assert_eq!(v["borderDash"], json!([5, 5]));
        assert_eq!(v["data"], json!([null, 3.0]));
    }

    #[test]
    fn bubble_points_serialize_with_radius() {
        let d = Datum::Bubble { x: 1.0, y: 2.0, r: 3.0 };
        assert_eq!(serde_json::to_value(d).unwrap(), json!({"x": 1.0, "y": 2.0, "r": 3.0}));
    }

    #[test]
    fn replace_disposes_previous_chart() {
        let mut slot = ChartSlot::new("price");
        slot.replace(bar());
        assert_eq!(slot.disposed_count(), 0);
        slot.replace(bar());
        assert_eq!(slot.disposed_count(), 1);
        slot.fill(None);
        assert_eq!(slot.disposed_count(), 2);
        assert!(slot.is_placeholder());
        // Placeholder → chart has nothing to dispose.
        slot.fill(Some(bar()));
        assert_eq!(slot.disposed_count(), 2);
        assert!(slot.chart().is_some());
    }

    #[test]
    fn slot_serializes_state() {
        let mut slot = ChartSlot::new("cpu");
        slot.show_placeholder();
        let v = serde_json::to_value(&slot).unwrap();
        assert_eq!(v["id"], "cpu");
        assert_eq!(v["state"], "placeholder");
        assert_eq!(v["message"], NO_DATA);
    }
}
