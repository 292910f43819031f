use serde::{Deserialize, Serialize};

use super::de;

/// Payload of `/api/price_trend_prediction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    #[serde(default)]
    pub filter: TrendFilter,
    /// Average price over the filtered listings. Zero means the filter
    /// matched nothing and the prediction is meaningless.
    #[serde(default, deserialize_with = "de::number")]
    pub current_avg_price: f64,
    pub trend_analysis: TrendAnalysis,
    #[serde(default)]
    pub price_data: PriceData,
}

impl TrendResult {
    pub fn has_data(&self) -> bool {
        self.current_avg_price != 0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendFilter {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub ram: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    #[serde(default, deserialize_with = "de::optional_number")]
    pub start_price: Option<f64>,
    #[serde(default, deserialize_with = "de::number")]
    pub end_price: f64,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub change: Option<f64>,
    #[serde(default, deserialize_with = "de::number")]
    pub change_percent: f64,
    #[serde(default)]
    pub trend: TrendDirection,
}

/// Direction of the predicted series. Anything the server sends besides
/// `rising`/`falling` reads as stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    #[default]
    #[serde(other)]
    Stable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    #[serde(default)]
    pub historical: Vec<PricePoint>,
    #[serde(default)]
    pub prediction: Vec<PredictionPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    #[serde(default, deserialize_with = "de::number")]
    pub price: f64,
}

/// A predicted price with its confidence band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: String,
    #[serde(default, deserialize_with = "de::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub lower: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub upper: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_trend_reads_as_stable() {
        let analysis: TrendAnalysis =
            serde_json::from_str(r#"{"end_price": 5000, "change_percent": 0.4, "trend": "sideways"}"#)
                .unwrap();
        assert_eq!(analysis.trend, TrendDirection::Stable);

        let analysis: TrendAnalysis =
            serde_json::from_str(r#"{"end_price": 5000, "change_percent": 3.2, "trend": "rising"}"#)
                .unwrap();
        assert_eq!(analysis.trend, TrendDirection::Rising);
    }

    #[test]
    fn zero_price_means_no_data() {
        let result: TrendResult = serde_json::from_str(
            r#"{"filter": {"brand": "Nobody", "ram": null}, "current_avg_price": 0,
                "trend_analysis": {"end_price": 0, "change_percent": 0, "trend": "stable"},
                "price_data": {"historical": [], "prediction": []}}"#,
        )
        .unwrap();
        assert!(!result.has_data());
        assert_eq!(result.filter.brand.as_deref(), Some("Nobody"));
    }
}
