use serde::{Deserialize, Serialize};

use super::de;

/// Payload of `/api/competitive_analysis?brand=`.
///
/// Competitors are brands whose products fall within ±20% of the target
/// brand's average price; the server sorts them by total sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveResult {
    #[serde(default)]
    pub target_brand: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    pub target_count: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub target_avg_price: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub target_total_sales: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_market_sales: u64,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

/// A competing brand, with signed differences against the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(deserialize_with = "de::text")]
    pub brand: String,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub price_diff_percent: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_sales: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub sales_diff_percent: f64,
}
