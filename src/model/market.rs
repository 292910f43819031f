//! Market-wide aggregates: per-brand, per-RAM, per-CPU and per-price-range
//! statistics, the overview totals, and raw listings.

use serde::{Deserialize, Serialize};

use super::de;

/// Per-brand aggregate from `/api/brand_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandStat {
    #[serde(deserialize_with = "de::text")]
    pub brand: String,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_sales: u64,
}

/// Per-RAM-bucket aggregate from `/api/ram_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RamStat {
    #[serde(deserialize_with = "de::text")]
    pub ram: String,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_sales: u64,
}

/// Per-CPU aggregate from `/api/cpu_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuStat {
    #[serde(default, deserialize_with = "de::text")]
    pub cpu: String,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_sales: u64,
}

/// One observed brand/RAM combination from `/api/brand_ram_options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRamPair {
    #[serde(deserialize_with = "de::text")]
    pub brand: String,
    #[serde(default)]
    pub ram: Option<String>,
}

/// Headline totals from `/api/overview_stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewStats {
    #[serde(default, deserialize_with = "de::count")]
    pub total_products: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_sales: u64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_brands: u64,
}

/// One price bucket from `/api/price_range_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeBucket {
    #[serde(deserialize_with = "de::text")]
    pub range: String,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub total_sales: u64,
}

/// Payload of `/api/price_sales_correlation`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSalesCorrelation {
    /// Pearson coefficient between price and sales, when computable.
    #[serde(default, deserialize_with = "de::optional_number")]
    pub correlation: Option<f64>,
    #[serde(default)]
    pub price_sales_data: Vec<PriceSalesRow>,
}

/// Mean price and mean sales of one price band. Empty bands carry nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSalesRow {
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub avg_price: Option<f64>,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub avg_sales: Option<f64>,
    #[serde(default, deserialize_with = "de::count")]
    pub count: u64,
}

/// A raw product listing from `/api/get_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "de::text")]
    pub brand: String,
    #[serde(default)]
    pub ram: Option<String>,
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default, deserialize_with = "de::count")]
    pub sales: u64,
    #[serde(default, deserialize_with = "de::optional_number")]
    pub rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_stat_accepts_decimal_strings() {
        let stat: BrandStat = serde_json::from_str(
            r#"{"brand": "Lenovo", "count": 42, "avg_price": 5123.45, "total_sales": "98000"}"#,
        )
        .unwrap();
        assert_eq!(stat.total_sales, 98_000);
        assert_eq!(stat.count, 42);
    }

    #[test]
    fn correlation_tolerates_empty_bands() {
        let corr: PriceSalesCorrelation = serde_json::from_str(
            r#"{"correlation": -0.31, "price_sales_data": [
                {"price_range": "0-2000", "avg_price": 1500.0, "avg_sales": 320.5, "count": 4},
                {"price_range": "10000+", "avg_price": null, "avg_sales": null, "count": 0}
            ]}"#,
        )
        .unwrap();
        assert_eq!(corr.correlation, Some(-0.31));
        assert_eq!(corr.price_sales_data[1].avg_price, None);
    }

    #[test]
    fn listing_ignores_unknown_fields() {
        let listing: Listing = serde_json::from_str(
            r#"{"id": 7, "original_id": "A7", "name": "ThinkPad X1", "price": 9999,
                "shop": "JD", "brand": "Lenovo", "ram": "16GB", "cpu": "i7",
                "sales": 300, "rating": 4.8}"#,
        )
        .unwrap();
        assert_eq!(listing.rating, Some(4.8));
        assert_eq!(listing.brand, "Lenovo");
    }
}
