use serde::{Deserialize, Serialize};

use super::de;

/// Payload of `/api/laptop_clustering`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSet {
    #[serde(default, deserialize_with = "de::count")]
    pub best_k: u64,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    /// Silhouette score per candidate k, in server order.
    #[serde(default, deserialize_with = "de::ordered_numbers")]
    pub silhouette_scores: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(default, deserialize_with = "de::count")]
    pub cluster_id: u64,
    #[serde(default, deserialize_with = "de::text")]
    pub segment: String,
    #[serde(default, deserialize_with = "de::count")]
    pub size: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub percentage: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_price: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_sales: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub avg_ram: f64,
    #[serde(default, deserialize_with = "de::text")]
    pub popularity: String,
    /// Brand → product count, in the order the server ranked them.
    #[serde(default, deserialize_with = "de::ordered_counts")]
    pub top_brands: Vec<(String, u64)>,
    #[serde(default)]
    pub price_range: Option<PriceSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSpan {
    #[serde(default, deserialize_with = "de::number")]
    pub min: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_set_keeps_brand_and_score_order() {
        let set: ClusterSet = serde_json::from_str(
            r#"{"best_k": 2, "silhouette_scores": {"2": 0.41, "3": 0.38},
                "clusters": [{"cluster_id": 1, "segment": "高端豪华型", "size": 12,
                    "percentage": 30.0, "avg_price": 12999, "avg_sales": 45.5, "avg_ram": 32,
                    "popularity": "冷门", "top_brands": {"Apple": 7, "Dell": 5},
                    "price_range": {"min": 9999, "max": 18999}}]}"#,
        )
        .unwrap();
        assert_eq!(set.silhouette_scores[0], ("2".to_string(), 0.41));
        let cluster = &set.clusters[0];
        assert_eq!(cluster.top_brands[0], ("Apple".to_string(), 7));
        assert_eq!(cluster.price_range.map(|p| p.max), Some(18999.0));
    }
}
