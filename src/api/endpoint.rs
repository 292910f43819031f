//! Endpoint catalogue and the `{success, data, message}` response envelope.

use std::fmt;

use serde::Deserialize;

use super::error::ApiError;

/// Every backend route the dashboard consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    BrandAnalysis,
    RamAnalysis,
    BrandRamOptions,
    CompetitiveAnalysis,
    PriceTrendPrediction,
    SentimentAnalysis,
    LaptopClustering,
    OverviewStats,
    PriceRangeAnalysis,
    PriceSalesCorrelation,
    CpuAnalysis,
    Listings,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::BrandAnalysis => "/api/brand_analysis",
            Self::RamAnalysis => "/api/ram_analysis",
            Self::BrandRamOptions => "/api/brand_ram_options",
            Self::CompetitiveAnalysis => "/api/competitive_analysis",
            Self::PriceTrendPrediction => "/api/price_trend_prediction",
            Self::SentimentAnalysis => "/api/sentiment_analysis",
            Self::LaptopClustering => "/api/laptop_clustering",
            Self::OverviewStats => "/api/overview_stats",
            Self::PriceRangeAnalysis => "/api/price_range_analysis",
            Self::PriceSalesCorrelation => "/api/price_sales_correlation",
            Self::CpuAnalysis => "/api/cpu_analysis",
            Self::Listings => "/api/get_data",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Fallback shown when the server reports failure without a message.
pub const UNKNOWN_ERROR: &str = "未知错误";

/// Common response wrapper of every endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into [`ApiError::Server`].
    pub fn into_result(self, endpoint: Endpoint) -> Result<T, ApiError> {
        if !self.success {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            return Err(ApiError::Server { endpoint, message });
        }
        self.data.ok_or(ApiError::MissingData { endpoint })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_unwraps_data() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success": true, "data": [1, 2]}"#).unwrap();
        assert_eq!(env.into_result(Endpoint::BrandAnalysis).unwrap(), vec![1, 2]);
    }

    #[test]
    fn failure_carries_server_message() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success": false, "message": "有效数据量太少"}"#).unwrap();
        let err = env.into_result(Endpoint::LaptopClustering).unwrap_err();
        assert_eq!(err.server_message(), Some("有效数据量太少"));
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let env: Envelope<u32> = serde_json::from_str(r#"{"success": false}"#).unwrap();
        let err = env.into_result(Endpoint::CpuAnalysis).unwrap_err();
        assert_eq!(err.server_message(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn success_without_data_is_an_error() {
        let env: Envelope<u32> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(
            env.into_result(Endpoint::OverviewStats),
            Err(ApiError::MissingData { .. })
        ));
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Endpoint::Listings.path(), "/api/get_data");
        assert_eq!(Endpoint::PriceTrendPrediction.to_string(), "/api/price_trend_prediction");
    }
}
