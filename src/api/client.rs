//! Analytics backend HTTP client.
//!
//! Talks to the analytics service using the synchronous `ureq` client.
//! Every endpoint returns the same `{success, data, message}` envelope; this
//! client unwraps it and hands typed payloads to the panels.
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::schema::ApiConfig;
use crate::model::{
    BrandRamPair, BrandStat, ClusterSet, CompetitiveResult, CpuStat, Listing, OverviewStats,
    PriceRangeBucket, PriceSalesCorrelation, RamStat, Sentiment, TrendResult,
};

use super::endpoint::{Endpoint, Envelope};
use super::error::ApiError;

/// Query parameters in the order they are appended to the URL.
pub type Query = Vec<(&'static str, String)>;

/// Synchronous analytics API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        // "localhost" may resolve to ::1 first while the backend binds IPv4 only.
        let base_url = base_url
            .trim_end_matches('/')
            .replace("://localhost", "://127.0.0.1");
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url,
            agent,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL for an endpoint, without query parameters.
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Check whether the backend answers at all.
    ///
    /// Uses a short timeout (3 s) and the cheapest aggregate endpoint.
    pub fn is_healthy(&self) -> bool {
        let url = self.url(Endpoint::OverviewStats);
        match self.agent.get(&url).timeout(Duration::from_secs(3)).call() {
            Ok(resp) => resp
                .into_json::<Envelope<serde_json::Value>>()
                .map(|env| env.success)
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// GET an endpoint and unwrap its envelope.
    pub fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(endpoint);
        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        log::debug!("GET {} {:?}", url, query);

        let response = match request.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, _)) => {
                return Err(ApiError::Status { endpoint, status });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ApiError::Transport {
                    endpoint,
                    message: transport.to_string(),
                });
            }
        };

        let envelope: Envelope<T> = response.into_json().map_err(|e| ApiError::Decode {
            endpoint,
            message: e.to_string(),
        })?;
        envelope.into_result(endpoint)
    }

    // -----------------------------------------------------------------------
    // Typed endpoints
    // -----------------------------------------------------------------------

    pub fn overview_stats(&self) -> Result<OverviewStats, ApiError> {
        self.fetch(Endpoint::OverviewStats, &[])
    }

    pub fn brand_analysis(&self) -> Result<Vec<BrandStat>, ApiError> {
        self.fetch(Endpoint::BrandAnalysis, &[])
    }

    pub fn ram_analysis(&self) -> Result<Vec<RamStat>, ApiError> {
        self.fetch(Endpoint::RamAnalysis, &[])
    }

    pub fn cpu_analysis(&self) -> Result<Vec<CpuStat>, ApiError> {
        self.fetch(Endpoint::CpuAnalysis, &[])
    }

    pub fn brand_ram_options(&self) -> Result<Vec<BrandRamPair>, ApiError> {
        self.fetch(Endpoint::BrandRamOptions, &[])
    }

    pub fn price_range_analysis(&self) -> Result<Vec<PriceRangeBucket>, ApiError> {
        self.fetch(Endpoint::PriceRangeAnalysis, &[])
    }

    pub fn price_sales_correlation(&self) -> Result<PriceSalesCorrelation, ApiError> {
        self.fetch(Endpoint::PriceSalesCorrelation, &[])
    }

    pub fn competitive_analysis(&self, brand: &str) -> Result<CompetitiveResult, ApiError> {
        self.fetch(Endpoint::CompetitiveAnalysis, &[("brand", brand.to_string())])
    }

    pub fn price_trend_prediction(&self, query: &[(&'static str, String)]) -> Result<TrendResult, ApiError> {
        self.fetch(Endpoint::PriceTrendPrediction, query)
    }

    pub fn sentiment_analysis(&self, brand: &str) -> Result<Sentiment, ApiError> {
        let sentiment: Sentiment =
            self.fetch(Endpoint::SentimentAnalysis, &[("brand", brand.to_string())])?;
        Ok(sentiment.or_brand(Some(brand)))
    }

    pub fn laptop_clustering(&self) -> Result<ClusterSet, ApiError> {
        self.fetch(Endpoint::LaptopClustering, &[])
    }

    pub fn listings(&self, brand: &str) -> Result<Vec<Listing>, ApiError> {
        self.fetch(Endpoint::Listings, &[("brand", brand.to_string())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_from_default_config() {
        let client = ApiClient::from_config(&ApiConfig::default());
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
        assert_eq!(client.timeout(), Duration::from_millis(15_000));
    }

    #[test]
    fn client_normalizes_base_url() {
        let client = ApiClient::new("http://localhost:5000/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            client.url(Endpoint::CompetitiveAnalysis),
            "http://127.0.0.1:5000/api/competitive_analysis"
        );
    }

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500));
        let err = client.overview_stats().unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
        assert_eq!(err.endpoint(), Endpoint::OverviewStats);
        assert!(!client.is_healthy());
    }
}
