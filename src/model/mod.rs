//! Typed payloads of the analytics backend.
//!
//! These mirror the `data` member of each endpoint's envelope. They are
//! transient: fetched, transformed into view-models by the panels, and
//! dropped.

pub mod cluster;
pub mod competitive;
pub mod de;
pub mod market;
pub mod sentiment;
pub mod trend;

pub use cluster::{Cluster, ClusterSet, PriceSpan};
pub use competitive::{CompetitiveResult, Competitor};
pub use market::{
    BrandRamPair, BrandStat, CpuStat, Listing, OverviewStats, PriceRangeBucket,
    PriceSalesCorrelation, PriceSalesRow, RamStat,
};
pub use sentiment::{Keyword, Sentiment};
pub use trend::{
    PriceData, PredictionPoint, PricePoint, TrendAnalysis, TrendDirection, TrendFilter,
    TrendResult,
};
