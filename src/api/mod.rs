//! Client side of the analytics backend.
//!
//! All routes are `GET` and answer `{success: bool, data?, message?}`. A
//! network failure and `success: false` are both surfaced as [`ApiError`];
//! callers decide whether that becomes a blocking alert or a log line.

pub mod client;
pub mod endpoint;
pub mod error;

pub use client::{ApiClient, Query};
pub use endpoint::{Endpoint, Envelope, UNKNOWN_ERROR};
pub use error::ApiError;
