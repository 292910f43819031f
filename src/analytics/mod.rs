//! Local analytics about the dashboard's own requests.

pub mod requests;
