//! Laptop market analytics dashboard.
//!
//! Fetches pre-computed analyses from the backend API, turns them into
//! panel view-models and chart configurations, and renders them in the
//! terminal ([`cli`]) or an embedded web page ([`web`]).

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod model;
pub mod panels;
pub mod view;
pub mod web;
