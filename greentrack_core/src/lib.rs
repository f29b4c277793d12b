#![forbid(unsafe_code)]

//! Core domain model and backend client for GreenTrack.
//!
//! This crate provides:
//! - Domain types (metrics, entries, statistics, account payloads)
//! - The HTTP request client with error normalization
//! - Session state and its persistence
//! - Typed endpoint accessors
//! - Metric display catalog and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod client;
pub mod session;
pub mod gateway;
pub mod export;

// Re-export commonly used types
pub use error::{Error, ErrorBody, Result};
pub use types::*;
pub use catalog::{all_metrics, metric_info, MetricInfo};
pub use config::Config;
pub use client::ApiClient;
pub use session::{Session, SessionState, SessionStore};
pub use gateway::Api;
pub use export::entries_to_csv;
