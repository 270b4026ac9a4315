#![forbid(unsafe_code)]

//! Core domain model and cycle inference engine for the Ebb cycle tracker.
//!
//! This crate provides:
//! - Domain types (period boundary events, daily logs, derived statistics)
//! - Cycle statistics and predictions
//! - Per-date classification and current phase
//! - Wellbeing trend analysis
//! - Persistence (JSONL events, JSON daily logs) and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod stats;
pub mod classify;
pub mod phase;
pub mod trends;
pub mod tips;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, PredictionConfig, TrendConfig};
pub use stats::{calculate_cycle_statistics, calculate_cycle_statistics_with};
pub use classify::{day_status, events_for_date, is_in_fertile_window, is_in_period, is_ovulation_day};
pub use phase::{current_phase, current_phase_with};
pub use trends::{summarize_trends, summarize_trends_with};
pub use tips::{phase_tips, PhaseTips, COMMON_SYMPTOMS};
pub use store::{EventStore, FileStore};
pub use export::{export_daily_logs_csv, export_events_csv};
