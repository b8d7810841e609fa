//! # carbonsight
//!
//! Ingests greenhouse-gas activity records, validates and cleans them, derives
//! CO2-equivalent emissions and answers exploratory questions about them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use carbonsight::inventory::{self, REQUIRED_COLUMNS};
//! use std::path::PathBuf;
//!
//! # fn example() -> carbonsight::error::Result<()> {
//! let dataset = inventory::load(PathBuf::from("emissions_data.csv"))?;
//! let report = inventory::validate(&dataset, &REQUIRED_COLUMNS)?;
//! if report.has_warnings() {
//!     println!("{} missing values", report.total_missing());
//! }
//!
//! let derived = inventory::compute(&inventory::clean(&dataset)?)?;
//! let hotspots = inventory::top_emitters(&derived, 5)?;
//! let scenario = inventory::simulate_reduction(&derived, "Road Travel", 20.0)?;
//! # let _ = (hotspots, scenario);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`inventory`]: the pipeline itself
//!   - [`inventory::io`]: CSV, TSV, Parquet, JSON and spreadsheet ingestion
//!   - [`inventory::validation`]: schema checks and missing-value reports
//!   - [`inventory::calculator`]: `quantity × emission_factor`
//!   - [`inventory::analysis`]: hotspots, reduction scenarios, rollups
//! - [`report`]: exports and console tables for derived data
//! - [`config`]: persisted pipeline settings
//! - [`logging`]: tracing subscriber setup for the binary
//! - [`error`]: error taxonomy
//!
//! Every pipeline stage returns a new value; nothing mutates its input, so a
//! [`inventory::DerivedDataset`] can be shared freely between readers.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod report;
