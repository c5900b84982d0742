//! # idmd - interactive data manipulation and description
//!
//! idmd is the engine behind a small data-exploration workflow: load a
//! table, reshape its columns, clean up zeros, missing values or outliers,
//! then look at it through charts and a multi-page report.
//!
//! ## Quick Start
//!
//! ```no_run
//! use idmd::manipulation::{ReplacementSpec, replace_values, swap_columns};
//! use idmd::report::{PageSize, ReportSelection, build_report, save_report};
//! use std::path::Path;
//!
//! # fn example() -> idmd::error::Result<()> {
//! let df = idmd::data::load_df(Path::new("data.csv"))?;
//!
//! let df = swap_columns(&df, "price", "quantity")?;
//! let spec: ReplacementSpec = "price:outliers:median".parse()?;
//! let df = replace_values(&df, &spec)?;
//!
//! let report = build_report(&df, &ReportSelection::default())?;
//! save_report(&report, Path::new("data_report.pdf"), &PageSize::A4)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`manipulation`]: column swap/drop/select, value replacement and
//!   replayable operation pipelines
//! - [`session`]: original plus working copy of a dataset with edit history
//! - [`data`]: loading and CSV export, synthetic dataset generation,
//!   previews and descriptive statistics
//! - [`viz`]: line, bar, heatmap and histogram figures, rendered with plotters
//! - [`report`]: three-page report assembly and PDF export
//! - [`config`]: persisted settings
//! - [`logging`]: tracing subscriber setup for binaries
//! - [`error`]: error types and handling utilities
//! - [`utils`]: column lookup and formatting helpers
//!
//! ## Key Concepts
//!
//! ### Tables are never edited in place
//!
//! Every operation borrows a `DataFrame` and returns a new one. Keep the
//! previous table if you need to undo, or use [`session::Session`], which
//! does that for you.
//!
//! ### Missing values
//!
//! A value is *missing* when it is null, or NaN in a float column. Statistics
//! skip missing values; the `Missing` selector targets them.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod manipulation;
pub mod report;
pub mod session;
pub mod utils;
pub mod viz;
