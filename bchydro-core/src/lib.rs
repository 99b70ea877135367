// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `BCHydro` Core
//!
//! Core types and models shared by every crate of the poller.
//!
//! This crate has no I/O. It describes the normalized record the portal
//! client produces each cycle and the field selectors a presentation layer
//! reads from it.
//!
//! ## Key Types
//!
//! ### Report Types
//! - [`UsageReport`] - Output of one update cycle
//! - [`UsageDataPoint`] - A single `Series/Point` reading
//! - [`Quality`] - Provider reliability tag of a data point
//! - [`BillingSummary`] - Current billing period figures
//! - [`Interval`] - Day range a data point covers
//!
//! ### Values
//! - [`Reading`] - Provider number with its unit suffix stripped
//! - [`Unit`] - Unit implied by a field (`kWh` or `$`)
//!
//! ### Field Selectors
//! - [`ReportField`] - Enumerated view over a [`UsageReport`]
//! - [`FieldValue`] - Value selected by a [`ReportField`]

pub mod error;
pub mod models;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Report types
    BillingSummary,
    Interval,
    Quality,
    UsageDataPoint,
    UsageReport,
    // Values
    Reading,
    Unit,
    strip_unit_suffix,
    // Field selectors
    FieldValue,
    ReportField,
};
