//! Domain models.
//!
//! - [`report`] - The per-cycle usage report and its parts
//! - [`reading`] - Unit-stripped provider values
//! - [`fields`] - Field selectors over a report

pub mod fields;
pub mod reading;
pub mod report;

pub use fields::{FieldValue, ReportField};
pub use reading::{Reading, Unit, strip_unit_suffix};
pub use report::{BillingSummary, Interval, Quality, UsageDataPoint, UsageReport};
