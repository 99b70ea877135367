//! Usage report types.
//!
//! This module contains the record one update cycle produces:
//! - [`UsageReport`] - Latest usable point plus billing summary
//! - [`UsageDataPoint`] - A single `Series/Point` reading
//! - [`Quality`] - The provider's reliability tag
//! - [`BillingSummary`] - Current billing period figures

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::reading::Reading;

// ============================================================================
// Quality
// ============================================================================

/// Provider reliability tag of a data point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    /// Metered value.
    Actual,
    /// Provider estimate.
    Estimated,
    /// Invalid or unrecognized tag.
    Invalid,
}

impl Quality {
    /// Classifies a provider quality string.
    ///
    /// Matching is exact. Anything that is not a known tag is `Invalid`, so
    /// unverified data is never reported as metered.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "ACTUAL" => Quality::Actual,
            "ESTIMATED" => Quality::Estimated,
            _ => Quality::Invalid,
        }
    }

    /// Returns true for metered values.
    pub fn is_usable(self) -> bool {
        self == Quality::Actual
    }
}

// ============================================================================
// Data Point
// ============================================================================

/// Day range a data point covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// First day of the range.
    pub start: NaiveDate,
    /// Last day of the range.
    pub end: NaiveDate,
}

impl Interval {
    /// A range covering a single day.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }
}

/// A single `Series/Point` reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDataPoint {
    /// Classified quality.
    pub quality: Quality,
    /// Quality string exactly as the provider sent it.
    pub raw_quality: String,
    /// Energy used, in kWh.
    pub value: Option<Reading>,
    /// Cost of the energy, in dollars.
    pub cost: Option<Reading>,
    /// Requested range this point answers.
    pub interval: Option<Interval>,
}

impl UsageDataPoint {
    /// Creates a point from a raw provider quality string.
    pub fn new(raw_quality: impl Into<String>) -> Self {
        let raw_quality = raw_quality.into();
        Self {
            quality: Quality::from_provider(&raw_quality),
            raw_quality,
            value: None,
            cost: None,
            interval: None,
        }
    }
}

// ============================================================================
// Billing Summary
// ============================================================================

/// Figures for the provider's current billing period.
///
/// Every field degrades independently: an attribute missing from the
/// response leaves only that field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSummary {
    /// First day of the billing period.
    pub period_start: Option<NaiveDate>,
    /// Last day of the billing period.
    pub period_end: Option<NaiveDate>,
    /// Energy used so far this period, in kWh.
    pub consumption_to_date: Option<Reading>,
    /// Cost so far this period, in dollars.
    pub cost_to_date: Option<Reading>,
    /// Projected energy for the whole period, in kWh.
    pub estimated_consumption: Option<Reading>,
    /// Projected cost for the whole period, in dollars.
    pub estimated_cost: Option<Reading>,
}

impl BillingSummary {
    /// Returns true if any field is present.
    pub fn has_data(&self) -> bool {
        self.period_start.is_some()
            || self.period_end.is_some()
            || self.consumption_to_date.is_some()
            || self.cost_to_date.is_some()
            || self.estimated_consumption.is_some()
            || self.estimated_cost.is_some()
    }
}

// ============================================================================
// Usage Report
// ============================================================================

/// Output of one update cycle.
///
/// `latest_point` and `billing` are independent: either may be absent
/// without the other being affected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    /// Most recent point with `ACTUAL` quality.
    pub latest_point: Option<UsageDataPoint>,
    /// Billing period summary.
    pub billing: Option<BillingSummary>,
    /// Points excluded from `latest_point`, kept for diagnostics.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_points: Vec<UsageDataPoint>,
    /// When the response was normalized.
    pub fetched_at: DateTime<Utc>,
}

impl UsageReport {
    /// Creates an empty report stamped now.
    pub fn new() -> Self {
        Self {
            latest_point: None,
            billing: None,
            skipped_points: Vec::new(),
            fetched_at: Utc::now(),
        }
    }

    /// Stamps the requested range onto every point of the report.
    #[must_use]
    pub fn with_interval(mut self, interval: Interval) -> Self {
        if let Some(point) = self.latest_point.as_mut() {
            point.interval = Some(interval);
        }
        for point in &mut self.skipped_points {
            point.interval = Some(interval);
        }
        self
    }

    /// Latest metered usage, in kWh.
    pub fn latest_usage(&self) -> Option<&Reading> {
        self.latest_point.as_ref().and_then(|p| p.value.as_ref())
    }

    /// Latest metered cost, in dollars.
    pub fn latest_cost(&self) -> Option<&Reading> {
        self.latest_point.as_ref().and_then(|p| p.cost.as_ref())
    }

    /// Returns true if either part of the report is present.
    pub fn has_data(&self) -> bool {
        self.latest_point.is_some() || self.billing.as_ref().is_some_and(BillingSummary::has_data)
    }

    /// Returns true if this report is older than `threshold`.
    pub fn is_stale(&self, threshold: Duration) -> bool {
        Utc::now() - self.fetched_at > threshold
    }
}

impl Default for UsageReport {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
