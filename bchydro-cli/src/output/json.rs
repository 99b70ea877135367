//! JSON output formatting.

use anyhow::Result;
use bchydro_core::{FieldValue, ReportField, UsageReport};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,
    pub fields: Vec<FieldOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<IntervalOutput>,
    pub skipped_points: usize,
    #[serde(serialize_with = "serialize_datetime")]
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One report field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutput {
    pub key: &'static str,
    pub label: &'static str,
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

/// Day range of the latest point.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalOutput {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Credential check result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutput {
    pub ok: bool,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Failed cycle with no report to show.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub error: String,
    pub retryable: bool,
}

// ============================================================================
// Serialization helpers
// ============================================================================

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_datetime<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats a report with its freshness.
    pub fn format_report(
        &self,
        report: &UsageReport,
        subscriber_id: Option<&str>,
        stale: bool,
        error: Option<&str>,
    ) -> Result<String> {
        self.format(&Self::report_to_output(report, subscriber_id, stale, error))
    }

    /// Converts a report to output.
    pub fn report_to_output(
        report: &UsageReport,
        subscriber_id: Option<&str>,
        stale: bool,
        error: Option<&str>,
    ) -> ReportOutput {
        let fields = ReportField::ALL
            .into_iter()
            .map(|field| FieldOutput {
                key: field.key(),
                label: field.display_name(),
                value: field.select(report).map(|v| match v {
                    FieldValue::Amount(reading, _) => reading.to_string(),
                    FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
                }),
                unit: field.unit().map(|u| u.marker()),
            })
            .collect();

        ReportOutput {
            subscriber_id: subscriber_id.map(str::to_string),
            fields,
            interval: report
                .latest_point
                .as_ref()
                .and_then(|p| p.interval)
                .map(|i| IntervalOutput {
                    start: i.start,
                    end: i.end,
                }),
            skipped_points: report.skipped_points.len(),
            fetched_at: report.fetched_at,
            stale,
            error: error.map(str::to_string),
        }
    }
}
