//! Field selectors over a [`UsageReport`].
//!
//! A presentation layer renders one value per field. Rather than one type
//! per field, it walks [`ReportField::ALL`] and calls
//! [`ReportField::select`] on the current report.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::reading::{Reading, Unit};
use super::report::UsageReport;

/// Value picked out of a report by a [`ReportField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// An amount in the given unit.
    Amount(Reading, Unit),
    /// A calendar date.
    Date(NaiveDate),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Amount(reading, Unit::Dollars) => write!(f, "${reading}"),
            FieldValue::Amount(reading, unit) => write!(f, "{reading} {unit}"),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Enumerated fields of a usage report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    /// Latest metered usage.
    LatestUsage,
    /// Latest metered cost.
    LatestCost,
    /// Billing period start.
    BillingPeriodStart,
    /// Billing period end.
    BillingPeriodEnd,
    /// Consumption so far this period.
    ConsumptionToDate,
    /// Cost so far this period.
    CostToDate,
    /// Projected consumption for the period.
    EstimatedConsumption,
    /// Projected cost for the period.
    EstimatedCost,
}

impl ReportField {
    /// Every field, in display order.
    pub const ALL: [ReportField; 8] = [
        ReportField::LatestUsage,
        ReportField::LatestCost,
        ReportField::BillingPeriodStart,
        ReportField::BillingPeriodEnd,
        ReportField::ConsumptionToDate,
        ReportField::CostToDate,
        ReportField::EstimatedConsumption,
        ReportField::EstimatedCost,
    ];

    /// Stable machine key.
    pub const fn key(self) -> &'static str {
        match self {
            ReportField::LatestUsage => "latest_usage",
            ReportField::LatestCost => "latest_cost",
            ReportField::BillingPeriodStart => "billing_period_start",
            ReportField::BillingPeriodEnd => "billing_period_end",
            ReportField::ConsumptionToDate => "consumption_to_date",
            ReportField::CostToDate => "cost_to_date",
            ReportField::EstimatedConsumption => "estimated_consumption",
            ReportField::EstimatedCost => "estimated_cost",
        }
    }

    /// Human-readable label.
    pub const fn display_name(self) -> &'static str {
        match self {
            ReportField::LatestUsage => "Latest Usage",
            ReportField::LatestCost => "Latest Cost",
            ReportField::BillingPeriodStart => "Billing Period Start",
            ReportField::BillingPeriodEnd => "Billing Period End",
            ReportField::ConsumptionToDate => "Consumption To Date",
            ReportField::CostToDate => "Cost To Date",
            ReportField::EstimatedConsumption => "Estimated Consumption",
            ReportField::EstimatedCost => "Estimated Cost",
        }
    }

    /// Unit of the field, if it is an amount.
    pub const fn unit(self) -> Option<Unit> {
        match self {
            ReportField::LatestUsage
            | ReportField::ConsumptionToDate
            | ReportField::EstimatedConsumption => Some(Unit::KilowattHours),
            ReportField::LatestCost | ReportField::CostToDate | ReportField::EstimatedCost => {
                Some(Unit::Dollars)
            }
            ReportField::BillingPeriodStart | ReportField::BillingPeriodEnd => None,
        }
    }

    /// Reads this field from a report.
    pub fn select(self, report: &UsageReport) -> Option<FieldValue> {
        let billing = report.billing.as_ref();
        let amount = |reading: Option<&Reading>| {
            reading.zip(self.unit()).map(|(r, u)| FieldValue::Amount(r.clone(), u))
        };

        match self {
            ReportField::LatestUsage => amount(report.latest_usage()),
            ReportField::LatestCost => amount(report.latest_cost()),
            ReportField::BillingPeriodStart => {
                billing.and_then(|b| b.period_start).map(FieldValue::Date)
            }
            ReportField::BillingPeriodEnd => billing.and_then(|b| b.period_end).map(FieldValue::Date),
            ReportField::ConsumptionToDate => {
                amount(billing.and_then(|b| b.consumption_to_date.as_ref()))
            }
            ReportField::CostToDate => amount(billing.and_then(|b| b.cost_to_date.as_ref())),
            ReportField::EstimatedConsumption => {
                amount(billing.and_then(|b| b.estimated_consumption.as_ref()))
            }
            ReportField::EstimatedCost => amount(billing.and_then(|b| b.estimated_cost.as_ref())),
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{BillingSummary, UsageDataPoint};

    fn sample_report() -> UsageReport {
        let mut point = UsageDataPoint::new("ACTUAL");
        point.value = Some(Reading::from("12.3"));
        point.cost = Some(Reading::from("4.56"));

        let mut report = UsageReport::new();
        report.latest_point = Some(point);
        report.billing = Some(BillingSummary {
            period_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            period_end: NaiveDate::from_ymd_opt(2024, 1, 31),
            consumption_to_date: Some(Reading::from("100")),
            cost_to_date: Some(Reading::from("45")),
            estimated_consumption: None,
            estimated_cost: Some(Reading::from("90")),
        });
        report
    }

    #[test]
    fn test_select_amounts() {
        let report = sample_report();
        assert_eq!(
            ReportField::LatestUsage.select(&report),
            Some(FieldValue::Amount(Reading::from("12.3"), Unit::KilowattHours))
        );
        assert_eq!(
            ReportField::CostToDate.select(&report),
            Some(FieldValue::Amount(Reading::from("45"), Unit::Dollars))
        );
        assert_eq!(ReportField::EstimatedConsumption.select(&report), None);
    }

    #[test]
    fn test_select_on_empty_report() {
        let report = UsageReport::new();
        for field in ReportField::ALL {
            assert!(field.select(&report).is_none(), "{field} should be empty");
        }
    }

    #[test]
    fn test_field_value_display() {
        let report = sample_report();
        let shown: Vec<String> = ReportField::ALL
            .iter()
            .filter_map(|f| f.select(&report))
            .map(|v| v.to_string())
            .collect();
        assert_eq!(
            shown,
            vec!["12.3 kWh", "$4.56", "2024-01-01", "2024-01-31", "100 kWh", "$45", "$90"]
        );
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = ReportField::ALL.iter().map(|f| f.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ReportField::ALL.len());
    }
}
