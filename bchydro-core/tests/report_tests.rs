//! Integration tests for core report types.

use bchydro_core::{BillingSummary, Quality, Reading, ReportField, Unit, UsageDataPoint, UsageReport};

#[test]
fn test_report_serialization_roundtrip() {
    let mut point = UsageDataPoint::new("ACTUAL");
    point.value = Some(Reading::parse("12.3kWh", Unit::KilowattHours));

    let mut report = UsageReport::new();
    report.latest_point = Some(point);
    report.billing = Some(BillingSummary::default());

    let json = serde_json::to_string(&report).unwrap();
    let parsed: UsageReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
    assert_eq!(parsed.latest_point.unwrap().quality, Quality::Actual);
}

#[test]
fn test_skipped_points_omitted_when_empty() {
    let report = UsageReport::new();
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("skipped_points").is_none());
}

#[test]
fn test_every_amount_field_has_a_unit() {
    let dated = [ReportField::BillingPeriodStart, ReportField::BillingPeriodEnd];
    for field in ReportField::ALL {
        assert_eq!(field.unit().is_none(), dated.contains(&field), "{}", field.key());
    }
}
