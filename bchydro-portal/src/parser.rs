//! Usage XML normalizer.
//!
//! Turns the consumption endpoint's XML into a [`UsageReport`]. The
//! document is read as a stream of events; two element paths matter:
//!
//! - `Series/Point` with `quality`, `value` and `cost` attributes
//! - `Rates` with `bpStart`, `bpEnd`, `cons2date`, `cost2date`, `estCons`
//!   and `estCost` attributes
//!
//! Anything else is ignored. A missing element or attribute leaves the
//! matching report field empty; only a document that is not well-formed is
//! an error.

use bchydro_core::{BillingSummary, Reading, Unit, UsageDataPoint, UsageReport};
use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::markup::clean_text;

const SERIES: &str = "Series";
const POINT: &str = "Point";
const RATES: &str = "Rates";

/// Parses a raw usage response into a report stamped now.
///
/// The latest point is the last `ACTUAL` point in document order; every
/// other point goes to `skipped_points`. Intervals are left unset for the
/// caller to fill in from the requested range.
///
/// # Errors
///
/// Returns [`ParseError::Malformed`] if the payload is not well-formed XML
/// or holds no elements at all.
pub fn parse_usage_report(raw: &[u8]) -> Result<UsageReport, ParseError> {
    let text = clean_text(raw);
    debug!(len = text.len(), "Parsing usage response");

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut open: Vec<String> = Vec::new();
    let mut seen_element = false;
    let mut report = UsageReport::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            ParseError::Malformed(format!("at byte {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(e) => {
                seen_element = true;
                let name = element_name(&e)?;
                visit(&e, &name, open.last().map(String::as_str), &mut report)?;
                open.push(name);
            }
            Event::Empty(e) => {
                seen_element = true;
                let name = element_name(&e)?;
                visit(&e, &name, open.last().map(String::as_str), &mut report)?;
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if open.pop().as_deref() != Some(name.as_str()) {
                    return Err(ParseError::Malformed(format!("unexpected </{name}>")));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(ParseError::Malformed(format!("unclosed <{unclosed}>")));
    }
    if !seen_element {
        return Err(ParseError::Malformed("no elements in response".to_string()));
    }

    debug!(
        has_point = report.latest_point.is_some(),
        has_billing = report.billing.is_some(),
        skipped = report.skipped_points.len(),
        "Usage response parsed"
    );
    Ok(report)
}

fn element_name(e: &BytesStart<'_>) -> Result<String, ParseError> {
    std::str::from_utf8(e.local_name().as_ref())
        .map(str::to_string)
        .map_err(|err| ParseError::Malformed(format!("element name: {err}")))
}

fn visit(
    e: &BytesStart<'_>,
    name: &str,
    parent: Option<&str>,
    report: &mut UsageReport,
) -> Result<(), ParseError> {
    match (name, parent) {
        (POINT, Some(SERIES)) => {
            let point = read_point(&Attrs::read(e)?);
            if point.quality.is_usable() {
                if let Some(previous) = report.latest_point.replace(point) {
                    debug!(raw_quality = %previous.raw_quality, "Superseded earlier ACTUAL point");
                }
            } else {
                debug!(raw_quality = %point.raw_quality, "Skipping non-ACTUAL point");
                report.skipped_points.push(point);
            }
        }
        (RATES, _) => {
            if report.billing.is_some() {
                warn!("Ignoring repeated Rates element");
            } else {
                report.billing = Some(read_rates(&Attrs::read(e)?));
            }
        }
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Attributes
// ============================================================================

/// Unescaped attributes of one element.
struct Attrs(Vec<(String, String)>);

impl Attrs {
    fn read(e: &BytesStart<'_>) -> Result<Self, ParseError> {
        let mut attrs = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| ParseError::Malformed(format!("attribute: {err}")))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|err| ParseError::Malformed(format!("attribute {key}: {err}")))?;
            attrs.push((key, value.into_owned()));
        }
        Ok(Self(attrs))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    fn reading(&self, key: &str, unit: Unit) -> Option<Reading> {
        let reading = Reading::parse(self.get(key)?, unit);
        if reading.is_empty() {
            debug!(attribute = key, "Attribute held only a unit marker");
            return None;
        }
        Some(reading)
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        let raw = self.get(key)?;
        let parsed = parse_period_date(raw);
        if parsed.is_none() {
            debug!(attribute = key, value = raw, "Unparsable billing date");
        }
        parsed
    }
}

fn read_point(attrs: &Attrs) -> UsageDataPoint {
    let mut point = UsageDataPoint::new(attrs.get("quality").unwrap_or_default());
    point.value = attrs.reading("value", Unit::KilowattHours);
    point.cost = attrs.reading("cost", Unit::Dollars);
    point
}

fn read_rates(attrs: &Attrs) -> BillingSummary {
    BillingSummary {
        period_start: attrs.date("bpStart"),
        period_end: attrs.date("bpEnd"),
        consumption_to_date: attrs.reading("cons2date", Unit::KilowattHours),
        cost_to_date: attrs.reading("cost2date", Unit::Dollars),
        estimated_consumption: attrs.reading("estCons", Unit::KilowattHours),
        estimated_cost: attrs.reading("estCost", Unit::Dollars),
    }
}

/// Reads the calendar date of a billing period boundary.
///
/// Accepts a bare `YYYY-MM-DD` or anything with a time part after `T`.
fn parse_period_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.trim().split('T').next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}
