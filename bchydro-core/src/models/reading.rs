//! Unit-stripped provider values.
//!
//! The portal renders amounts as text with the unit glued on (`"100kWh"`,
//! `"45$"`, sometimes `"$45"`). A [`Reading`] keeps the provider's digits,
//! separators included, and drops only the unit marker. The unit itself is
//! implied by the field the reading came from and is never stored.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Unit
// ============================================================================

/// Unit implied by a report field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Energy in kilowatt-hours.
    KilowattHours,
    /// Money in Canadian dollars.
    Dollars,
}

impl Unit {
    /// The marker the provider glues onto values of this unit.
    pub const fn marker(self) -> &'static str {
        match self {
            Unit::KilowattHours => "kWh",
            Unit::Dollars => "$",
        }
    }

    /// Currency markers show up on either side of the number.
    const fn may_lead(self) -> bool {
        matches!(self, Unit::Dollars)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Removes the exact unit marker from a provider value.
///
/// Only the literal marker is removed; digits, signs, thousands separators
/// and decimal points are left alone. A value that does not carry the
/// marker is returned unchanged (minus surrounding whitespace).
///
/// ```
/// use bchydro_core::{strip_unit_suffix, Unit};
///
/// assert_eq!(strip_unit_suffix("123.4kWh", Unit::KilowattHours), "123.4");
/// assert_eq!(strip_unit_suffix("$56.78", Unit::Dollars), "56.78");
/// assert_eq!(strip_unit_suffix("45$", Unit::Dollars), "45");
/// assert_eq!(strip_unit_suffix("1,234.5", Unit::KilowattHours), "1,234.5");
/// ```
pub fn strip_unit_suffix(value: &str, unit: Unit) -> &str {
    let marker = unit.marker();
    let trimmed = value.trim();
    let stripped = trimmed.strip_suffix(marker).unwrap_or(trimmed);
    let stripped = if unit.may_lead() {
        stripped.strip_prefix(marker).unwrap_or(stripped)
    } else {
        stripped
    };
    stripped.trim()
}

// ============================================================================
// Reading
// ============================================================================

/// A provider amount with its unit marker removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reading(String);

impl Reading {
    /// Builds a reading from raw provider text of the given unit.
    pub fn parse(raw: &str, unit: Unit) -> Self {
        Self(strip_unit_suffix(raw, unit).to_string())
    }

    /// The stripped provider text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if nothing remained after stripping.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Interprets the reading as a decimal number.
    ///
    /// Thousands separators are ignored. The textual form stays available
    /// through [`Reading::as_str`] so no precision is lost either way.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidDecimal`] if the text is not a number.
    pub fn to_decimal(&self) -> Result<Decimal, CoreError> {
        let digits: String = self.0.chars().filter(|c| *c != ',').collect();
        Decimal::from_str(&digits).map_err(|_| CoreError::InvalidDecimal(self.0.clone()))
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Reading {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_exact_suffix() {
        assert_eq!(strip_unit_suffix("123.4kWh", Unit::KilowattHours), "123.4");
        assert_eq!(strip_unit_suffix("100 kWh", Unit::KilowattHours), "100");
        assert_eq!(strip_unit_suffix("45$", Unit::Dollars), "45");
        assert_eq!(strip_unit_suffix("$56.78", Unit::Dollars), "56.78");
    }

    #[test]
    fn test_value_without_marker_passes_through() {
        assert_eq!(strip_unit_suffix("123.4", Unit::KilowattHours), "123.4");
        assert_eq!(strip_unit_suffix("56.78", Unit::Dollars), "56.78");
        // A kWh marker is not a dollar marker and vice versa
        assert_eq!(strip_unit_suffix("12kWh", Unit::Dollars), "12kWh");
        assert_eq!(strip_unit_suffix("$12", Unit::KilowattHours), "$12");
    }

    #[test]
    fn test_strip_is_not_digit_extraction() {
        assert_eq!(strip_unit_suffix("1,234.50kWh", Unit::KilowattHours), "1,234.50");
        assert_eq!(strip_unit_suffix("-3.20$", Unit::Dollars), "-3.20");
        // Only the trailing marker goes, lookalike text stays
        assert_eq!(strip_unit_suffix("kWh12kWh", Unit::KilowattHours), "kWh12");
    }

    #[test]
    fn test_reading_decimal_view() {
        let reading = Reading::parse("1,234.50kWh", Unit::KilowattHours);
        assert_eq!(reading.as_str(), "1,234.50");
        assert_eq!(reading.to_decimal().unwrap(), Decimal::new(123_450, 2));

        let reading = Reading::parse("45$", Unit::Dollars);
        assert_eq!(reading.to_decimal().unwrap(), Decimal::new(45, 0));
    }

    #[test]
    fn test_reading_invalid_decimal() {
        let reading = Reading::parse("n/a", Unit::Dollars);
        assert_eq!(reading.as_str(), "n/a");
        assert!(matches!(reading.to_decimal(), Err(CoreError::InvalidDecimal(_))));
    }

    #[test]
    fn test_reading_serializes_as_string() {
        let reading = Reading::parse("300kWh", Unit::KilowattHours);
        assert_eq!(serde_json::to_string(&reading).unwrap(), r#""300""#);
    }
}
