//! Decimal-safe monetary values and the precision rules applied at boundaries.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{AmountError, ValidationError};

/// Largest number of fractional digits a `Decimal` can carry.
pub const MAX_PRECISION: u32 = 28;

const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Currencies a facility can keep its cash counters in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl Currency {
    /// Returns the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "₹",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INR" => Ok(Currency::INR),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            _ => Err(ValidationError::new(format!(
                "Unknown currency: {}. Supported: INR, USD, EUR, GBP",
                s
            ))),
        }
    }
}

/// Precision settings for the two rounding boundaries.
///
/// `internal_precision` applies to values sent to the API and must be at
/// least as wide as `accounting_precision`, which applies to values shown
/// to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalConfig {
    internal_precision: u32,
    accounting_precision: u32,
}

impl DecimalConfig {
    pub fn new(internal_precision: u32, accounting_precision: u32) -> Result<Self, ValidationError> {
        if internal_precision > MAX_PRECISION {
            return Err(ValidationError::new(format!(
                "Internal precision {} exceeds the maximum of {}",
                internal_precision, MAX_PRECISION
            )));
        }
        if internal_precision < accounting_precision {
            return Err(ValidationError::new(format!(
                "Internal precision {} is narrower than accounting precision {}",
                internal_precision, accounting_precision
            )));
        }
        Ok(Self {
            internal_precision,
            accounting_precision,
        })
    }

    pub fn internal_precision(&self) -> u32 {
        self.internal_precision
    }

    pub fn accounting_precision(&self) -> u32 {
        self.accounting_precision
    }
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            internal_precision: 2,
            accounting_precision: 2,
        }
    }
}

/// An exact decimal amount of money.
///
/// Backed by `rust_decimal::Decimal`, never by binary floating point.
/// Equality and ordering are numeric, so `1.5 == 1.50`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn checked_add(self, other: Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(AmountError::Overflow("addition"))
    }

    pub fn checked_sub(self, other: Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(AmountError::Overflow("subtraction"))
    }

    pub fn checked_mul(self, other: Amount) -> Result<Amount, AmountError> {
        self.0
            .checked_mul(other.0)
            .map(Amount)
            .ok_or(AmountError::Overflow("multiplication"))
    }

    pub fn checked_div(self, other: Amount) -> Result<Amount, AmountError> {
        if other.is_zero() {
            return Err(AmountError::DivisionByZero);
        }
        self.0
            .checked_div(other.0)
            .map(Amount)
            .ok_or(AmountError::Overflow("division"))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Strictly less than zero.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Amount {
        Amount(self.0.abs())
    }

    /// Lossy conversion for charts and other display-only uses.
    ///
    /// The result must never feed back into arithmetic or an API request.
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }

    fn rounded(self, dp: u32) -> Decimal {
        let mut rounded = self.0.round_dp_with_strategy(dp, ROUNDING);
        rounded.rescale(dp);
        if rounded.is_zero() {
            rounded.set_sign_positive(true);
        }
        rounded
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Digit separators are not numeric input.
        if trimmed.contains('_') {
            return Err(AmountError::Parse(s.to_string()));
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Amount)
            .map_err(|_| AmountError::Parse(s.to_string()))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    // Go through the shortest decimal text so 50.5 stays 50.5.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        v.to_string().parse().map_err(E::custom)
    }
}

/// Rounds amounts for the API and display boundaries.
///
/// Built once at startup from an explicit `DecimalConfig`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoneyContext {
    config: DecimalConfig,
    currency: Currency,
}

impl MoneyContext {
    pub fn new(config: DecimalConfig, currency: Currency) -> Self {
        Self { config, currency }
    }

    pub fn config(&self) -> DecimalConfig {
        self.config
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The amount as it will be stored by the API.
    pub fn api_amount(&self, value: Amount) -> Amount {
        Amount(value.rounded(self.config.internal_precision))
    }

    /// Fixed-point string at internal precision.
    pub fn round_for_api(&self, value: Amount) -> String {
        value.rounded(self.config.internal_precision).to_string()
    }

    /// Fixed-point string at accounting precision.
    pub fn round_for_display(&self, value: Amount) -> String {
        value.rounded(self.config.accounting_precision).to_string()
    }

    /// Display string prefixed with the currency symbol, e.g. `-₹5.00`.
    pub fn format_currency(&self, value: Amount) -> String {
        let sign = if value.rounded(self.config.accounting_precision).is_sign_negative() {
            "-"
        } else {
            ""
        };
        format!(
            "{}{}{}",
            sign,
            self.currency.symbol(),
            self.round_for_display(value.abs())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn ctx(internal: u32, accounting: u32) -> MoneyContext {
        MoneyContext::new(DecimalConfig::new(internal, accounting).unwrap(), Currency::INR)
    }

    #[rstest]
    #[case::integer("100", dec!(100))]
    #[case::fraction("50.5", dec!(50.5))]
    #[case::padded("  12.30 ", dec!(12.30))]
    #[case::negative("-7.25", dec!(-7.25))]
    #[case::scientific("1e3", dec!(1000))]
    fn test_parse(#[case] raw: &str, #[case] expected: Decimal) {
        let amount: Amount = raw.parse().unwrap();
        assert_eq!(amount.as_decimal(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("12.3.4")]
    #[case("NaN")]
    #[case("1_000")]
    #[case("1e_3")]
    fn test_parse_rejects_non_numeric(#[case] raw: &str) {
        let result = raw.parse::<Amount>();
        assert_eq!(result, Err(AmountError::Parse(raw.to_string())));
    }

    #[test]
    fn test_exact_addition() {
        let a: Amount = "0.1".parse().unwrap();
        let b: Amount = "0.2".parse().unwrap();
        assert_eq!(a.checked_add(b).unwrap(), "0.3".parse().unwrap());
    }

    #[test]
    fn test_opening_plus_incoming_transfer() {
        let opening: Amount = "100.00".parse().unwrap();
        let incoming: Amount = "50.5".parse().unwrap();
        let expected = opening.checked_add(incoming).unwrap();
        assert_eq!(ctx(2, 2).round_for_display(expected), "150.50");
    }

    #[test]
    fn test_subtract_and_multiply() {
        let a = Amount::from(100);
        let b: Amount = "0.01".parse().unwrap();
        assert_eq!(a.checked_sub(b).unwrap().as_decimal(), dec!(99.99));
        assert_eq!(a.checked_mul(b).unwrap().as_decimal(), dec!(1.00));
    }

    #[test]
    fn test_division_by_zero() {
        let result = Amount::from(10).checked_div(Amount::ZERO);
        assert_eq!(result, Err(AmountError::DivisionByZero));
    }

    #[test]
    fn test_division() {
        let third = Amount::from(10).checked_div(Amount::from(4)).unwrap();
        assert_eq!(third.as_decimal(), dec!(2.5));
    }

    #[test]
    fn test_overflow_is_reported() {
        let max = Amount::from_decimal(Decimal::MAX);
        assert_eq!(
            max.checked_add(Amount::from(1)),
            Err(AmountError::Overflow("addition"))
        );
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Amount::ZERO.is_zero());
        assert!(!Amount::ZERO.is_positive());
        assert!(!Amount::ZERO.is_negative());
        assert!(Amount::from(1).is_positive());
        assert!(Amount::from(-1).is_negative());
    }

    #[test]
    fn test_ordering_is_numeric() {
        let a: Amount = "1.5".parse().unwrap();
        let b: Amount = "1.50".parse().unwrap();
        let c: Amount = "2".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&c), std::cmp::Ordering::Less);
        assert!(c > a && c >= b && a <= b && a < c);
    }

    #[rstest]
    #[case::pads("150.5", 2, "150.50")]
    #[case::half_up("2.345", 2, "2.35")]
    #[case::half_away_from_zero("-2.345", 2, "-2.35")]
    #[case::below_half("2.344", 2, "2.34")]
    #[case::integer("700", 2, "700.00")]
    #[case::negative_zero("-0.001", 2, "0.00")]
    #[case::no_fraction("9.5", 0, "10")]
    #[case::wide("1.23456789", 6, "1.234568")]
    fn test_round_for_api(
        #[case] raw: &str,
        #[case] precision: u32,
        #[case] expected: &str,
    ) {
        let money = ctx(precision, precision);
        assert_eq!(money.round_for_api(raw.parse().unwrap()), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("12.345")]
    #[case("-99.995")]
    #[case("1234567.891011")]
    #[case("0.00049")]
    fn test_round_for_api_is_idempotent(#[case] raw: &str) {
        for precision in [0, 2, 4, 6] {
            let money = ctx(precision, 0);
            let once = money.round_for_api(raw.parse().unwrap());
            let twice = money.round_for_api(once.parse().unwrap());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_display_uses_accounting_precision() {
        let money = ctx(4, 2);
        let amount: Amount = "10.12345".parse().unwrap();
        assert_eq!(money.round_for_api(amount), "10.1235");
        assert_eq!(money.round_for_display(amount), "10.12");
    }

    #[test]
    fn test_format_currency() {
        let money = ctx(2, 2);
        assert_eq!(money.format_currency("1050".parse().unwrap()), "₹1050.00");
        assert_eq!(money.format_currency("-5".parse().unwrap()), "-₹5.00");
    }

    #[test]
    fn test_config_rejects_narrow_internal_precision() {
        assert!(DecimalConfig::new(1, 2).is_err());
        assert!(DecimalConfig::new(29, 2).is_err());
        assert!(DecimalConfig::new(4, 2).is_ok());
    }

    #[test]
    fn test_serde_string_and_number() {
        let amount: Amount = serde_json::from_str("\"50.5\"").unwrap();
        assert_eq!(amount.as_decimal(), dec!(50.5));
        let amount: Amount = serde_json::from_str("50.5").unwrap();
        assert_eq!(amount.as_decimal(), dec!(50.5));
        let amount: Amount = serde_json::from_str("100").unwrap();
        assert_eq!(amount, Amount::from(100));
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"100\"");
    }

    #[test]
    fn test_lossy_float() {
        let amount: Amount = "12.5".parse().unwrap();
        assert_eq!(amount.to_f64_lossy(), 12.5);
    }
}
