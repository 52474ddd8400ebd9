//! Decimal input validation for forms and command-line arguments.
//!
//! A `DecimalField` accepts raw text, checks that it is numeric and within an
//! inclusive range, and hands back the value canonicalized to the precision
//! of the boundary it guards, so no unrounded text escapes validation.

use crate::domain::{Amount, MoneyContext};
use crate::error::ValidationError;

/// Which precision a validated value is rounded to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Boundary {
    #[default]
    Api,
    Display,
}

/// Validator for a decimal text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecimalField {
    min: Option<Amount>,
    max: Option<Amount>,
    message: Option<String>,
    boundary: Boundary,
}

impl DecimalField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    pub fn min(mut self, min: Amount) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, max: Amount) -> Self {
        self.max = Some(max);
        self
    }

    /// Replaces the "not a number" message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Checks `raw` and returns the unrounded amount.
    pub fn parse(&self, raw: &str) -> Result<Amount, ValidationError> {
        let amount: Amount = raw.parse().map_err(|_| {
            ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| "Must be a valid number".to_string()),
            )
        })?;

        if let Some(min) = self.min {
            if amount < min {
                return Err(ValidationError::new(format!("Must be at least {}", min)));
            }
        }
        if let Some(max) = self.max {
            if amount > max {
                return Err(ValidationError::new(format!("Must be at most {}", max)));
            }
        }
        Ok(amount)
    }

    /// Checks `raw` and returns it fixed to the boundary's precision.
    pub fn validate(&self, money: &MoneyContext, raw: &str) -> Result<String, ValidationError> {
        let amount = self.parse(raw)?;
        Ok(match self.boundary {
            Boundary::Api => money.round_for_api(amount),
            Boundary::Display => money.round_for_display(amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, DecimalConfig};
    use rstest::rstest;

    fn money() -> MoneyContext {
        MoneyContext::new(DecimalConfig::new(4, 2).unwrap(), Currency::INR)
    }

    fn bounded() -> DecimalField {
        DecimalField::new().min(Amount::ZERO).max(Amount::from(1000))
    }

    #[rstest]
    #[case::integer("100", "100.0000")]
    #[case::fraction(" 12.5 ", "12.5000")]
    #[case::lower_bound("0", "0.0000")]
    #[case::upper_bound("1000", "1000.0000")]
    #[case::rounds("3.14159", "3.1416")]
    fn test_valid_input_is_canonicalized(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(bounded().validate(&money(), raw).unwrap(), expected);
    }

    #[rstest]
    #[case::empty("", "Must be a valid number")]
    #[case::blank("   ", "Must be a valid number")]
    #[case::text("abc", "Must be a valid number")]
    #[case::separator("1_000", "Must be a valid number")]
    #[case::below("-0.01", "Must be at least 0")]
    #[case::above("1000.01", "Must be at most 1000")]
    fn test_invalid_input(#[case] raw: &str, #[case] message: &str) {
        let err = bounded().validate(&money(), raw).unwrap_err();
        assert_eq!(err.message, message);
    }

    #[test]
    fn test_custom_message() {
        let field = DecimalField::new().message("Enter an amount");
        let err = field.validate(&money(), "x").unwrap_err();
        assert_eq!(err.to_string(), "Enter an amount");
    }

    #[test]
    fn test_display_boundary() {
        let field = DecimalField::new().boundary(Boundary::Display);
        assert_eq!(field.validate(&money(), "2.345").unwrap(), "2.35");
    }

    #[test]
    fn test_unbounded_accepts_negative() {
        assert_eq!(DecimalField::new().validate(&money(), "-4").unwrap(), "-4.0000");
    }
}
