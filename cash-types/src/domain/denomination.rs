//! Denomination breakdowns: counts of physical bills and coins per face value.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::money::Amount;
use crate::error::{AmountError, DomainError, ValidationError};

/// Face values offered for entry, largest first.
pub const STANDARD_DENOMINATIONS: [u32; 9] = [500, 200, 100, 50, 20, 10, 5, 2, 1];

/// Mapping of face value to count.
///
/// A zero count means the face value is unused and is never stored.
/// Serialized as a JSON object keyed by the face value's decimal text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Denominations(BTreeMap<Amount, u32>);

impl Denominations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a breakdown from `(face value, count)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (Amount, u32)>,
    {
        let mut denominations = Self::new();
        for (face, count) in pairs {
            denominations.set(face, count)?;
        }
        Ok(denominations)
    }

    /// Sets the count for a face value, removing it when `count` is zero.
    pub fn set(&mut self, face: Amount, count: u32) -> Result<(), DomainError> {
        if !face.is_positive() {
            return Err(ValidationError::new(format!(
                "Denomination must be positive, got {}",
                face
            ))
            .into());
        }
        if count == 0 {
            self.0.remove(&face);
        } else {
            self.0.insert(face, count);
        }
        Ok(())
    }

    pub fn count(&self, face: Amount) -> u32 {
        self.0.get(&face).copied().unwrap_or(0)
    }

    /// True when no face value has a positive count.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(|count| *count == 0)
    }

    /// Entries with a positive count, largest face value first.
    pub fn iter(&self) -> impl Iterator<Item = (Amount, u32)> + '_ {
        self.0
            .iter()
            .rev()
            .filter(|(_, count)| **count > 0)
            .map(|(face, count)| (*face, *count))
    }

    /// Σ face value × count, computed in decimal.
    pub fn total(&self) -> Result<Amount, AmountError> {
        self.iter().try_fold(Amount::ZERO, |sum, (face, count)| {
            sum.checked_add(face.checked_mul(Amount::from(count))?)
        })
    }
}
