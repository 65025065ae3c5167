//! Error types for the projection engine
//!
//! Two failure classes exist:
//! - [`ValidationError`]: the caller's input is invalid. Every violated rule is listed.
//! - [`TableError`]: a coefficient table is unusable. This is a deployment defect,
//!   never a user error, and is never papered over with a zero default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::Gender;

/// A single violated input rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Blocking input validation failure carrying every violated rule
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("input validation failed: {} error(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Whether any error was recorded against the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Unusable coefficient table (configuration defect)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("life expectancy table for {} is empty", .0.as_str())]
    EmptyLifeExpectancy(Gender),

    #[error("life expectancy for {} at age {age} must be positive, got {months}", .gender.as_str())]
    NonPositiveLifeExpectancy { gender: Gender, age: u32, months: u32 },

    #[error("{series} factor for year {year} must be strictly positive, got {factor}")]
    NonPositiveFactor {
        series: &'static str,
        year: i32,
        factor: f64,
    },

    #[error("{name} must be a positive amount, got {value}")]
    NonPositiveAmount { name: &'static str, value: f64 },

    #[error("no {series} factor can be derived for year {year}")]
    MissingFactor { series: &'static str, year: i32 },

    #[error("no {0} supplied and no default available")]
    MissingBaseline(&'static str),
}

/// Any failure of a calculation request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PensionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("coefficient table defect: {0}")]
    Table(#[from] TableError),

    #[error("work end year {work_end_year} puts the projection horizon out of range")]
    HorizonOutOfRange { work_end_year: i32 },
}

impl PensionError {
    /// Validation and horizon errors are the caller's to fix; table errors are the operator's
    pub fn is_user_error(&self) -> bool {
        matches!(self, PensionError::Validation(_) | PensionError::HorizonOutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_counts_entries() {
        let error = ValidationError::new(vec![
            FieldError::new("age", "must be between 16 and 100"),
            FieldError::new("gender", "must be one of: male, female"),
        ]);

        assert_eq!(error.to_string(), "input validation failed: 2 error(s)");
        assert!(error.has_field("gender"));
        assert!(!error.has_field("gross_salary"));
    }

    #[test]
    fn test_table_error_is_distinct_from_validation() {
        let table: PensionError = TableError::EmptyLifeExpectancy(Gender::Female).into();
        let validation: PensionError = ValidationError::new(vec![]).into();

        assert!(!table.is_user_error());
        assert!(validation.is_user_error());
        assert_eq!(
            table.to_string(),
            "coefficient table defect: life expectancy table for female is empty"
        );
    }
}
