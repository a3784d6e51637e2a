//! Input checks performed by callers before they reach the store.
//!
//! [`crate::LedgerStore`] only verifies that referenced identifiers exist.
//! Anything that collects user input (the script runner, a form) runs these
//! first.

use rust_decimal::Decimal;
use thiserror::Error;

pub const DEFAULT_MAX_DESCRIPTION: usize = 300;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("description cannot exceed {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("cost must be a positive number")]
    NonPositiveCost,
}

pub fn validate_user(first_name: &str, last_name: &str) -> Result<(), ValidationError> {
    if first_name.trim().is_empty() {
        return Err(ValidationError::Required("first name"));
    }
    if last_name.trim().is_empty() {
        return Err(ValidationError::Required("last name"));
    }
    Ok(())
}

pub fn validate_expense(
    description: &str,
    cost: Decimal,
    max_description: usize,
) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::Required("description"));
    }
    if description.chars().count() > max_description {
        return Err(ValidationError::DescriptionTooLong {
            max: max_description,
        });
    }
    if cost <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveCost);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_valid_user() {
        assert_eq!(validate_user("Ann", "Lee"), Ok(()));
    }

    #[test]
    fn test_blank_names_rejected() {
        assert_eq!(
            validate_user("  ", "Lee"),
            Err(ValidationError::Required("first name"))
        );
        assert_eq!(
            validate_user("Ann", ""),
            Err(ValidationError::Required("last name"))
        );
    }

    #[test]
    fn test_valid_expense() {
        assert_eq!(
            validate_expense("lunch", dec!(0.01), DEFAULT_MAX_DESCRIPTION),
            Ok(())
        );
    }

    #[test]
    fn test_blank_description_rejected() {
        assert_eq!(
            validate_expense(" \t", dec!(1), DEFAULT_MAX_DESCRIPTION),
            Err(ValidationError::Required("description"))
        );
    }

    #[test]
    fn test_description_length_limit() {
        let at_limit = "x".repeat(DEFAULT_MAX_DESCRIPTION);
        assert!(validate_expense(&at_limit, dec!(1), DEFAULT_MAX_DESCRIPTION).is_ok());

        let over = "é".repeat(DEFAULT_MAX_DESCRIPTION + 1);
        assert_eq!(
            validate_expense(&over, dec!(1), DEFAULT_MAX_DESCRIPTION),
            Err(ValidationError::DescriptionTooLong { max: 300 })
        );
    }

    #[test]
    fn test_non_positive_cost_rejected() {
        for cost in [dec!(0), dec!(-5)] {
            assert_eq!(
                validate_expense("lunch", cost, DEFAULT_MAX_DESCRIPTION),
                Err(ValidationError::NonPositiveCost)
            );
        }
    }
}
