//! Validation utilities for disbursement amounts.

use soroban_sdk::Vec;

use crate::MultisenderError;

/// Validation error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// An amount is negative
    InvalidAmount,
    /// Amounts do not fit in an i128
    AmountOverflow,
    /// Attached value differs from what the batch pays out
    ValueMismatch,
}

impl From<ValidationError> for MultisenderError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidAmount | ValidationError::AmountOverflow => {
                MultisenderError::InvalidAmount
            }
            ValidationError::ValueMismatch => MultisenderError::ValueMismatch,
        }
    }
}

/// Rejects negative amounts. Zero is a legal amount.
pub fn validate_amounts(amounts: &Vec<i128>) -> Result<(), ValidationError> {
    if amounts.iter().any(|amount| amount < 0) {
        return Err(ValidationError::InvalidAmount);
    }
    Ok(())
}

/// Sum of `amounts[from..]`.
pub fn total_amount(amounts: &Vec<i128>, from: u32) -> Result<i128, ValidationError> {
    let mut total: i128 = 0;
    for i in from..amounts.len() {
        total = total
            .checked_add(amounts.get_unchecked(i))
            .ok_or(ValidationError::AmountOverflow)?;
    }
    Ok(total)
}

/// The attached value must match the disbursed total exactly.
pub fn validate_attached(attached: i128, total: i128) -> Result<(), ValidationError> {
    if attached != total {
        return Err(ValidationError::ValueMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{vec, Env};

    #[test]
    fn test_validate_amounts() {
        let env = Env::default();
        assert!(validate_amounts(&vec![&env, 0i128, 1, i128::MAX]).is_ok());
        assert!(validate_amounts(&Vec::new(&env)).is_ok());
        assert_eq!(
            validate_amounts(&vec![&env, 5i128, -1]),
            Err(ValidationError::InvalidAmount)
        );
    }

    #[test]
    fn test_total_amount_from_offset() {
        let env = Env::default();
        let amounts = vec![&env, 10i128, 20, 30];
        assert_eq!(total_amount(&amounts, 0), Ok(60));
        assert_eq!(total_amount(&amounts, 2), Ok(30));
        assert_eq!(total_amount(&amounts, 3), Ok(0));
    }

    #[test]
    fn test_total_amount_overflow() {
        let env = Env::default();
        assert_eq!(
            total_amount(&vec![&env, i128::MAX, 1], 0),
            Err(ValidationError::AmountOverflow)
        );
    }

    #[test]
    fn test_validate_attached() {
        assert!(validate_attached(60, 60).is_ok());
        assert_eq!(
            validate_attached(59, 60),
            Err(ValidationError::ValueMismatch)
        );
        assert_eq!(
            MultisenderError::from(ValidationError::AmountOverflow),
            MultisenderError::InvalidAmount
        );
    }
}
