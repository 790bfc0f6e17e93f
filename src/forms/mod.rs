//! Form and JSON payload definitions backing the routes.

use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod auth;
pub mod blocks;
pub mod booking;
pub mod rates;
pub mod units;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("missing fields")]
    MissingFields,

    #[error("{0} required")]
    Required(&'static str),

    #[error("missing dates")]
    MissingDates,

    #[error("invalid date")]
    InvalidDate,

    #[error("check-out must be after check-in")]
    InvertedDates,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid unit id")]
    InvalidUnitId,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid price")]
    InvalidPrice,

    #[error("invalid currency")]
    InvalidCurrency,

    #[error("unknown action")]
    UnknownAction,

    #[error("invalid csv: {0}")]
    Csv(String),
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::NonPositiveId => FormError::InvalidUnitId,
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::EmptyString => FormError::MissingFields,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            TypeConstraintError::InvalidDate => FormError::InvalidDate,
            TypeConstraintError::InvertedRange => FormError::InvertedDates,
            TypeConstraintError::InvalidPrice => FormError::InvalidPrice,
            TypeConstraintError::InvalidValue(_) => FormError::InvalidCurrency,
        }
    }
}
