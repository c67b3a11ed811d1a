// ABOUTME: Validation errors raised when request fields fail the required-field checks.
// ABOUTME: Shared by record creation, record updates, and user registration.

use thiserror::Error;

/// A required field was missing or empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("`{0}` is required")]
    MissingField(&'static str),

    #[error("items[{index}].{field} is required")]
    MissingItemField { index: usize, field: &'static str },
}
