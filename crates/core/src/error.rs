//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Broad classification of a [`DomainError`].
///
/// The boundary layer uses this to pick a failure class without matching every
/// variant; the exact variant is still available through [`DomainError::code`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input; the caller can fix the request and retry.
    Validation,
    /// The aggregate is in the wrong state for the requested transition.
    State,
    /// The addressed aggregate does not exist.
    NotFound,
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// state transitions, missing aggregates). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("product not found")]
    ProductNotFound,

    #[error("product is not active")]
    ProductNotActive,

    #[error("discount is not valid at the specified time")]
    InvalidDiscountPeriod,

    #[error("product already archived")]
    ProductAlreadyArchived,

    #[error("discount already active")]
    DiscountAlreadyActive,

    #[error("cannot deactivate product with active discount")]
    ProductHasActiveDiscount,

    #[error("price is invalid")]
    InvalidPrice,

    #[error("product name cannot be empty or longer than 255 characters")]
    InvalidProductName,

    #[error("product description cannot be empty or longer than 1000 characters")]
    InvalidProductDescription,

    #[error("product category cannot be empty or longer than 100 characters")]
    InvalidProductCategory,

    #[error("discount id cannot be empty")]
    InvalidDiscountId,

    #[error("discount amount must be between 0 and 100%")]
    InvalidDiscountAmount,

    #[error("discount start date must be before end date")]
    InvalidDiscountDateRange,

    /// A fraction was built with a zero denominator.
    #[error("fraction denominator must not be zero")]
    InvalidFraction,

    /// An amount could not be parsed or does not fit a fixed-width representation.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    /// Stable, machine-readable error code (distinct from the human message).
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::ProductNotFound => "product_not_found",
            DomainError::ProductNotActive => "product_not_active",
            DomainError::InvalidDiscountPeriod => "invalid_discount_period",
            DomainError::ProductAlreadyArchived => "product_already_archived",
            DomainError::DiscountAlreadyActive => "discount_already_active",
            DomainError::ProductHasActiveDiscount => "product_has_active_discount",
            DomainError::InvalidPrice => "invalid_price",
            DomainError::InvalidProductName => "invalid_product_name",
            DomainError::InvalidProductDescription => "invalid_product_description",
            DomainError::InvalidProductCategory => "invalid_product_category",
            DomainError::InvalidDiscountId => "invalid_discount_id",
            DomainError::InvalidDiscountAmount => "invalid_discount_amount",
            DomainError::InvalidDiscountDateRange => "invalid_discount_date_range",
            DomainError::InvalidFraction => "invalid_fraction",
            DomainError::InvalidAmount(_) => "invalid_amount",
            DomainError::InvalidId(_) => "invalid_id",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::ProductNotFound => ErrorKind::NotFound,

            DomainError::ProductNotActive
            | DomainError::InvalidDiscountPeriod
            | DomainError::ProductAlreadyArchived
            | DomainError::DiscountAlreadyActive
            | DomainError::ProductHasActiveDiscount => ErrorKind::State,

            DomainError::InvalidPrice
            | DomainError::InvalidProductName
            | DomainError::InvalidProductDescription
            | DomainError::InvalidProductCategory
            | DomainError::InvalidDiscountId
            | DomainError::InvalidDiscountAmount
            | DomainError::InvalidDiscountDateRange
            | DomainError::InvalidFraction
            | DomainError::InvalidAmount(_)
            | DomainError::InvalidId(_) => ErrorKind::Validation,
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_from_messages() {
        let err = DomainError::ProductHasActiveDiscount;
        assert_eq!(err.code(), "product_has_active_discount");
        assert_eq!(err.to_string(), "cannot deactivate product with active discount");
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(DomainError::ProductNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(DomainError::DiscountAlreadyActive.kind(), ErrorKind::State);
        assert_eq!(DomainError::ProductAlreadyArchived.kind(), ErrorKind::State);
        assert_eq!(DomainError::InvalidDiscountAmount.kind(), ErrorKind::Validation);
        assert_eq!(DomainError::invalid_id("x").kind(), ErrorKind::Validation);
    }
}
