use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Money, ValueObject};

/// A time-bounded percentage discount.
///
/// `amount` is a fraction in `[0, 1]` (10% is `1/10`). The window is half-open:
/// valid from `start_date` inclusive until `end_date` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    id: String,
    amount: Money,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl ValueObject for Discount {}

impl Discount {
    /// Build a discount without checking it. Call [`Discount::validate`] on
    /// anything that came from outside the domain.
    pub fn new(
        id: impl Into<String>,
        amount: Money,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            amount,
            start_date,
            end_date,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.start_date && at < self.end_date
    }

    /// Structural checks, in order: id, amount range, date range.
    pub fn validate(&self) -> DomainResult<()> {
        if self.id.trim().is_empty() {
            return Err(DomainError::InvalidDiscountId);
        }
        if self.amount.is_negative() || self.amount > Money::one() {
            return Err(DomainError::InvalidDiscountAmount);
        }
        if self.start_date >= self.end_date {
            return Err(DomainError::InvalidDiscountDateRange);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn ten_percent_for_a_day() -> Discount {
        Discount::new("summer", Money::percent(10), t0(), t0() + Duration::days(1))
    }

    #[test]
    fn window_is_start_inclusive_end_exclusive() {
        let d = ten_percent_for_a_day();
        assert!(d.is_valid_at(t0()));
        assert!(d.is_valid_at(t0() + Duration::hours(23)));
        assert!(!d.is_valid_at(t0() + Duration::days(1)));
        assert!(!d.is_valid_at(t0() - Duration::seconds(1)));
    }

    #[test]
    fn validate_accepts_well_formed_discount() {
        assert!(ten_percent_for_a_day().validate().is_ok());
        assert!(
            Discount::new("free", Money::one(), t0(), t0() + Duration::days(1))
                .validate()
                .is_ok()
        );
        assert!(
            Discount::new("none", Money::zero(), t0(), t0() + Duration::days(1))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn validate_rejects_blank_id() {
        let d = Discount::new("  ", Money::percent(10), t0(), t0() + Duration::days(1));
        assert_eq!(d.validate(), Err(DomainError::InvalidDiscountId));
    }

    #[test]
    fn validate_rejects_amount_outside_unit_interval() {
        let over = Discount::new("x", Money::percent(101), t0(), t0() + Duration::days(1));
        assert_eq!(over.validate(), Err(DomainError::InvalidDiscountAmount));

        let negative = Discount::new("x", Money::percent(-1), t0(), t0() + Duration::days(1));
        assert_eq!(negative.validate(), Err(DomainError::InvalidDiscountAmount));
    }

    #[test]
    fn validate_rejects_empty_or_inverted_window() {
        let empty = Discount::new("x", Money::percent(10), t0(), t0());
        assert_eq!(empty.validate(), Err(DomainError::InvalidDiscountDateRange));

        let inverted = Discount::new("x", Money::percent(10), t0() + Duration::days(1), t0());
        assert_eq!(inverted.validate(), Err(DomainError::InvalidDiscountDateRange));
    }

    #[test]
    fn validate_checks_id_before_amount() {
        let d = Discount::new("", Money::percent(200), t0(), t0());
        assert_eq!(d.validate(), Err(DomainError::InvalidDiscountId));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn validity_matches_half_open_window(
            start_offset in -10_000i64..10_000i64,
            length in 1i64..10_000i64,
            offset_secs in -20_000i64..20_000i64,
        ) {
            let start = t0() + Duration::seconds(start_offset);
            let end = start + Duration::seconds(length);
            let at = t0() + Duration::seconds(offset_secs);
            let d = Discount::new("p", Money::percent(5), start, end);

            prop_assert_eq!(d.is_valid_at(at), at >= start && at < end);
        }
    }
}
