//! Effective (post-discount) pricing.

use chrono::{DateTime, Utc};

use catalog_core::Money;

use crate::product::Product;

/// Stateless domain service computing what a product costs at a given instant.
#[derive(Debug, Default, Copy, Clone)]
pub struct PricingCalculator;

impl PricingCalculator {
    pub fn new() -> Self {
        Self
    }

    /// `base × (1 − amount)` while the discount is valid at `at`, otherwise
    /// the base price. Exact; no rounding.
    pub fn effective_price(&self, product: &Product, at: DateTime<Utc>) -> Money {
        match product.discount() {
            Some(discount) if discount.is_valid_at(at) => {
                let multiplier = Money::one().subtract(discount.amount());
                product.base_price().multiply(&multiplier)
            }
            _ => product.base_price().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discount::Discount;
    use crate::product::ProductId;
    use catalog_core::MinorUnits;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap()
    }

    fn active_product(base_cents: i64) -> Product {
        let mut p = Product::create(
            ProductId::generate(),
            "Kettle",
            "1.7l kettle",
            "kitchen",
            Money::from_minor_units(base_cents),
            now(),
        )
        .unwrap();
        p.activate(now()).unwrap();
        p
    }

    fn discount(percent: Money) -> Discount {
        Discount::new("promo", percent, now() - Duration::hours(1), now() + Duration::hours(1))
    }

    #[test]
    fn no_discount_means_base_price() {
        let p = active_product(10000);
        assert_eq!(PricingCalculator.effective_price(&p, now()), Money::from_minor_units(10000));
    }

    #[test]
    fn ten_percent_off_one_hundred_is_ninety() {
        let mut p = active_product(10000);
        p.apply_discount(discount(Money::percent(10)), now()).unwrap();

        let price = PricingCalculator::new().effective_price(&p, now());
        assert_eq!(price, Money::from_minor_units(9000));
        assert_eq!(price.to_minor_units().unwrap(), MinorUnits::Exact(9000));
    }

    #[test]
    fn zero_percent_leaves_price_untouched() {
        let mut p = active_product(12345);
        p.apply_discount(discount(Money::zero()), now()).unwrap();
        assert_eq!(PricingCalculator.effective_price(&p, now()), Money::from_minor_units(12345));
    }

    #[test]
    fn discount_outside_window_is_ignored() {
        let mut p = active_product(10000);
        p.apply_discount(discount(Money::percent(50)), now()).unwrap();

        let after_end = now() + Duration::hours(1);
        assert_eq!(
            PricingCalculator.effective_price(&p, after_end),
            Money::from_minor_units(10000)
        );
    }

    #[test]
    fn fractional_discount_stays_exact() {
        // one third off 10.00
        let mut p = active_product(1000);
        p.apply_discount(discount(Money::from_fraction(1, 3).unwrap()), now())
            .unwrap();

        let price = PricingCalculator.effective_price(&p, now());
        assert_eq!(price, Money::from_fraction(20, 3).unwrap());
        assert_eq!(price.to_minor_units().unwrap(), MinorUnits::Rounded(667));
    }

    #[test]
    fn full_discount_is_free() {
        let mut p = active_product(999);
        p.apply_discount(discount(Money::one()), now()).unwrap();
        assert!(PricingCalculator.effective_price(&p, now()).is_zero());
    }
}
