use serde::{Deserialize, Serialize};

use super::factors::ImpactFactors;
use super::round_dp;
use crate::domain::product::ProductDescriptor;

/// Kilograms of CO2 avoided by one reuse of a product, rounded to 2 places.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ImpactEstimate(f64);

impl ImpactEstimate {
    pub const ZERO: Self = Self(0.0);

    pub fn kilograms(self) -> f64 {
        self.0
    }
}

/// Per-item CO2 estimate: baseline × category factor × condition factor,
/// with the donation bonus applied on top. Never negative.
pub fn estimate_co2(
    factors: &ImpactFactors,
    product: Option<&ProductDescriptor>,
) -> ImpactEstimate {
    let Some(product) = product else {
        return ImpactEstimate::ZERO;
    };

    let mut value = factors.baseline_kg()
        * factors.category_factor(&product.category_key())
        * factors.condition_factor(&product.condition_key());
    if product.is_donation {
        value *= factors.donation_bonus();
    }

    ImpactEstimate(round_dp(value, 2).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::{estimate_co2, ImpactEstimate};
    use crate::domain::product::ProductDescriptor;
    use crate::impact::factors::ImpactFactors;

    fn estimate(category: &str, condition: &str) -> f64 {
        let product = ProductDescriptor::new(category, condition);
        estimate_co2(ImpactFactors::standard(), Some(&product)).kilograms()
    }

    #[test]
    fn known_labels_use_weighted_factors() {
        // 1.8 * 1.8 * 1.4 = 4.536
        assert_eq!(estimate("Furniture", "Used - Like New"), 4.54);
        // 1.8 * 1.4 * 1.0 = 2.52
        assert_eq!(estimate("clothing", "new"), 2.52);
    }

    #[test]
    fn unknown_labels_fall_back_to_default_factors() {
        // 1.8 * 1.0 * 1.1 = 1.98
        assert_eq!(estimate("", ""), 1.98);
        assert_eq!(estimate("Toys", "mint"), 1.98);
    }

    #[test]
    fn estimate_does_not_decrease_with_better_condition() {
        let ladder = ["new", "used", "pre-loved", "used - good", "used - like new"];
        let values: Vec<f64> =
            ladder.iter().map(|condition| estimate("Electronics", condition)).collect();

        assert!(values.windows(2).all(|pair| pair[0] <= pair[1]), "values: {values:?}");
    }

    #[test]
    fn donation_applies_bonus() {
        let plain = ProductDescriptor::new("Electronics", "used - like new");
        let donated = plain.clone().as_donation();

        let plain_kg = estimate_co2(ImpactFactors::standard(), Some(&plain)).kilograms();
        let donated_kg = estimate_co2(ImpactFactors::standard(), Some(&donated)).kilograms();

        // 1.8 * 1.6 * 1.4 = 4.032, * 1.3 = 5.2416
        assert_eq!(plain_kg, 4.03);
        assert_eq!(donated_kg, 5.24);
    }

    #[test]
    fn missing_product_yields_zero() {
        assert_eq!(estimate_co2(ImpactFactors::standard(), None), ImpactEstimate::ZERO);
    }

    #[test]
    fn negative_factors_are_floored_at_zero() {
        let factors = ImpactFactors::new(1.8, 1.3).with_category_factor("recalled", -2.0);
        let product = ProductDescriptor::new("recalled", "used");

        assert_eq!(estimate_co2(&factors, Some(&product)).kilograms(), 0.0);
    }
}
