use std::path::Path;

use cirqle_core::{estimate_co2, ImpactFactors, PurchaseRecord};
use serde::Serialize;

use crate::commands::records::load_records;
use crate::commands::CommandResult;

/// Per-record view of the item-level CO2 estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemEstimate {
    pub record_id: Option<i64>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub is_donation: bool,
    pub co2_kg: f64,
}

impl ItemEstimate {
    pub fn for_record(factors: &ImpactFactors, record: &PurchaseRecord) -> Self {
        let product = record.product.as_ref();
        Self {
            record_id: record.id,
            title: product.and_then(|product| product.title.clone()),
            category: product.and_then(|product| product.category.clone()),
            condition: product.and_then(|product| product.condition.clone()),
            is_donation: product.is_some_and(|product| product.is_donation),
            co2_kg: estimate_co2(factors, product).kilograms(),
        }
    }
}

pub fn run(records_path: &Path) -> CommandResult {
    let records = match load_records(records_path) {
        Ok(records) => records,
        Err(error) => return CommandResult::from_error("estimate", &error),
    };

    let factors = ImpactFactors::standard();
    let estimates: Vec<ItemEstimate> =
        records.iter().map(|record| ItemEstimate::for_record(factors, record)).collect();

    CommandResult::document("estimate", &estimates)
}

#[cfg(test)]
mod tests {
    use cirqle_core::{BuyerId, ImpactFactors, ProductDescriptor, PurchaseRecord};
    use rust_decimal::Decimal;

    use super::ItemEstimate;

    #[test]
    fn estimate_carries_product_labels_and_savings() {
        let buyer = BuyerId::new(3).expect("positive id");
        let record = PurchaseRecord::new(
            buyer,
            ProductDescriptor::new("Furniture", "Used - Like New").with_title("Oak chair"),
            Decimal::new(4500, 0),
        )
        .with_id(11);

        let estimate = ItemEstimate::for_record(ImpactFactors::standard(), &record);

        assert_eq!(estimate.record_id, Some(11));
        assert_eq!(estimate.title.as_deref(), Some("Oak chair"));
        assert!(!estimate.is_donation);
        assert_eq!(estimate.co2_kg, 4.54);
    }

    #[test]
    fn unresolved_product_estimates_zero() {
        let buyer = BuyerId::new(3).expect("positive id");
        let mut record = PurchaseRecord::new(buyer, ProductDescriptor::default(), Decimal::ZERO);
        record.product = None;

        let estimate = ItemEstimate::for_record(ImpactFactors::standard(), &record);

        assert_eq!(estimate.co2_kg, 0.0);
        assert_eq!(estimate.category, None);
    }
}
