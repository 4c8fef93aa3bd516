use crate::domain::product::ProductDescriptor;
use crate::domain::purchase::PurchaseRecord;

/// Condition labels that mark a purchase as a first-hand sale.
pub const NEW_CONDITION_LABELS: [&str; 2] = ["new", "brand new"];

/// A purchase counts as circular when the item was donated or was not sold new.
pub fn is_circular(product: Option<&ProductDescriptor>) -> bool {
    let Some(product) = product else {
        return false;
    };
    if product.is_donation {
        return true;
    }
    let condition = product.condition_key();
    !NEW_CONDITION_LABELS.contains(&condition.as_str())
}

pub fn is_circular_purchase(record: &PurchaseRecord) -> bool {
    is_circular(record.product.as_ref())
}

#[cfg(test)]
mod tests {
    use super::is_circular;
    use crate::domain::product::ProductDescriptor;

    #[test]
    fn new_conditions_are_not_circular_regardless_of_case() {
        assert!(!is_circular(Some(&ProductDescriptor::new("Clothing", "New"))));
        assert!(!is_circular(Some(&ProductDescriptor::new("Clothing", " BRAND NEW "))));
    }

    #[test]
    fn donations_are_circular_even_when_new() {
        let product = ProductDescriptor::new("Electronics", "brand new").as_donation();
        assert!(is_circular(Some(&product)));
    }

    #[test]
    fn used_unknown_and_blank_conditions_are_circular() {
        assert!(is_circular(Some(&ProductDescriptor::new("Furniture", "Used - Good"))));
        assert!(is_circular(Some(&ProductDescriptor::new("Furniture", "refurbished"))));
        assert!(is_circular(Some(&ProductDescriptor::default())));
    }

    #[test]
    fn unresolved_product_is_not_circular() {
        assert!(!is_circular(None));
    }
}
