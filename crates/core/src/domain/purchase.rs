use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductDescriptor;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64")]
pub struct BuyerId(pub i64);

impl BuyerId {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidBuyerId(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::InvalidBuyerId(raw.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<i64> for BuyerId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for BuyerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed purchase as supplied by the record source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub buyer_id: BuyerId,
    /// `None` when the referenced product could not be resolved.
    #[serde(default)]
    pub product: Option<ProductDescriptor>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub purchased_at: Option<DateTime<Utc>>,
}

impl PurchaseRecord {
    pub fn new(buyer_id: BuyerId, product: ProductDescriptor, price: Decimal) -> Self {
        Self { id: None, buyer_id, product: Some(product), price, purchased_at: None }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn purchased_at(mut self, at: DateTime<Utc>) -> Self {
        self.purchased_at = Some(at);
        self
    }

    /// Records with an unknown purchase time are always retained.
    pub fn is_on_or_after(&self, cutoff: DateTime<Utc>) -> bool {
        self.purchased_at.map_or(true, |at| at >= cutoff)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{BuyerId, PurchaseRecord};
    use crate::domain::product::ProductDescriptor;
    use crate::errors::DomainError;

    #[test]
    fn buyer_id_rejects_non_positive_and_garbage() {
        assert_eq!(BuyerId::parse(" 42 "), Ok(BuyerId(42)));
        assert_eq!(BuyerId::new(0), Err(DomainError::InvalidBuyerId("0".to_string())));
        assert!(BuyerId::new(-3).is_err());
        assert!(BuyerId::parse("").is_err());
        assert!(BuyerId::parse("abc").is_err());
    }

    #[test]
    fn cutoff_is_inclusive_and_missing_timestamp_is_retained() {
        let cutoff = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let base = PurchaseRecord::new(BuyerId(1), ProductDescriptor::default(), Decimal::ONE);

        assert!(base.clone().purchased_at(cutoff).is_on_or_after(cutoff));
        assert!(!base.clone().purchased_at(cutoff - Duration::seconds(1)).is_on_or_after(cutoff));
        assert!(base.is_on_or_after(cutoff));
    }

    #[test]
    fn record_with_non_positive_buyer_id_is_rejected() {
        let zero = serde_json::from_str::<PurchaseRecord>(r#"{"buyer_id": 0, "price": 10}"#);
        let negative = serde_json::from_str::<PurchaseRecord>(r#"{"buyer_id": -5, "price": 10}"#);

        let error = zero.expect_err("zero id should be rejected");
        assert!(error.to_string().contains("invalid buyer id `0`"));
        assert!(negative.is_err());
    }

    #[test]
    fn record_deserializes_with_unresolved_product() {
        let record: PurchaseRecord = serde_json::from_str(r#"{"buyer_id": 7, "price": 120.5}"#)
            .expect("record should parse");

        assert_eq!(record.buyer_id, BuyerId(7));
        assert!(record.product.is_none());
        assert_eq!(record.price, Decimal::new(1205, 1));
        assert!(record.purchased_at.is_none());
    }
}
