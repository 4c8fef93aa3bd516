use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category label used whenever a product has no usable category.
pub const DEFAULT_CATEGORY_LABEL: &str = "General";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

/// Read-only view of a listed product as referenced by a purchase.
///
/// Every optional field has a documented default so that callers never need
/// to probe for presence:
/// - `category` / `condition`: absent or blank labels fall back to the
///   defaults of whichever consumer reads them.
/// - `is_donation`: `false`.
/// - `price`: zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDescriptor {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub is_donation: bool,
    #[serde(default)]
    pub price: Decimal,
}

impl ProductDescriptor {
    pub fn new(category: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            condition: Some(condition.into()),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = price;
        self
    }

    pub fn as_donation(mut self) -> Self {
        self.is_donation = true;
        self
    }

    /// Display label for grouping, `General` when the category is absent or blank.
    pub fn category_label(&self) -> &str {
        self.category
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or(DEFAULT_CATEGORY_LABEL)
    }

    /// Lookup key for the category, empty when absent.
    pub fn category_key(&self) -> String {
        normalize_label(self.category.as_deref())
    }

    /// Lookup key for the condition, empty when absent.
    pub fn condition_key(&self) -> String {
        normalize_label(self.condition.as_deref())
    }
}

/// Trims and lower-cases a free-text label. Absent labels normalize to "".
pub fn normalize_label(value: Option<&str>) -> String {
    value.map(|label| label.trim().to_lowercase()).unwrap_or_default()
}
