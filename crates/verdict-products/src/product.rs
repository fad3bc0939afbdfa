use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use verdict_core::{ApplicationError, FieldErrors};

/// An item for sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Price in cents
    pub cost: i64,
    pub quantity: i64,
    pub date_created: Timestamp,
    pub date_updated: Timestamp,
}

/// What clients send to create a product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub quantity: i64,
}

impl NewProduct {
    /// # Errors
    ///
    /// Returns a `400 Bad Request` listing every invalid field
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let mut fields = FieldErrors::new();

        if self.name.trim().is_empty() {
            fields.push("name", "name is a required field");
        }
        if self.cost < 0 {
            fields.push("cost", "cost must be 0 or greater");
        }
        if self.quantity < 1 {
            fields.push("quantity", "quantity must be 1 or greater");
        }

        fields.into_result()
    }
}
