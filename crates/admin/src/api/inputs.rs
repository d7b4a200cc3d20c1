//! Request bodies for catalog mutations.

use serde::{Deserialize, Serialize};

use tienda_core::Price;
use tienda_storefront::api::types::{Category, Product};

use crate::error::AdminError;

/// Body of `POST /products` and `PUT /products/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub is_active: bool,
    #[serde(default)]
    pub is_best_seller: bool,
    #[serde(default)]
    pub is_new: bool,
}

impl ProductInput {
    /// A new, active product with no flags.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            description: String::new(),
            image: String::new(),
            is_active: true,
            is_best_seller: false,
            is_new: false,
        }
    }

    /// Check required fields and normalize whitespace.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the name or category is empty.
    pub fn validate(mut self) -> Result<Self, AdminError> {
        self.name = required(&self.name, "product name")?;
        self.category = required(&self.category, "category")?;
        self.description = self.description.trim().to_string();
        self.image = self.image.trim().to_string();
        Ok(self)
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
            is_active: product.is_active,
            is_best_seller: product.best_seller(),
            is_new: product.new_arrival(),
        }
    }
}

/// Body of `POST /categories` and `PUT /categories/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Check required fields and normalize whitespace.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the name is empty.
    pub fn validate(mut self) -> Result<Self, AdminError> {
        self.name = required(&self.name, "category name")?;
        self.description = self.description.trim().to_string();
        Ok(self)
    }
}

impl From<&Category> for CategoryInput {
    fn from(category: &Category) -> Self {
        Self::new(category.name.clone(), category.description.clone())
    }
}

fn required(value: &str, field: &str) -> Result<String, AdminError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_input_validation() {
        let input = ProductInput::new("  Capa  ", "Ropa", Price::from_soles(80))
            .validate()
            .unwrap();
        assert_eq!(input.name, "Capa");

        let err = ProductInput::new("Capa", " ", Price::ZERO)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "category is required");
    }

    #[test]
    fn test_product_input_wire_shape() {
        let input = ProductInput::new("Capa", "Ropa", Price::from_soles(80));
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["isActive"], serde_json::json!(true));
        assert_eq!(value["isBestSeller"], serde_json::json!(false));
        assert_eq!(value["price"], serde_json::json!(80.0));
    }

    #[test]
    fn test_category_input_validation() {
        assert!(CategoryInput::new("", "x").validate().is_err());
        let input = CategoryInput::new("Pociones", " brebajes ").validate().unwrap();
        assert_eq!(input.description, "brebajes");
    }
}
