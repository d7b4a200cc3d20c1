//! Wire types for the storefront REST API.
//!
//! Field names follow the backend JSON (camelCase, and Spanish for users and
//! orders); Rust field names are English. Nullable text fields read as empty
//! strings so one sloppy record does not make a whole listing unreadable.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use tienda_core::{
    CartLineId, CategoryId, Email, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId,
};

use crate::models::CartLine;

// =============================================================================
// Serde Helpers
// =============================================================================

/// Read `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a missing or `null` active flag as active.
fn active_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

const fn default_active() -> bool {
    true
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Category name (products reference categories by name).
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    pub price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Image URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    /// Only an explicit `false` deactivates a product.
    #[serde(default = "default_active", deserialize_with = "active_flag")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_best_seller: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
}

impl Product {
    /// Whether the product is flagged as a best seller.
    #[must_use]
    pub fn best_seller(&self) -> bool {
        self.is_best_seller.unwrap_or(false)
    }

    /// Whether the product is flagged as a new arrival.
    #[must_use]
    pub fn new_arrival(&self) -> bool {
        self.is_new.unwrap_or(false)
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductSort {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl ProductSort {
    /// Query parameter value for this sort order.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }
}

/// Product listing filters.
///
/// Everything except `page`/`limit` is also applied client-side by
/// [`ProductQuery::apply`], so results stay correct when the backend ignores a
/// parameter and when filtering a cached list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// Case-insensitive category name.
    pub category: Option<String>,
    pub sort: Option<ProductSort>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Only products flagged `isBestSeller`.
    pub best_sellers_only: bool,
    /// Only products flagged `isNew`.
    pub new_only: bool,
}

impl ProductQuery {
    /// A query matching the whole catalog.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Whether the query selects the whole unsorted catalog.
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }

    /// Query parameters for `GET /products`.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = non_blank(self.search.as_deref()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = non_blank(self.category.as_deref()) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if self.best_sellers_only {
            pairs.push(("isBestSeller", "true".to_string()));
        }
        if self.new_only {
            pairs.push(("isNew", "true".to_string()));
        }
        pairs
    }

    /// Whether a product passes the search, category and flag filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = non_blank(self.search.as_deref()) {
            let needle = search.to_lowercase();
            let hit = product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(category) = non_blank(self.category.as_deref())
            && product.category.to_lowercase() != category.to_lowercase()
        {
            return false;
        }

        if self.best_sellers_only && !product.best_seller() {
            return false;
        }

        !(self.new_only && !product.new_arrival())
    }

    /// Filter and sort products client-side.
    #[must_use]
    pub fn apply<'a, I>(&self, products: I) -> Vec<Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let mut selected: Vec<Product> = products
            .into_iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        match self.sort {
            Some(ProductSort::PriceAsc) => selected.sort_by(|a, b| a.price.cmp(&b.price)),
            Some(ProductSort::PriceDesc) => selected.sort_by(|a, b| b.price.cmp(&a.price)),
            Some(ProductSort::NameAsc) => {
                selected.sort_by_key(|p| p.name.to_lowercase());
            }
            Some(ProductSort::NameDesc) => {
                selected.sort_by_key(|p| std::cmp::Reverse(p.name.to_lowercase()));
            }
            None => {}
        }

        selected
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Back-office Types
// =============================================================================

/// A backend user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUser {
    pub id: UserId,
    #[serde(rename = "nombre", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "correo", default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(rename = "activo", default)]
    pub active: bool,
}

/// One item of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub product: Option<Product>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Customer label as recorded by the backend.
    #[serde(rename = "cliente", default, deserialize_with = "null_as_default")]
    pub customer: String,
    pub total: Price,
    #[serde(rename = "estado", default)]
    pub status: OrderStatus,
    /// Placement date, `YYYY-MM-DD` optionally followed by a time.
    #[serde(rename = "fecha", default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// The calendar day the order was placed, if the date is readable.
    #[must_use]
    pub fn placed_on(&self) -> Option<NaiveDate> {
        let day = self.date.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

// =============================================================================
// Cart Types
// =============================================================================

/// A cart line as stored by the backend (no product snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCartLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartLineId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_id: String,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Body of `POST /cart/add`; a negative quantity is a decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartDelta {
    pub user_id: Email,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Body of `DELETE /cart/remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRemoval {
    pub user_id: Email,
    pub product_id: ProductId,
}

// =============================================================================
// Order Creation Types
// =============================================================================

/// Body of `POST /orders/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub items: Vec<CartLine>,
    pub total: Price,
    pub shipping: Price,
    pub payment_method: PaymentMethod,
}

/// Response of `POST /orders/create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, category: &str, cents: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: category.to_string(),
            price: Price::from_cents(cents),
            description: String::new(),
            image: String::new(),
            is_active: true,
            is_best_seller: None,
            is_new: None,
        }
    }

    #[test]
    fn test_product_defaults_for_sparse_json() {
        let json = r#"{"id": 3, "name": "Capa de invisibilidad", "price": 120,
                       "description": null, "isActive": null}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert!(p.is_active);
        assert_eq!(p.description, "");
        assert_eq!(p.category, "");
        assert!(!p.best_seller());
        assert_eq!(p.price, Price::from_soles(120));
    }

    #[test]
    fn test_product_explicit_inactive() {
        let json = r#"{"id": 3, "name": "Varita rota", "price": 1.5, "isActive": false}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert!(!p.is_active);
    }

    #[test]
    fn test_order_uses_spanish_wire_names() {
        let json = r#"{"id": 9, "cliente": "merlin", "total": 40,
                       "estado": "Cancelada", "fecha": "2025-11-02T10:00:00Z"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.customer, "merlin");
        assert!(order.status.is_cancelled());
        assert_eq!(
            order.placed_on(),
            NaiveDate::from_ymd_opt(2025, 11, 2)
        );
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_order_unreadable_date() {
        let json = r#"{"id": 1, "cliente": "x", "total": 1, "fecha": "ayer"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.placed_on(), None);
    }

    #[test]
    fn test_cart_delta_wire_shape() {
        let delta = CartDelta {
            user_id: Email::parse("mago@tienda.pe").unwrap(),
            product_id: ProductId::new(4),
            quantity: -1,
        };
        let value = serde_json::to_value(&delta).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"userId": "mago@tienda.pe", "productId": 4, "quantity": -1})
        );
    }

    #[test]
    fn test_query_pairs_skip_blank_values() {
        let query = ProductQuery {
            search: Some("  ".to_string()),
            category: Some("Pociones".to_string()),
            sort: Some(ProductSort::PriceDesc),
            limit: Some(12),
            best_sellers_only: true,
            ..ProductQuery::default()
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("category", "Pociones".to_string()),
                ("sort", "price_desc".to_string()),
                ("limit", "12".to_string()),
                ("isBestSeller", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_matches_search_over_name_and_description() {
        let mut p = product(1, "Poción de Risa", "Pociones", 500);
        p.description = "Efecto garantizado casi siempre".to_string();

        let by_name = ProductQuery {
            search: Some("RISA".to_string()),
            ..ProductQuery::default()
        };
        let by_description = ProductQuery {
            search: Some("garantizado".to_string()),
            ..ProductQuery::default()
        };
        let miss = ProductQuery {
            search: Some("dragón".to_string()),
            ..ProductQuery::default()
        };
        assert!(by_name.matches(&p));
        assert!(by_description.matches(&p));
        assert!(!miss.matches(&p));
    }

    #[test]
    fn test_query_category_is_case_insensitive() {
        let p = product(1, "Poción", "Pociones", 500);
        let query = ProductQuery {
            category: Some("pociones".to_string()),
            ..ProductQuery::default()
        };
        assert!(query.matches(&p));
    }

    #[test]
    fn test_apply_sorts() {
        let products = vec![
            product(1, "b", "x", 300),
            product(2, "A", "x", 100),
            product(3, "c", "x", 200),
        ];
        let by_price = ProductQuery {
            sort: Some(ProductSort::PriceAsc),
            ..ProductQuery::default()
        };
        let ids: Vec<i64> = by_price
            .apply(&products)
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let by_name_desc = ProductQuery {
            sort: Some(ProductSort::NameDesc),
            ..ProductQuery::default()
        };
        let ids: Vec<i64> = by_name_desc
            .apply(&products)
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_create_order_response_tolerates_missing_fields() {
        let resp: CreateOrderResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.order_id, None);
    }
}
