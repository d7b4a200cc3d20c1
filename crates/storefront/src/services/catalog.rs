//! Catalog client.
//!
//! Read-mostly caches of the backend's products, categories, users and
//! orders. Every fetch is best-effort: a failed request is logged and the
//! previous value stays in place. Nothing is invalidated except by
//! [`CatalogClient::refresh`].

use std::collections::BTreeSet;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use tienda_core::{CategoryId, ProductId};

use crate::api::types::{Category, Order, Product, ProductQuery, StoreUser};
use crate::api::{ApiError, StoreApi};
use crate::models::Identity;

/// Number of products in the best sellers view.
pub const BEST_SELLERS_LIMIT: usize = 12;

/// Number of products in the new arrivals view.
pub const NEW_ARRIVALS_LIMIT: usize = 6;

/// Number of categories in each category view.
pub const CATEGORY_VIEW_LIMIT: usize = 3;

/// Errors returned by catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The product does not exist.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The backend could not be reached and nothing was cached.
    #[error("catalog unavailable: {0}")]
    Api(#[from] ApiError),
}

/// Client-side catalog over a [`StoreApi`].
pub struct CatalogClient<A> {
    api: A,
    products: Vec<Product>,
    categories: Vec<Category>,
    categories_derived: bool,
    users: Vec<StoreUser>,
    orders: Vec<Order>,
    product_cache: Cache<ProductId, Product>,
}

impl<A: StoreApi> CatalogClient<A> {
    /// Create an empty catalog. Call [`refresh`](Self::refresh) to populate it.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            api,
            products: Vec::new(),
            categories: Vec::new(),
            categories_derived: false,
            users: Vec::new(),
            orders: Vec::new(),
            product_cache: Cache::builder().max_capacity(1000).build(),
        }
    }

    /// The backend client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Re-fetch all four collections concurrently.
    ///
    /// Each collection keeps its previous value if its fetch fails. The
    /// per-product cache is dropped.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) {
        let all = ProductQuery::all();
        let (products, categories, users, orders) = tokio::join!(
            self.api.list_products(&all),
            self.api.list_categories(),
            self.api.list_users(),
            self.api.list_orders(),
        );

        self.product_cache.invalidate_all();
        self.apply_products(products);
        self.apply_categories(categories);
        self.apply_users(users);
        self.apply_orders(orders);

        debug!(
            products = self.products.len(),
            categories = self.categories.len(),
            users = self.users.len(),
            orders = self.orders.len(),
            "Catalog refreshed"
        );
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List products matching `query`.
    ///
    /// An unfiltered listing replaces the product cache. Filters are applied
    /// again client-side; when the fetch fails the cached list is filtered
    /// instead.
    #[instrument(skip(self))]
    pub async fn list_products(&mut self, query: &ProductQuery) -> Vec<Product> {
        let result = self.api.list_products(query).await;

        if query.is_unfiltered() {
            self.apply_products(result);
            return self.products.clone();
        }

        match result {
            Ok(products) => query.apply(&products),
            Err(e) => {
                warn!(error = %e, "Filtered product fetch failed, filtering cached list");
                query.apply(&self.products)
            }
        }
    }

    /// Get one product by ID.
    ///
    /// Results are cached per ID until the next refresh. When the backend
    /// is unreachable the cached product list is consulted.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the backend reports the product as
    /// missing.
    /// Returns `CatalogError::Api` if the fetch failed and the cached list
    /// does not have the product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        if let Some(product) = self.product_cache.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        match self.api.get_product(id).await {
            Ok(product) => {
                self.product_cache.insert(id, product.clone()).await;
                Ok(product)
            }
            Err(e) if e.is_not_found() => Err(CatalogError::NotFound(id)),
            Err(e) => {
                warn!(error = %e, "Product fetch failed, using cached list");
                self.find_product(id).cloned().ok_or(CatalogError::Api(e))
            }
        }
    }

    /// Cached products, including inactive ones.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product in the cached list.
    #[must_use]
    pub fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    // =========================================================================
    // Categories, Users, Orders
    // =========================================================================

    /// Fetch categories, deriving them from products if the backend has no
    /// category endpoint.
    #[instrument(skip(self))]
    pub async fn list_categories(&mut self) -> Vec<Category> {
        let result = self.api.list_categories().await;
        self.apply_categories(result);
        self.categories.clone()
    }

    /// Cached categories.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Whether the cached categories were derived from products.
    #[must_use]
    pub const fn categories_derived(&self) -> bool {
        self.categories_derived
    }

    #[instrument(skip(self))]
    pub async fn list_users(&mut self) -> Vec<StoreUser> {
        let result = self.api.list_users().await;
        self.apply_users(result);
        self.users.clone()
    }

    #[must_use]
    pub fn users(&self) -> &[StoreUser] {
        &self.users
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&mut self) -> Vec<Order> {
        let result = self.api.list_orders().await;
        self.apply_orders(result);
        self.orders.clone()
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    // =========================================================================
    // Storefront Views
    // =========================================================================

    /// Products shown in the storefront.
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.is_active)
    }

    /// Active best sellers, in catalog order.
    #[must_use]
    pub fn best_sellers(&self) -> Vec<&Product> {
        self.active_products()
            .filter(|p| p.best_seller())
            .take(BEST_SELLERS_LIMIT)
            .collect()
    }

    /// Active new arrivals, in catalog order.
    #[must_use]
    pub fn new_arrivals(&self) -> Vec<&Product> {
        self.active_products()
            .filter(|p| p.new_arrival())
            .take(NEW_ARRIVALS_LIMIT)
            .collect()
    }

    /// The first categories, featured on the home page.
    #[must_use]
    pub fn featured_categories(&self) -> &[Category] {
        let end = self.categories.len().min(CATEGORY_VIEW_LIMIT);
        self.categories.get(..end).unwrap_or_default()
    }

    /// The categories following the featured ones.
    #[must_use]
    pub fn new_categories(&self) -> &[Category] {
        let start = self.categories.len().min(CATEGORY_VIEW_LIMIT);
        let end = self.categories.len().min(CATEGORY_VIEW_LIMIT * 2);
        self.categories.get(start..end).unwrap_or_default()
    }

    /// Cached orders placed by `identity`.
    ///
    /// Orders record a free-form customer label, so an order belongs to the
    /// identity when the label contains the email's local part
    /// (case-insensitive).
    #[must_use]
    pub fn orders_for(&self, identity: &Identity) -> Vec<&Order> {
        let needle = identity.email.local_part().to_lowercase();
        self.orders
            .iter()
            .filter(|o| o.customer.to_lowercase().contains(&needle))
            .collect()
    }

    // =========================================================================
    // Cache Updates
    // =========================================================================

    fn apply_products(&mut self, result: Result<Vec<Product>, ApiError>) {
        match result {
            Ok(products) => {
                self.products = products;
                if self.categories_derived {
                    self.categories = derive_categories(&self.products);
                }
            }
            Err(e) => warn!(error = %e, "Product fetch failed, keeping cached products"),
        }
    }

    fn apply_categories(&mut self, result: Result<Vec<Category>, ApiError>) {
        match result {
            Ok(categories) => {
                self.categories = categories;
                self.categories_derived = false;
            }
            Err(e) if e.is_not_found() => {
                debug!("No category endpoint, deriving categories from products");
                self.categories = derive_categories(&self.products);
                self.categories_derived = true;
            }
            Err(e) => warn!(error = %e, "Category fetch failed, keeping cached categories"),
        }
    }

    fn apply_users(&mut self, result: Result<Vec<StoreUser>, ApiError>) {
        match result {
            Ok(users) => self.users = users,
            Err(e) => warn!(error = %e, "User fetch failed, keeping cached users"),
        }
    }

    fn apply_orders(&mut self, result: Result<Vec<Order>, ApiError>) {
        match result {
            Ok(orders) => self.orders = orders,
            Err(e) => warn!(error = %e, "Order fetch failed, keeping cached orders"),
        }
    }
}

/// Derive categories from the distinct product category names.
///
/// IDs are assigned from 1 in order of first appearance, so they are only
/// meaningful for the product list they were derived from.
#[must_use]
pub fn derive_categories(products: &[Product]) -> Vec<Category> {
    let mut seen = BTreeSet::new();
    products
        .iter()
        .map(|p| p.category.trim())
        .filter(|name| !name.is_empty() && seen.insert(name.to_string()))
        .zip(1_i64..)
        .map(|(name, id)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            description: String::new(),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeApi, product};
    use tienda_core::{Email, OrderId, OrderStatus, Price, UserId};

    fn catalog_products() -> Vec<Product> {
        vec![
            product(1, "Poción de Risa", "Pociones", 10),
            product(2, "Varita de Sauce", "Varitas", 5),
            product(3, "Poción de Sueño", "Pociones", 30),
        ]
    }

    fn order(id: i64, customer: &str) -> Order {
        Order {
            id: OrderId::new(id),
            customer: customer.to_string(),
            total: Price::from_soles(40),
            status: OrderStatus::Pending,
            date: "2025-11-02".to_string(),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_derive_categories_distinct_in_order() {
        let mut products = catalog_products();
        products.push(product(4, "Sin categoría", "  ", 1));
        let categories = derive_categories(&products);
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Pociones", "Varitas"]);
        assert_eq!(categories[0].id, CategoryId::new(1));
        assert_eq!(categories[1].id, CategoryId::new(2));
    }

    #[tokio::test]
    async fn test_refresh_populates_everything() {
        let api = FakeApi::with_products(catalog_products());
        api.state().categories = Some(vec![Category {
            id: CategoryId::new(7),
            name: "Pociones".to_string(),
            description: "Brebajes".to_string(),
        }]);
        api.state().orders = vec![order(1, "merlin")];

        let mut catalog = CatalogClient::new(api.clone());
        catalog.refresh().await;

        assert_eq!(catalog.products().len(), 3);
        assert_eq!(catalog.categories()[0].id, CategoryId::new(7));
        assert!(!catalog.categories_derived());
        assert_eq!(catalog.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_stale_values() {
        let api = FakeApi::with_products(catalog_products());
        let mut catalog = CatalogClient::new(api.clone());
        catalog.refresh().await;
        assert_eq!(catalog.products().len(), 3);

        api.state().fail_reads = true;
        api.state().products.clear();
        catalog.refresh().await;
        assert_eq!(catalog.products().len(), 3);
        assert_eq!(catalog.categories().len(), 2);
    }

    #[tokio::test]
    async fn test_categories_derived_on_404_and_recomputed() {
        let api = FakeApi::with_products(catalog_products());
        let mut catalog = CatalogClient::new(api.clone());
        catalog.refresh().await;
        assert!(catalog.categories_derived());
        assert_eq!(catalog.categories().len(), 2);

        api.state().products.push(product(9, "Capa", "Ropa", 80));
        catalog.refresh().await;
        let names: Vec<&str> = catalog
            .categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Pociones", "Varitas", "Ropa"]);
    }

    #[tokio::test]
    async fn test_filtered_listing_falls_back_to_cache() {
        let api = FakeApi::with_products(catalog_products());
        let mut catalog = CatalogClient::new(api.clone());
        catalog.refresh().await;

        api.state().fail_reads = true;
        let query = ProductQuery {
            category: Some("pociones".to_string()),
            sort: Some(crate::api::types::ProductSort::PriceDesc),
            ..ProductQuery::default()
        };
        let ids: Vec<i64> = catalog
            .list_products(&query)
            .await
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(catalog.products().len(), 3);
    }

    #[tokio::test]
    async fn test_get_product_caches_until_refresh() {
        let api = FakeApi::with_products(catalog_products());
        let mut catalog = CatalogClient::new(api.clone());

        let first = catalog.get_product(ProductId::new(2)).await.unwrap();
        assert_eq!(first.name, "Varita de Sauce");

        api.state().products[1].price = Price::from_soles(99);
        let cached = catalog.get_product(ProductId::new(2)).await.unwrap();
        assert_eq!(cached.price, Price::from_soles(5));
        let fetches = api
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::GetProduct(_)))
            .count();
        assert_eq!(fetches, 1);

        catalog.refresh().await;
        let fresh = catalog.get_product(ProductId::new(2)).await.unwrap();
        assert_eq!(fresh.price, Price::from_soles(99));
    }

    #[tokio::test]
    async fn test_get_product_not_found_and_offline_fallback() {
        let api = FakeApi::with_products(catalog_products());
        let mut catalog = CatalogClient::new(api.clone());
        assert!(matches!(
            catalog.get_product(ProductId::new(42)).await,
            Err(CatalogError::NotFound(_))
        ));

        catalog.refresh().await;
        api.state().fail_reads = true;
        let offline = catalog.get_product(ProductId::new(3)).await.unwrap();
        assert_eq!(offline.name, "Poción de Sueño");
    }

    #[tokio::test]
    async fn test_storefront_views_skip_inactive() {
        let mut products = Vec::new();
        for id in 1..=15 {
            let mut p = product(id, &format!("P{id}"), &format!("C{id}"), 1);
            p.is_best_seller = Some(true);
            p.is_new = Some(id % 2 == 0);
            p.is_active = id != 2;
            products.push(p);
        }
        let api = FakeApi::with_products(products);
        let mut catalog = CatalogClient::new(api);
        catalog.refresh().await;

        let best = catalog.best_sellers();
        assert_eq!(best.len(), BEST_SELLERS_LIMIT);
        assert!(best.iter().all(|p| p.id != ProductId::new(2)));

        let new_ids: Vec<i64> = catalog
            .new_arrivals()
            .iter()
            .map(|p| p.id.as_i64())
            .collect();
        assert_eq!(new_ids, vec![4, 6, 8, 10, 12, 14]);

        let featured: Vec<&str> = catalog
            .featured_categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(featured, vec!["C1", "C2", "C3"]);
        let newer: Vec<&str> = catalog
            .new_categories()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(newer, vec!["C4", "C5", "C6"]);
    }

    #[test]
    fn test_category_views_on_short_lists() {
        let catalog = CatalogClient::new(FakeApi::new());
        assert!(catalog.featured_categories().is_empty());
        assert!(catalog.new_categories().is_empty());
    }

    #[tokio::test]
    async fn test_orders_for_identity() {
        let api = FakeApi::new();
        api.state().orders = vec![
            order(1, "Merlin"),
            order(2, "morgana"),
            order(3, "merlin@tienda.pe"),
        ];
        let mut catalog = CatalogClient::new(api);
        catalog.list_orders().await;

        let identity = Identity {
            id: UserId::new(1),
            name: "Merlín".to_string(),
            email: Email::parse("merlin@tienda.pe").unwrap(),
        };
        let ids: Vec<i64> = catalog
            .orders_for(&identity)
            .iter()
            .map(|o| o.id.as_i64())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
