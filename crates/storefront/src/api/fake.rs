//! In-process [`StoreApi`] double for service unit tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tienda_core::{CartLineId, Email, OrderId, Price, ProductId};

use super::types::{
    CartDelta, CartRemoval, Category, CreateOrderRequest, CreateOrderResponse, Order, Product,
    ProductQuery, RemoteCartLine, StoreUser,
};
use super::{ApiError, StoreApi};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProducts,
    GetProduct(ProductId),
    ListCategories,
    ListUsers,
    ListOrders,
    FetchCart(String),
    AddToCart { product_id: ProductId, quantity: i64 },
    RemoveFromCart(ProductId),
    ClearCart(String),
    CreateOrder,
}

/// Mutable backend state behind the fake.
#[derive(Debug, Default)]
pub struct FakeState {
    pub products: Vec<Product>,
    /// `None` makes `/categories` answer 404.
    pub categories: Option<Vec<Category>>,
    pub users: Vec<StoreUser>,
    pub orders: Vec<Order>,
    pub carts: BTreeMap<String, Vec<RemoteCartLine>>,
    pub order_response: Option<CreateOrderResponse>,
    pub last_order: Option<CreateOrderRequest>,
    pub calls: Vec<Call>,
    pub fail_reads: bool,
    pub fail_cart_fetch: bool,
    pub fail_mutations: bool,
    pub fail_orders: bool,
}

/// Cloneable handle to a shared [`FakeState`].
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

/// An active product priced in whole soles.
pub fn product(id: i64, name: &str, category: &str, soles: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        price: Price::from_soles(soles),
        description: String::new(),
        image: String::new(),
        is_active: true,
        is_best_seller: None,
        is_new: None,
    }
}

fn unavailable() -> ApiError {
    ApiError::Status {
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "unavailable".to_string(),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let api = Self::new();
        api.state().products = products;
        api
    }

    #[allow(clippy::unwrap_used)]
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Remote cart lines currently stored for `user_key`.
    pub fn remote_cart(&self, user_key: &str) -> Vec<RemoteCartLine> {
        self.state().carts.get(user_key).cloned().unwrap_or_default()
    }

    pub fn seed_cart(&self, user_key: &str, lines: &[(i64, i64)]) {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(i, &(product, quantity))| RemoteCartLine {
                id: Some(CartLineId::new(i64::try_from(i).unwrap_or_default() + 1)),
                user_id: user_key.to_string(),
                product_id: ProductId::new(product),
                quantity,
            })
            .collect();
        self.state().carts.insert(user_key.to_string(), lines);
    }
}

impl StoreApi for FakeApi {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::ListProducts);
        if state.fail_reads {
            return Err(unavailable());
        }
        Ok(query.apply(&state.products))
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::GetProduct(id));
        if state.fail_reads {
            return Err(unavailable());
        }
        state
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("/products/{id}")))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::ListCategories);
        if state.fail_reads {
            return Err(unavailable());
        }
        state
            .categories
            .clone()
            .ok_or_else(|| ApiError::NotFound("/categories".to_string()))
    }

    async fn list_users(&self) -> Result<Vec<StoreUser>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::ListUsers);
        if state.fail_reads {
            return Err(unavailable());
        }
        Ok(state.users.clone())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::ListOrders);
        if state.fail_reads {
            return Err(unavailable());
        }
        Ok(state.orders.clone())
    }

    async fn fetch_cart(&self, user_key: &Email) -> Result<Vec<RemoteCartLine>, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::FetchCart(user_key.to_string()));
        if state.fail_cart_fetch {
            return Err(unavailable());
        }
        Ok(state
            .carts
            .get(user_key.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn add_to_cart(&self, delta: &CartDelta) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(Call::AddToCart {
            product_id: delta.product_id,
            quantity: delta.quantity,
        });
        if state.fail_mutations {
            return Err(unavailable());
        }
        let lines = state.carts.entry(delta.user_id.to_string()).or_default();
        if let Some(line) = lines.iter_mut().find(|l| l.product_id == delta.product_id) {
            line.quantity += delta.quantity;
        } else {
            lines.push(RemoteCartLine {
                id: None,
                user_id: delta.user_id.to_string(),
                product_id: delta.product_id,
                quantity: delta.quantity,
            });
        }
        lines.retain(|l| l.quantity > 0);
        Ok(())
    }

    async fn remove_from_cart(&self, removal: &CartRemoval) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(Call::RemoveFromCart(removal.product_id));
        if state.fail_mutations {
            return Err(unavailable());
        }
        if let Some(lines) = state.carts.get_mut(removal.user_id.as_str()) {
            lines.retain(|l| l.product_id != removal.product_id);
        }
        Ok(())
    }

    async fn clear_cart(&self, user_key: &Email) -> Result<(), ApiError> {
        let mut state = self.state();
        state.calls.push(Call::ClearCart(user_key.to_string()));
        if state.fail_mutations {
            return Err(unavailable());
        }
        state.carts.remove(user_key.as_str());
        Ok(())
    }

    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let mut state = self.state();
        state.calls.push(Call::CreateOrder);
        state.last_order = Some(request.clone());
        if state.fail_orders {
            return Err(unavailable());
        }
        Ok(state
            .order_response
            .clone()
            .unwrap_or_else(|| CreateOrderResponse {
                success: true,
                order_id: Some(OrderId::new(1001)),
                message: None,
            }))
    }
}
