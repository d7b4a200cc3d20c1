//! End-to-end test support for Tienda.
//!
//! [`MockBackend`] serves the storefront REST API from memory on an ephemeral
//! local port, so the real [`ApiClient`] can be exercised without a backend.
//! Tests seed a [`BackendState`], inspect it after the fact, and flip its
//! failure flags to simulate an unavailable or rejecting backend.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tienda_core::{CartLineId, OrderId, OrderStatus, Price, ProductId, UserId};
use tienda_storefront::api::ApiClient;
use tienda_storefront::api::types::{
    CartDelta, CartRemoval, Category, CreateOrderRequest, CreateOrderResponse, Order, OrderItem,
    Product, RemoteCartLine, StoreUser,
};
use tienda_storefront::config::ApiConfig;
use tienda_storefront::models::Identity;

/// Everything the mock backend stores, plus failure switches.
#[derive(Debug)]
pub struct BackendState {
    pub products: Vec<Product>,
    /// `None` makes every `/categories` route answer 404.
    pub categories: Option<Vec<Category>>,
    pub users: Vec<StoreUser>,
    pub orders: Vec<Order>,
    pub cart_lines: Vec<RemoteCartLine>,
    /// Date recorded on created orders.
    pub order_date: String,
    next_id: i64,
    /// `METHOD /path?query` of every request received.
    pub requests: Vec<String>,
    /// Answer 500 to catalog, category, user and order listings.
    pub fail_reads: bool,
    /// Answer 500 to `GET /cart/:user`.
    pub fail_cart_fetch: bool,
    /// Answer 500 to cart and back-office mutations.
    pub fail_mutations: bool,
    /// Answer 500 to `POST /orders/create`.
    pub fail_orders: bool,
    /// Answer `{success: false}` to `POST /orders/create`.
    pub reject_orders: bool,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            categories: Some(Vec::new()),
            users: Vec::new(),
            orders: Vec::new(),
            cart_lines: Vec::new(),
            order_date: "2025-11-02T15:04:05.000Z".to_string(),
            next_id: 100,
            requests: Vec::new(),
            fail_reads: false,
            fail_cart_fetch: false,
            fail_mutations: false,
            fail_orders: false,
            reject_orders: false,
        }
    }
}

impl BackendState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Cart lines stored for `user_key`.
    #[must_use]
    pub fn cart_of(&self, user_key: &str) -> Vec<(ProductId, i64)> {
        self.cart_lines
            .iter()
            .filter(|l| l.user_id == user_key)
            .map(|l| (l.product_id, l.quantity))
            .collect()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// An active product priced in whole soles.
#[must_use]
pub fn product(id: i64, name: &str, category: &str, soles: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        price: Price::from_soles(soles),
        description: format!("{name}, hecho a mano"),
        image: format!("https://img.tienda.pe/{id}.jpg"),
        is_active: true,
        is_best_seller: None,
        is_new: None,
    }
}

#[must_use]
pub fn category(id: i64, name: &str) -> Category {
    Category {
        id: tienda_core::CategoryId::new(id),
        name: name.to_string(),
        description: String::new(),
    }
}

#[must_use]
pub fn user(id: i64, name: &str, email: &str) -> StoreUser {
    StoreUser {
        id: UserId::new(id),
        name: name.to_string(),
        email: email.to_string(),
        active: true,
    }
}

#[must_use]
pub fn order(id: i64, customer: &str, soles: u32, date: &str) -> Order {
    Order {
        id: OrderId::new(id),
        customer: customer.to_string(),
        total: Price::from_soles(soles),
        status: OrderStatus::Pending,
        date: date.to_string(),
        items: Vec::new(),
    }
}

/// A signed-in identity, as the session store would produce it.
#[must_use]
pub fn identity(id: i64, name: &str, email: &str) -> Identity {
    Identity {
        id: UserId::new(id),
        name: name.to_string(),
        email: email.parse().expect("fixture email is valid"),
    }
}

/// A small catalog: a wand, a potion and a cloak in three categories.
#[must_use]
pub fn seeded() -> BackendState {
    let mut wand = product(1, "Varita de saúco", "Varitas", 10);
    wand.is_best_seller = Some(true);
    let mut potion = product(2, "Poción de invisibilidad", "Pociones", 5);
    potion.is_new = Some(true);
    let cloak = product(3, "Capa de viaje", "Ropa", 80);

    BackendState {
        products: vec![wand, potion, cloak],
        categories: Some(vec![
            category(1, "Varitas"),
            category(2, "Pociones"),
            category(3, "Ropa"),
        ]),
        users: vec![
            user(1, "Merlín", "merlin@tienda.pe"),
            user(2, "Morgana", "morgana@tienda.pe"),
        ],
        orders: vec![
            order(1, "Merlín", 40, "2025-11-01"),
            order(2, "Morgana", 25, "2025-11-02"),
        ],
        ..BackendState::default()
    }
}

// =============================================================================
// Server
// =============================================================================

type Shared = Arc<Mutex<BackendState>>;

/// In-process backend bound to `127.0.0.1` on an ephemeral port.
///
/// The server task is aborted when the handle is dropped.
pub struct MockBackend {
    base_url: String,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Serve `state` until the handle is dropped.
    pub async fn start(state: BackendState) -> Self {
        let shared = Arc::new(Mutex::new(state));
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        let app = router(Arc::clone(&shared));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state: shared,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A client pointed at this backend.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(&self.base_url).expect("mock backend URL is valid"))
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }

    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }
}

/// A client pointed at a local port nothing listens on.
#[must_use]
pub fn unreachable_client() -> ApiClient {
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("reserve a local port");
    ApiClient::new(&ApiConfig::new(&format!("http://{addr}/api")).expect("URL is valid"))
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn router(state: Shared) -> Router {
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            put(update_category).delete(delete_category),
        )
        .route("/users", get(list_users))
        .route("/users/{id}", put(update_user).delete(delete_user))
        .route("/orders", get(list_orders))
        .route("/orders/create", post(create_order))
        .route("/orders/{id}", put(update_order))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/remove", delete(remove_from_cart))
        .route("/cart/clear/{user}", delete(clear_cart))
        .route("/cart/{user}", get(fetch_cart));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(Arc::clone(&state), record))
        .with_state(state)
}

async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map_or_else(|| request.uri().path().to_string(), ToString::to_string);
    lock(&state)
        .requests
        .push(format!("{} {target}", request.method()));
    next.run(request).await
}

type Reply<T> = Result<T, StatusCode>;

const fn fail_if(flag: bool) -> Reply<()> {
    if flag {
        Err(StatusCode::INTERNAL_SERVER_ERROR)
    } else {
        Ok(())
    }
}

/// Overlay the fields of `patch` on `base` and read the result as a `T`.
fn overlay<T: DeserializeOwned>(mut base: Value, patch: Value) -> Reply<T> {
    if let (Some(target), Value::Object(fields)) = (base.as_object_mut(), patch) {
        target.extend(fields);
    }
    serde_json::from_value(base).map_err(|_| StatusCode::BAD_REQUEST)
}

/// Overlay the fields of `patch` on the JSON form of `current`.
fn merge<T: Serialize + DeserializeOwned>(current: &T, patch: Value) -> Reply<T> {
    let base = serde_json::to_value(current).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    overlay(base, patch)
}

fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Reply<StatusCode> {
    let before = items.len();
    items.retain(|item| !matches(item));
    if items.len() == before {
        Err(StatusCode::NOT_FOUND)
    } else {
        Ok(StatusCode::NO_CONTENT)
    }
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_products(State(state): State<Shared>) -> Reply<Json<Vec<Product>>> {
    let state = lock(&state);
    fail_if(state.fail_reads)?;
    Ok(Json(state.products.clone()))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<i64>) -> Reply<Json<Product>> {
    let state = lock(&state);
    fail_if(state.fail_reads)?;
    state
        .products
        .iter()
        .find(|p| p.id.as_i64() == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_product(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Reply<(StatusCode, Json<Product>)> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let id = state.next_id();
    let product: Product = overlay(json!({ "id": id }), body)?;
    state.products.push(product.clone());
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply<Json<Product>> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let slot = state
        .products
        .iter_mut()
        .find(|p| p.id.as_i64() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = merge(slot, body)?;
    Ok(Json(slot.clone()))
}

async fn delete_product(State(state): State<Shared>, Path(id): Path<i64>) -> Reply<StatusCode> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    remove_by(&mut state.products, |p| p.id.as_i64() == id)
}

async fn list_categories(State(state): State<Shared>) -> Reply<Json<Vec<Category>>> {
    let state = lock(&state);
    fail_if(state.fail_reads)?;
    state.categories.clone().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_category(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Reply<(StatusCode, Json<Category>)> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let id = state.next_id();
    let categories = state.categories.as_mut().ok_or(StatusCode::NOT_FOUND)?;
    let category: Category = overlay(json!({ "id": id }), body)?;
    categories.push(category.clone());
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply<Json<Category>> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let slot = state
        .categories
        .as_mut()
        .ok_or(StatusCode::NOT_FOUND)?
        .iter_mut()
        .find(|c| c.id.as_i64() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = merge(slot, body)?;
    Ok(Json(slot.clone()))
}

async fn delete_category(State(state): State<Shared>, Path(id): Path<i64>) -> Reply<StatusCode> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let categories = state.categories.as_mut().ok_or(StatusCode::NOT_FOUND)?;
    remove_by(categories, |c| c.id.as_i64() == id)
}

// =============================================================================
// Users and Orders
// =============================================================================

async fn list_users(State(state): State<Shared>) -> Reply<Json<Vec<StoreUser>>> {
    let state = lock(&state);
    fail_if(state.fail_reads)?;
    Ok(Json(state.users.clone()))
}

async fn update_user(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply<Json<StoreUser>> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let slot = state
        .users
        .iter_mut()
        .find(|u| u.id.as_i64() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = merge(slot, body)?;
    Ok(Json(slot.clone()))
}

async fn delete_user(State(state): State<Shared>, Path(id): Path<i64>) -> Reply<StatusCode> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    remove_by(&mut state.users, |u| u.id.as_i64() == id)
}

async fn list_orders(State(state): State<Shared>) -> Reply<Json<Vec<Order>>> {
    let state = lock(&state);
    fail_if(state.fail_reads)?;
    Ok(Json(state.orders.clone()))
}

async fn update_order(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply<Json<Order>> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let slot = state
        .orders
        .iter_mut()
        .find(|o| o.id.as_i64() == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = merge(slot, body)?;
    Ok(Json(slot.clone()))
}

async fn create_order(
    State(state): State<Shared>,
    Json(request): Json<CreateOrderRequest>,
) -> Reply<Json<CreateOrderResponse>> {
    let mut state = lock(&state);
    fail_if(state.fail_orders)?;
    if state.reject_orders {
        return Ok(Json(CreateOrderResponse {
            success: false,
            order_id: None,
            message: Some("stock insuficiente".to_string()),
        }));
    }

    let id = OrderId::new(state.next_id());
    let customer = state
        .users
        .iter()
        .find(|u| u.id == request.user_id)
        .map_or_else(|| format!("usuario {}", request.user_id), |u| u.name.clone());
    let items = request
        .items
        .into_iter()
        .map(|line| OrderItem {
            product_id: line.product_id,
            quantity: line.quantity,
            product: line.product,
        })
        .collect();
    let date = state.order_date.clone();
    state.orders.push(Order {
        id,
        customer,
        total: request.total,
        status: OrderStatus::Pending,
        date,
        items,
    });

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: Some(id),
        message: None,
    }))
}

// =============================================================================
// Cart
// =============================================================================

async fn fetch_cart(
    State(state): State<Shared>,
    Path(user): Path<String>,
) -> Reply<Json<Vec<RemoteCartLine>>> {
    let state = lock(&state);
    fail_if(state.fail_cart_fetch)?;
    Ok(Json(
        state
            .cart_lines
            .iter()
            .filter(|l| l.user_id == user)
            .cloned()
            .collect(),
    ))
}

async fn add_to_cart(State(state): State<Shared>, Json(delta): Json<CartDelta>) -> Reply<StatusCode> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let user = delta.user_id.to_string();

    let existing = state
        .cart_lines
        .iter()
        .position(|l| l.user_id == user && l.product_id == delta.product_id);
    if let Some(line) = existing.and_then(|i| state.cart_lines.get_mut(i)) {
        line.quantity += delta.quantity;
    } else if delta.quantity > 0 {
        let id = CartLineId::new(state.next_id());
        state.cart_lines.push(RemoteCartLine {
            id: Some(id),
            user_id: user,
            product_id: delta.product_id,
            quantity: delta.quantity,
        });
    }
    state.cart_lines.retain(|l| l.quantity > 0);
    Ok(StatusCode::OK)
}

async fn remove_from_cart(
    State(state): State<Shared>,
    Json(removal): Json<CartRemoval>,
) -> Reply<StatusCode> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    let user = removal.user_id.to_string();
    state
        .cart_lines
        .retain(|l| !(l.user_id == user && l.product_id == removal.product_id));
    Ok(StatusCode::OK)
}

async fn clear_cart(State(state): State<Shared>, Path(user): Path<String>) -> Reply<StatusCode> {
    let mut state = lock(&state);
    fail_if(state.fail_mutations)?;
    state.cart_lines.retain(|l| l.user_id != user);
    Ok(StatusCode::OK)
}
