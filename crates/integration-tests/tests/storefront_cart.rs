//! Cart reconciliation against the mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use tienda_core::{Price, ProductId};
use tienda_integration_tests::{MockBackend, identity, product, seeded};
use tienda_storefront::api::types::RemoteCartLine;
use tienda_storefront::services::{CartError, CartReconciler};

const KEY: &str = "merlin@tienda.pe";

fn remote(product_id: i64, quantity: i64) -> RemoteCartLine {
    RemoteCartLine {
        id: None,
        user_id: KEY.to_string(),
        product_id: ProductId::new(product_id),
        quantity,
    }
}

async fn loaded(backend: &MockBackend) -> CartReconciler<tienda_storefront::api::ApiClient> {
    let mut cart = CartReconciler::new(backend.client());
    cart.load(&identity(1, "Merlín", KEY)).await;
    cart
}

#[tokio::test]
async fn test_load_resolves_products_and_keeps_unknown_lines() {
    let mut state = seeded();
    state.cart_lines = vec![remote(1, 2), remote(99, 1), remote(2, 0)];
    let backend = MockBackend::start(state).await;

    let cart = loaded(&backend).await;

    assert_eq!(cart.lines().len(), 2);
    assert_eq!(cart.quantity_of(ProductId::new(1)), 2);
    assert!(cart.lines()[1].product.is_none());
    assert_eq!(cart.renderable_lines().count(), 1);
    assert_eq!(cart.subtotal(), Price::from_soles(20));
}

#[tokio::test]
async fn test_load_merges_duplicate_remote_rows() {
    let mut state = seeded();
    state.cart_lines = vec![remote(3, 1), remote(3, 2)];
    let backend = MockBackend::start(state).await;

    let cart = loaded(&backend).await;

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.quantity_of(ProductId::new(3)), 3);
}

#[tokio::test]
async fn test_load_ignores_other_users_lines() {
    let mut state = seeded();
    state.cart_lines = vec![RemoteCartLine {
        user_id: "morgana@tienda.pe".to_string(),
        ..remote(1, 4)
    }];
    let backend = MockBackend::start(state).await;

    let cart = loaded(&backend).await;

    assert!(cart.is_loaded());
    assert!(cart.lines().is_empty());
}

#[tokio::test]
async fn test_load_with_unreachable_cart_starts_empty() {
    let mut state = seeded();
    state.cart_lines = vec![remote(1, 2)];
    state.fail_cart_fetch = true;
    let backend = MockBackend::start(state).await;

    let cart = loaded(&backend).await;

    assert!(cart.is_loaded());
    assert!(cart.lines().is_empty());
}

#[tokio::test]
async fn test_adding_twice_merges_into_one_line() {
    let backend = MockBackend::start(seeded()).await;
    let mut cart = loaded(&backend).await;
    let wand = product(1, "Varita de saúco", "Varitas", 10);

    cart.add_item(&wand, 2).await.unwrap();
    cart.add_item(&wand, 3).await.unwrap();

    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.quantity_of(wand.id), 5);
    assert_eq!(backend.state().cart_of(KEY), vec![(wand.id, 5)]);

    let adds = backend
        .requests()
        .iter()
        .filter(|r| r.as_str() == "POST /api/cart/add")
        .count();
    assert_eq!(adds, 2);
}

#[tokio::test]
async fn test_increase_and_decrease_stay_in_step_with_backend() {
    let mut state = seeded();
    state.cart_lines = vec![remote(2, 1)];
    let backend = MockBackend::start(state).await;
    let mut cart = loaded(&backend).await;
    let potion = ProductId::new(2);

    cart.increase(potion).await.unwrap();
    assert_eq!(cart.quantity_of(potion), 2);
    assert_eq!(backend.state().cart_of(KEY), vec![(potion, 2)]);

    cart.decrease(potion).await.unwrap();
    cart.decrease(potion).await.unwrap();
    assert!(cart.lines().is_empty());
    assert!(backend.state().cart_of(KEY).is_empty());
}

#[tokio::test]
async fn test_remove_and_clear() {
    let mut state = seeded();
    state.cart_lines = vec![remote(1, 1), remote(2, 3), remote(3, 1)];
    let backend = MockBackend::start(state).await;
    let mut cart = loaded(&backend).await;

    cart.remove_item(ProductId::new(2)).await.unwrap();
    assert_eq!(cart.lines().len(), 2);
    assert_eq!(backend.state().cart_of(KEY).len(), 2);
    assert!(backend
        .requests()
        .contains(&"DELETE /api/cart/remove".to_string()));

    cart.clear().await.unwrap();
    assert!(cart.lines().is_empty());
    assert!(backend.state().cart_of(KEY).is_empty());
}

#[tokio::test]
async fn test_remove_missing_line_sends_nothing() {
    let backend = MockBackend::start(seeded()).await;
    let mut cart = loaded(&backend).await;
    backend.clear_requests();

    let err = cart.remove_item(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CartError::LineNotFound(_)));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_sync_failure_keeps_local_change() {
    let backend = MockBackend::start(seeded()).await;
    let mut cart = loaded(&backend).await;
    backend.state().fail_mutations = true;
    let cloak = product(3, "Capa de viaje", "Ropa", 80);

    let err = cart.add_item(&cloak, 1).await.unwrap_err();

    assert!(err.is_sync());
    assert_eq!(cart.quantity_of(cloak.id), 1);
    assert!(backend.state().cart_of(KEY).is_empty());
}

#[tokio::test]
async fn test_clear_empties_local_cart_even_when_backend_fails() {
    let mut state = seeded();
    state.cart_lines = vec![remote(1, 2)];
    let backend = MockBackend::start(state).await;
    let mut cart = loaded(&backend).await;
    backend.state().fail_mutations = true;

    let err = cart.clear().await.unwrap_err();

    assert!(err.is_sync());
    assert!(cart.lines().is_empty());
    assert_eq!(backend.state().cart_of(KEY).len(), 1);
}

#[tokio::test]
async fn test_unloaded_cart_rejects_mutations_without_requests() {
    let backend = MockBackend::start(seeded()).await;
    let mut cart = CartReconciler::new(backend.client());

    let err = cart
        .add_item(&product(1, "Varita de saúco", "Varitas", 10), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::NotAuthenticated));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_user_key_with_plus_sign_round_trips() {
    let key = "ana.maria+tienda@tienda.pe";
    let mut state = seeded();
    state.cart_lines = vec![RemoteCartLine {
        user_id: key.to_string(),
        ..remote(1, 1)
    }];
    let backend = MockBackend::start(state).await;

    let mut cart = CartReconciler::new(backend.client());
    cart.load(&identity(7, "Ana", key)).await;
    assert_eq!(cart.quantity_of(ProductId::new(1)), 1);

    cart.clear().await.unwrap();
    assert!(backend.state().cart_of(key).is_empty());
}
