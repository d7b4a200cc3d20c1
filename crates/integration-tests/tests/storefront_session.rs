//! A shopper's whole visit: account, cart and checkout over persisted storage.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use tempfile::TempDir;
use tienda_core::{PaymentMethod, Price, ProductId};
use tienda_integration_tests::{MockBackend, seeded};
use tienda_storefront::services::{
    AuthError, CartReconciler, CatalogClient, CheckoutOrchestrator, SessionStore, ShippingInfo,
};
use tienda_storefront::storage::FileStorage;

fn open(dir: &TempDir) -> SessionStore<FileStorage> {
    let hasher = SessionStore::<FileStorage>::fast_hasher().unwrap();
    SessionStore::with_argon2(FileStorage::new(dir.path()), hasher).unwrap()
}

fn secret(text: &str) -> SecretString {
    SecretString::from(text.to_string())
}

#[tokio::test]
async fn test_registered_shopper_checks_out() {
    let backend = MockBackend::start(seeded()).await;
    let dir = TempDir::new().unwrap();

    let identity = {
        let mut session = open(&dir);
        session
            .register("Viviana", "viviana@tienda.pe", &secret("lago-sagrado"))
            .unwrap()
    };

    // A new process picks up the stored identity.
    let session = open(&dir);
    assert_eq!(session.current(), Some(&identity));

    let mut catalog = CatalogClient::new(backend.client());
    catalog.refresh().await;
    let potion = catalog.find_product(ProductId::new(2)).cloned().unwrap();

    let mut cart = CartReconciler::new(backend.client());
    cart.load(&identity).await;
    cart.add_item(&potion, 3).await.unwrap();
    assert_eq!(backend.state().cart_of("viviana@tienda.pe").len(), 1);

    let shipping = ShippingInfo {
        full_name: "Viviana del Lago".to_string(),
        address: "Isla de Avalon s/n".to_string(),
        city: "Puno".to_string(),
        postal_code: "21001".to_string(),
        country: "Perú".to_string(),
        phone: Some("+51 951 000 000".to_string()),
    };
    let confirmation = CheckoutOrchestrator::new(backend.client())
        .submit(
            session.current(),
            &mut cart,
            &mut catalog,
            shipping,
            PaymentMethod::Qr,
        )
        .await
        .unwrap();

    assert_eq!(confirmation.totals.subtotal, Price::from_soles(15));
    assert_eq!(confirmation.totals.total, Price::from_soles(30));
    assert!(backend.state().cart_of("viviana@tienda.pe").is_empty());
    let placed = backend.state().orders.last().cloned().unwrap();
    assert_eq!(placed.id, confirmation.order_id);
    assert_eq!(placed.customer, format!("usuario {}", identity.id));
}

#[tokio::test]
async fn test_signed_out_shopper_cannot_reach_the_cart() {
    let dir = TempDir::new().unwrap();
    let mut session = open(&dir);
    session
        .register("Viviana", "viviana@tienda.pe", &secret("lago-sagrado"))
        .unwrap();
    session.logout().unwrap();

    let session = open(&dir);
    assert!(session.current().is_none());

    let mut session = open(&dir);
    let err = session
        .login("viviana@tienda.pe", &secret("otra-clave"))
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = session
        .login("VIVIANA@tienda.pe", &secret("lago-sagrado"))
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let identity = session
        .login("viviana@tienda.pe", &secret("lago-sagrado"))
        .unwrap();
    assert_eq!(identity.name, "Viviana");
}
