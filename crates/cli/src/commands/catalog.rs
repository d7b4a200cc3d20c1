//! Catalog browsing.

use tienda_core::ProductId;
use tienda_storefront::api::types::ProductQuery;
use tienda_storefront::error::Result;
use tienda_storefront::services::CatalogClient;

use super::Context;
use crate::output;

pub async fn products(ctx: &Context, query: ProductQuery) -> Result<()> {
    let mut catalog = CatalogClient::new(ctx.api.clone());
    let products = catalog.list_products(&query).await;
    output::products(products.iter().filter(|p| p.is_active));
    Ok(())
}

pub async fn product(ctx: &Context, id: ProductId) -> Result<()> {
    let catalog = CatalogClient::new(ctx.api.clone());
    let product = catalog.get_product(id).await?;
    output::product(&product);
    Ok(())
}

pub async fn categories(ctx: &Context) {
    let mut catalog = CatalogClient::new(ctx.api.clone());
    catalog.refresh().await;
    output::categories(catalog.categories(), catalog.categories_derived());
}

/// Storefront landing views.
pub async fn home(ctx: &Context) {
    let mut catalog = CatalogClient::new(ctx.api.clone());
    catalog.refresh().await;

    output::message("Best sellers");
    output::products(catalog.best_sellers());
    output::message("\nNew arrivals");
    output::products(catalog.new_arrivals());
    output::message("\nFeatured categories");
    output::categories(catalog.featured_categories(), false);
    output::message("\nNew categories");
    output::categories(catalog.new_categories(), false);
}

/// Orders placed by the signed-in account.
pub async fn orders(ctx: &Context) -> Result<()> {
    let identity = ctx.identity()?;
    let mut catalog = CatalogClient::new(ctx.api.clone());
    catalog.list_orders().await;
    output::orders(catalog.orders_for(&identity));
    Ok(())
}
