//! Order placement.

use tienda_storefront::error::Result;
use tienda_storefront::services::{CatalogClient, CheckoutOrchestrator, ShippingInfo};

use super::Context;
use crate::args::CheckoutArgs;
use crate::output;

pub async fn run(ctx: &Context, args: CheckoutArgs) -> Result<()> {
    let (identity, mut cart) = ctx.cart().await?;
    let mut catalog = CatalogClient::new(ctx.api.clone());
    let shipping = ShippingInfo {
        full_name: args.full_name,
        address: args.address,
        city: args.city,
        postal_code: args.postal_code,
        country: args.country,
        phone: args.phone,
    };

    let confirmation = CheckoutOrchestrator::new(ctx.api.clone())
        .submit(
            Some(&identity),
            &mut cart,
            &mut catalog,
            shipping,
            args.payment,
        )
        .await?;
    output::confirmation(&confirmation);
    Ok(())
}
