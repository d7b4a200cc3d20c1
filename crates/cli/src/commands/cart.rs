//! Cart commands.

use tienda_storefront::error::Result;
use tienda_storefront::services::CatalogClient;

use super::Context;
use crate::args::CartAction;
use crate::output;

pub async fn run(ctx: &Context, action: CartAction) -> Result<()> {
    let (_, mut cart) = ctx.cart().await?;

    let result = match action {
        CartAction::Show => Ok(()),
        CartAction::Add { product, quantity } => {
            let product = CatalogClient::new(ctx.api.clone())
                .get_product(product)
                .await?;
            cart.add_item(&product, quantity).await
        }
        CartAction::Remove { product } => cart.remove_item(product).await,
        CartAction::Inc { product } => cart.increase(product).await,
        CartAction::Dec { product } => cart.decrease(product).await,
        CartAction::Clear => cart.clear().await,
    };

    // A sync failure still changed the local cart
    let changed = match &result {
        Ok(()) => true,
        Err(e) => e.is_sync(),
    };
    if changed {
        output::cart(&cart);
    }
    Ok(result?)
}
