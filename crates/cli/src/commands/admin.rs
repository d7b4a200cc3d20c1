//! Back-office commands.

use tienda_admin::{AdminClient, CategoryInput, DateRange, ProductInput};
use tienda_storefront::api::ApiClient;

use super::Context;
use crate::args::{
    AdminAction, AdminCategoryAction, AdminOrderAction, AdminProductAction, AdminUserAction,
    ProductFields,
};
use crate::error::Result;
use crate::output;

impl From<ProductFields> for ProductInput {
    fn from(fields: ProductFields) -> Self {
        Self {
            description: fields.description,
            image: fields.image,
            is_active: !fields.inactive,
            is_best_seller: fields.best_seller,
            is_new: fields.new,
            ..Self::new(fields.name, fields.category, fields.price)
        }
    }
}

pub async fn run(ctx: &Context, action: AdminAction) -> Result<()> {
    let mut admin = AdminClient::new(ctx.api.clone());
    admin.refresh().await;

    match action {
        AdminAction::Product { action } => product(&mut admin, action).await,
        AdminAction::Category { action } => category(&mut admin, action).await,
        AdminAction::User { action } => user(&mut admin, action).await,
        AdminAction::Order { action } => order(&mut admin, action).await,
        AdminAction::Dashboard { from, to } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => Some(DateRange::new(from, to)?),
                _ => None,
            };
            output::dashboard(&admin.dashboard(range));
            Ok(())
        }
    }
}

async fn product(admin: &mut AdminClient<ApiClient>, action: AdminProductAction) -> Result<()> {
    match action {
        AdminProductAction::List => {}
        AdminProductAction::Create(fields) => admin.create_product(fields.into()).await?,
        AdminProductAction::Update { id, fields } => {
            admin.update_product(id, fields.into()).await?;
        }
        AdminProductAction::Toggle { id } => {
            let active = admin.toggle_product_active(id).await?;
            output::message(if active {
                "Product activated."
            } else {
                "Product deactivated."
            });
        }
        AdminProductAction::Delete { id } => admin.delete_product(id).await?,
    }
    output::products(admin.catalog().products());
    Ok(())
}

async fn category(
    admin: &mut AdminClient<ApiClient>,
    action: AdminCategoryAction,
) -> Result<()> {
    match action {
        AdminCategoryAction::List => {}
        AdminCategoryAction::Create { name, description } => {
            admin
                .create_category(CategoryInput::new(name, description))
                .await?;
        }
        AdminCategoryAction::Update {
            id,
            name,
            description,
        } => {
            admin
                .update_category(id, CategoryInput::new(name, description))
                .await?;
        }
        AdminCategoryAction::Delete { id } => admin.delete_category(id).await?,
    }
    output::categories(
        admin.catalog().categories(),
        admin.catalog().categories_derived(),
    );
    Ok(())
}

async fn user(admin: &mut AdminClient<ApiClient>, action: AdminUserAction) -> Result<()> {
    match action {
        AdminUserAction::List => {}
        AdminUserAction::Toggle { id } => {
            let active = admin.toggle_user_active(id).await?;
            output::message(if active {
                "User activated."
            } else {
                "User blocked."
            });
        }
        AdminUserAction::Delete { id } => admin.delete_user(id).await?,
        AdminUserAction::Orders { id } => {
            output::orders(admin.orders_for_user(id)?);
            return Ok(());
        }
    }
    output::users(admin.catalog().users());
    Ok(())
}

async fn order(admin: &mut AdminClient<ApiClient>, action: AdminOrderAction) -> Result<()> {
    match action {
        AdminOrderAction::List => {}
        AdminOrderAction::Cancel { id } => {
            admin.cancel_order(id).await?;
            output::message("Order cancelled.");
        }
    }
    output::orders(admin.catalog().orders());
    Ok(())
}
