//! Command handlers.
//!
//! Storefront commands return [`tienda_storefront::error::Result`]; the
//! back-office commands return the CLI [`Result`](crate::error::Result).

mod account;
mod admin;
mod cart;
mod catalog;
mod checkout;

use tienda_storefront::api::ApiClient;
use tienda_storefront::config::ClientConfig;
use tienda_storefront::error::Result as AppResult;
use tienda_storefront::models::Identity;
use tienda_storefront::services::{AuthError, CartReconciler, SessionStore};
use tienda_storefront::storage::FileStorage;

use crate::args::{Command, CartAction};
use crate::error::Result;

/// Per-invocation services.
pub struct Context {
    pub api: ApiClient,
    pub session: SessionStore<FileStorage>,
}

impl Context {
    /// Open the stored session and build the API client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` if local storage cannot be read.
    pub fn open(config: &ClientConfig) -> AppResult<Self> {
        let session = SessionStore::open(FileStorage::new(config.data_dir.clone()))?;
        Ok(Self {
            api: ApiClient::new(&config.api),
            session,
        })
    }

    /// The signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when signed out.
    pub fn identity(&self) -> AppResult<Identity> {
        Ok(self
            .session
            .current()
            .cloned()
            .ok_or(AuthError::NotAuthenticated)?)
    }

    /// The cart of the signed-in identity, loaded from the backend.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` when signed out.
    pub async fn cart(&self) -> AppResult<(Identity, CartReconciler<ApiClient>)> {
        let identity = self.identity()?;
        let mut cart = CartReconciler::new(self.api.clone());
        cart.load(&identity).await;
        Ok((identity, cart))
    }
}

/// Run one command.
///
/// # Errors
///
/// Returns the failure of the command.
pub async fn run(command: Command, config: &ClientConfig) -> Result<()> {
    let mut ctx = Context::open(config)?;

    match command {
        Command::Products(filter) => catalog::products(&ctx, filter.into()).await?,
        Command::Product { id } => catalog::product(&ctx, id).await?,
        Command::Categories => catalog::categories(&ctx).await,
        Command::Home => catalog::home(&ctx).await,
        Command::Orders => catalog::orders(&ctx).await?,
        Command::Register {
            name,
            email,
            password,
        } => account::register(&mut ctx, &name, &email, password)?,
        Command::Login { email, password } => account::login(&mut ctx, &email, password)?,
        Command::Logout => account::logout(&mut ctx)?,
        Command::Whoami => account::whoami(&ctx)?,
        Command::Account { action } => account::manage(&mut ctx, action)?,
        Command::Cart { action } => cart::run(&ctx, action.unwrap_or(CartAction::Show)).await?,
        Command::Checkout(args) => checkout::run(&ctx, args).await?,
        Command::Admin { action } => admin::run(&ctx, action).await?,
    }
    Ok(())
}
