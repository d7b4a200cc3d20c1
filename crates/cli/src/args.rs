//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use tienda_core::{CategoryId, OrderId, PaymentMethod, Price, ProductId, UserId};
use tienda_storefront::api::types::{ProductQuery, ProductSort};

#[derive(Parser)]
#[command(name = "tienda")]
#[command(author, version, about = "Tienda storefront and back-office client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List products
    Products(ProductFilter),
    /// Show one product
    Product { id: ProductId },
    /// List categories
    Categories,
    /// Best sellers, new arrivals and featured categories
    Home,
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Manage the local account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Orders placed by the signed-in account
    Orders,
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order for the cart
    Checkout(CheckoutArgs),
    /// Back-office operations
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Args)]
pub struct ProductFilter {
    /// Substring of the name or description
    #[arg(short, long)]
    pub search: Option<String>,
    #[arg(short, long)]
    pub category: Option<String>,
    #[arg(long, value_enum)]
    pub sort: Option<SortArg>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    /// Only best sellers
    #[arg(long)]
    pub best_sellers: bool,
    /// Only new arrivals
    #[arg(long)]
    pub new: bool,
}

impl From<ProductFilter> for ProductQuery {
    fn from(filter: ProductFilter) -> Self {
        Self {
            search: filter.search,
            category: filter.category,
            sort: filter.sort.map(Into::into),
            page: filter.page,
            limit: filter.limit,
            best_sellers_only: filter.best_sellers,
            new_only: filter.new,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SortArg {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl From<SortArg> for ProductSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::PriceAsc => Self::PriceAsc,
            SortArg::PriceDesc => Self::PriceDesc,
            SortArg::NameAsc => Self::NameAsc,
            SortArg::NameDesc => Self::NameDesc,
        }
    }
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Change the display name
    Rename { name: String },
    /// Change the password of the signed-in account
    Passwd {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
    /// Set a new password for an account without the old one
    Recover {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        product: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove { product: ProductId },
    /// Add one unit
    Inc { product: ProductId },
    /// Take one unit away, removing the line at zero
    Dec { product: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub full_name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub postal_code: String,
    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// `qr` or `card`
    #[arg(long, default_value = "qr")]
    pub payment: PaymentMethod,
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Manage products
    Product {
        #[command(subcommand)]
        action: AdminProductAction,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: AdminCategoryAction,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: AdminUserAction,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: AdminOrderAction,
    },
    /// Order count and revenue, today or within a date range
    Dashboard {
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
}

#[derive(Args)]
pub struct ProductFields {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub category: String,
    #[arg(short, long)]
    pub price: Price,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "")]
    pub image: String,
    /// Create or save the product as inactive
    #[arg(long)]
    pub inactive: bool,
    #[arg(long)]
    pub best_seller: bool,
    #[arg(long)]
    pub new: bool,
}

#[derive(Subcommand)]
pub enum AdminProductAction {
    /// List every product, inactive ones included
    List,
    Create(ProductFields),
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Flip between active and inactive
    Toggle { id: ProductId },
    Delete { id: ProductId },
}

#[derive(Subcommand)]
pub enum AdminCategoryAction {
    List,
    Create {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Update {
        id: CategoryId,
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Delete { id: CategoryId },
}

#[derive(Subcommand)]
pub enum AdminUserAction {
    List,
    /// Flip between active and blocked
    Toggle { id: UserId },
    Delete { id: UserId },
    /// Orders placed by the user
    Orders { id: UserId },
}

#[derive(Subcommand)]
pub enum AdminOrderAction {
    List,
    Cancel { id: OrderId },
}
