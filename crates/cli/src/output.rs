//! Plain-text rendering.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use tienda_admin::DashboardSummary;
use tienda_storefront::api::types::{Category, Order, Product, StoreUser};
use tienda_storefront::api::ApiClient;
use tienda_storefront::models::Identity;
use tienda_storefront::services::{CartReconciler, OrderConfirmation};

pub fn message(text: &str) {
    println!("{text}");
}

pub fn failure(text: &str) {
    eprintln!("error: {text}");
}

pub fn products<'a>(products: impl IntoIterator<Item = &'a Product>) {
    let mut any = false;
    for p in products {
        any = true;
        let mut flags = Vec::new();
        if !p.is_active {
            flags.push("inactive");
        }
        if p.best_seller() {
            flags.push("best seller");
        }
        if p.new_arrival() {
            flags.push("new");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", flags.join(", "))
        };
        println!("{:>5}  {:<40} {:<20} {:>12}{flags}", p.id, p.name, p.category, p.price);
    }
    if !any {
        println!("No products.");
    }
}

pub fn product(p: &Product) {
    println!("{} (#{})", p.name, p.id);
    println!("  category: {}", p.category);
    println!("  price:    {}", p.price);
    if !p.is_active {
        println!("  inactive");
    }
    if !p.description.is_empty() {
        println!();
        println!("{}", p.description);
    }
}

pub fn categories(categories: &[Category], derived: bool) {
    if categories.is_empty() {
        println!("No categories.");
        return;
    }
    for c in categories {
        if c.description.is_empty() {
            println!("{:>5}  {}", c.id, c.name);
        } else {
            println!("{:>5}  {} - {}", c.id, c.name, c.description);
        }
    }
    if derived {
        println!("(derived from product categories)");
    }
}

pub fn identity(identity: &Identity) {
    println!("{} <{}> (#{})", identity.name, identity.email, identity.id);
}

pub fn cart(cart: &CartReconciler<ApiClient>) {
    if cart.lines().is_empty() {
        println!("Your cart is empty.");
        return;
    }
    let mut shown = 0;
    for (line, p) in cart.renderable_lines() {
        shown += 1;
        println!(
            "{:>5}  {:<40} {:>3} x {:>12} = {:>12}",
            p.id,
            p.name,
            line.quantity,
            p.price,
            line.line_total()
        );
    }
    let hidden = cart.lines().len().saturating_sub(shown);
    if hidden > 0 {
        println!("({hidden} lines for products no longer in the catalog)");
    }
    println!("{} items, subtotal {}", cart.item_count(), cart.subtotal());
}

pub fn orders<'a>(orders: impl IntoIterator<Item = &'a Order>) {
    let mut any = false;
    for o in orders {
        any = true;
        println!(
            "{:>6}  {:<10} {:<24} {:>12}  {}",
            o.id,
            o.date.get(..10).unwrap_or(&o.date),
            o.customer,
            o.total,
            o.status
        );
    }
    if !any {
        println!("No orders.");
    }
}

pub fn users(users: &[StoreUser]) {
    if users.is_empty() {
        println!("No users.");
        return;
    }
    for u in users {
        let state = if u.active { "active" } else { "blocked" };
        println!("{:>6}  {:<30} {:<30} {state}", u.id, u.name, u.email);
    }
}

pub fn confirmation(order: &OrderConfirmation) {
    println!("Order #{} placed.", order.order_id);
    println!("  subtotal: {:>12}", order.totals.subtotal);
    println!("  shipping: {:>12}", order.totals.shipping);
    println!("  total:    {:>12}", order.totals.total);
    println!(
        "  ship to {}, {}, {} {}, {}",
        order.shipping.full_name,
        order.shipping.address,
        order.shipping.city,
        order.shipping.postal_code,
        order.shipping.country
    );
    println!("  payment: {}", order.payment_method);
}

pub fn dashboard(summary: &DashboardSummary) {
    println!("orders:    {}", summary.orders);
    println!("revenue:   {}", summary.revenue);
    if let Some(users) = summary.new_users {
        println!("users:     {users}");
    }
}
