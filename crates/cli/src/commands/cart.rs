//! Cart commands.

use yarnshop_core::cart::Cart;
use yarnshop_core::{ProductId, Quantity, display_price};

use crate::commands::Context;
use crate::error::CliError;

/// Print the cart lines, item count and subtotal.
pub fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "#{:<4} {:<40} {:>4} x {:>12} = {:>12}",
            line.product.id.as_i32(),
            line.product.name,
            line.quantity,
            display_price(line.product.price),
            display_price(line.line_total()),
        );
    }
    println!("Items:    {}", cart.item_count());
    println!("Subtotal: {}", display_price(cart.subtotal()));
}

pub fn show(ctx: &Context) {
    print_cart(ctx.cart().cart());
}

/// Fetch a product and add it to the cart, merging with an existing line.
///
/// # Errors
///
/// Returns `CliError::Api` if the product cannot be fetched.
pub async fn add(ctx: &Context, id: ProductId, quantity: Quantity) -> Result<(), CliError> {
    let product = ctx.client()?.product(id).await?;
    let name = product.name.clone();

    let mut cart = ctx.cart();
    cart.add(product, quantity)?;

    let in_cart = cart.cart().line(id).map_or(quantity, |line| line.quantity);
    println!("Added {quantity} x {name} to cart ({in_cart} in cart)");
    Ok(())
}

/// Set a line's quantity. Values below 1 are raised to 1.
///
/// # Errors
///
/// Returns `CliError::Storage` if the cart cannot be saved.
pub fn update(ctx: &Context, id: ProductId, quantity: i64) -> Result<(), CliError> {
    let mut cart = ctx.cart();
    if cart.cart().line(id).is_none() {
        println!("Product #{id} is not in your cart");
        return Ok(());
    }

    let quantity = Quantity::clamped(quantity);
    cart.update_quantity(id, quantity)?;
    println!("Quantity of #{id} set to {quantity}");
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns `CliError::Storage` if the cart cannot be saved.
pub fn remove(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let mut cart = ctx.cart();
    if cart.cart().line(id).is_none() {
        println!("Product #{id} is not in your cart");
        return Ok(());
    }

    cart.remove(id)?;
    println!("Removed #{id} from cart");
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `CliError::Storage` if the cart cannot be saved.
pub fn clear(ctx: &Context) -> Result<(), CliError> {
    ctx.cart().clear()?;
    println!("Cart cleared");
    Ok(())
}
