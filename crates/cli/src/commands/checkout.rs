//! Checkout command: drives the wizard from the cart to confirmation.

use yarnshop_core::cart::Cart;
use yarnshop_core::checkout::{
    CheckoutStep, CheckoutWizard, DeliveryMethod, PaymentDetails, ShippingInfo, StepStatus,
    WizardError,
};
use yarnshop_core::display_price;

use crate::commands::Context;
use crate::commands::cart::print_cart;
use crate::error::CliError;

/// Checkout form input.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub shipping: ShippingInfo,
    pub delivery: DeliveryMethod,
    pub payment: PaymentDetails,
}

/// Step indicator line, e.g. `[x] Cart  [>] Shipping  [ ] Delivery ...`.
fn step_indicator(wizard: &CheckoutWizard) -> String {
    CheckoutStep::ALL
        .iter()
        .map(|&step| {
            let mark = match wizard.step_status(step) {
                StepStatus::Complete => "[x]",
                StepStatus::Current => "[>]",
                StepStatus::Upcoming => "[ ]",
            };
            format!("{mark} {}", step.title())
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn print_step(wizard: &CheckoutWizard, cart: &Cart) {
    println!();
    println!("{}  ({}%)", step_indicator(wizard), wizard.progress_percent());

    match wizard.step() {
        CheckoutStep::Cart => print_cart(cart),
        CheckoutStep::Shipping => println!("Shipping Information"),
        CheckoutStep::Delivery => {
            let shipping = wizard.shipping();
            println!("Delivering to {}, {}", shipping.full_name, shipping.address_line1);
            println!("{} {}", shipping.city, shipping.postal_code);
        }
        CheckoutStep::Payment => {
            if let Some(method) = wizard.delivery() {
                println!("Delivery: {method}");
            }
            println!("Total: {}", display_price(wizard.order_total(cart)));
        }
        CheckoutStep::Confirmation => {
            println!("Order Confirmation");
            println!("Your order has been successfully placed!");
            println!("Thank you for shopping with us.");
        }
    }
}

/// Run the whole checkout with `form`, printing every step.
///
/// Stops at the first refused step. Missing shipping fields are listed
/// before the error is returned. The cart is left untouched.
///
/// # Errors
///
/// Returns `CliError::Checkout` when a step is refused.
pub fn run(ctx: &Context, form: CheckoutForm) -> Result<(), CliError> {
    let store = ctx.cart();
    let cart = store.cart();
    let mut wizard = CheckoutWizard::new();
    print_step(&wizard, cart);

    wizard.begin_checkout(cart)?;
    print_step(&wizard, cart);

    if let Err(err) = wizard.submit_shipping(form.shipping) {
        if let WizardError::InvalidShipping { missing } = &err {
            for field in missing {
                println!("  - {field} is required");
            }
        }
        return Err(err.into());
    }
    print_step(&wizard, cart);

    wizard.select_delivery(form.delivery)?;
    wizard.continue_to_payment()?;
    print_step(&wizard, cart);

    wizard.submit_payment(&form.payment)?;
    print_step(&wizard, cart);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use yarnshop_core::cart::CartStore;
    use yarnshop_core::storage::MemoryStore;
    use yarnshop_core::{Product, ProductId, Quantity};

    use super::*;

    #[test]
    fn test_step_indicator_tracks_progress() {
        let mut cart = CartStore::open(MemoryStore::new());
        cart.add(
            Product {
                id: ProductId::new(1),
                name: "Cotton".to_owned(),
                description: String::new(),
                price: Decimal::new(799, 2),
                image: String::new(),
                category: "Cotton".to_owned(),
                rating: None,
            },
            Quantity::ONE,
        )
        .unwrap();

        let mut wizard = CheckoutWizard::new();
        assert!(step_indicator(&wizard).starts_with("[>] Cart  [ ] Shipping"));

        wizard.begin_checkout(cart.cart()).unwrap();
        assert!(step_indicator(&wizard).starts_with("[x] Cart  [>] Shipping"));
    }
}
