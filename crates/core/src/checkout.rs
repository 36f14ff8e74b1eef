//! Checkout wizard.
//!
//! A linear state machine over [`CheckoutStep`]. Every transition returns the
//! new step or a [`WizardError`]; a failed transition leaves the wizard where
//! it was. The wizard reads the cart to gate entry and to show the order
//! total, but never mutates it.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// Steps of the checkout flow, in order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    #[default]
    Cart,
    Shipping,
    Delivery,
    Payment,
    Confirmation,
}

impl CheckoutStep {
    /// All steps in flow order.
    pub const ALL: [Self; 5] = [
        Self::Cart,
        Self::Shipping,
        Self::Delivery,
        Self::Payment,
        Self::Confirmation,
    ];

    /// Zero-based position in the flow.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Cart => 0,
            Self::Shipping => 1,
            Self::Delivery => 2,
            Self::Payment => 3,
            Self::Confirmation => 4,
        }
    }

    /// Label shown in the step indicator.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Cart => "Cart",
            Self::Shipping => "Shipping Info",
            Self::Delivery => "Delivery Info",
            Self::Payment => "Payment",
            Self::Confirmation => "Confirmation",
        }
    }

    /// The step `back()` returns to, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Shipping => Some(Self::Cart),
            Self::Delivery => Some(Self::Shipping),
            Self::Payment => Some(Self::Delivery),
            Self::Cart | Self::Confirmation => None,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Fields of the shipping form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingField {
    FullName,
    AddressLine1,
    City,
    PostalCode,
}

impl ShippingField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::AddressLine1 => "Address Line 1",
            Self::City => "City",
            Self::PostalCode => "Postal Code",
        }
    }
}

impl fmt::Display for ShippingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shipping address entered during checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub full_name: String,
    pub address_line1: String,
    pub city: String,
    pub postal_code: String,
}

impl ShippingInfo {
    /// Fields that are empty or whitespace only, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<ShippingField> {
        [
            (ShippingField::FullName, &self.full_name),
            (ShippingField::AddressLine1, &self.address_line1),
            (ShippingField::City, &self.city),
            (ShippingField::PostalCode, &self.postal_code),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Delivery speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Standard,
    Express,
}

impl DeliveryMethod {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Delivery (3-5 days)",
            Self::Express => "Express Delivery (1-2 days)",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned for an unrecognised delivery method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown delivery method {0:?} (expected standard or express)")]
pub struct UnknownDeliveryMethod(pub String);

impl FromStr for DeliveryMethod {
    type Err = UnknownDeliveryMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            _ => Err(UnknownDeliveryMethod(s.to_owned())),
        }
    }
}

/// Card details from the payment form.
///
/// Payment is simulated; the values are accepted as entered and never
/// validated, stored, or logged.
#[derive(Clone, Default)]
pub struct PaymentDetails {
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("card_number", &"[REDACTED]")
            .field("expiry", &"[REDACTED]")
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// How a step relates to the current one, for the step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Complete,
    Current,
    Upcoming,
}

/// Wizard inputs, named in [`WizardError::InvalidTransition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardAction {
    BeginCheckout,
    SubmitShipping,
    SelectDelivery,
    ContinueToPayment,
    SubmitPayment,
    Back,
}

impl fmt::Display for WizardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BeginCheckout => "begin checkout",
            Self::SubmitShipping => "submit shipping",
            Self::SelectDelivery => "select delivery",
            Self::ContinueToPayment => "continue to payment",
            Self::SubmitPayment => "submit payment",
            Self::Back => "go back",
        })
    }
}

/// Errors that can occur when driving the wizard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// Checkout cannot start from an empty cart.
    #[error("your cart is empty")]
    EmptyCart,

    /// Required shipping fields are blank.
    #[error("Please fill in all fields.")]
    InvalidShipping { missing: Vec<ShippingField> },

    /// No delivery method has been chosen.
    #[error("please select a delivery method")]
    NoDeliveryMethod,

    /// The action is not available in the current step.
    #[error("cannot {action} from the {step} step")]
    InvalidTransition {
        step: CheckoutStep,
        action: WizardAction,
    },
}

/// Ephemeral checkout state. A new wizard always starts at the cart step.
#[derive(Debug, Clone, Default)]
pub struct CheckoutWizard {
    step: CheckoutStep,
    shipping: ShippingInfo,
    delivery: Option<DeliveryMethod>,
}

impl CheckoutWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The shipping info as last submitted.
    #[must_use]
    pub const fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    #[must_use]
    pub const fn delivery(&self) -> Option<DeliveryMethod> {
        self.delivery
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.step == CheckoutStep::Confirmation
    }

    /// Progress bar fill: cart is 20, confirmation is 100.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation)] // at most 100
        let percent = ((self.step.index() + 1) * 100 / CheckoutStep::ALL.len()) as u8;
        percent
    }

    #[must_use]
    pub fn step_status(&self, step: CheckoutStep) -> StepStatus {
        match step.cmp(&self.step) {
            std::cmp::Ordering::Less => StepStatus::Complete,
            std::cmp::Ordering::Equal => StepStatus::Current,
            std::cmp::Ordering::Greater => StepStatus::Upcoming,
        }
    }

    /// The amount due: the cart subtotal.
    #[must_use]
    pub fn order_total(&self, cart: &Cart) -> Decimal {
        cart.subtotal()
    }

    /// Leave the cart step.
    ///
    /// # Errors
    ///
    /// `EmptyCart` if the cart has no lines, `InvalidTransition` outside the
    /// cart step.
    pub fn begin_checkout(&mut self, cart: &Cart) -> Result<CheckoutStep, WizardError> {
        self.expect_step(CheckoutStep::Cart, WizardAction::BeginCheckout)?;
        if cart.is_empty() {
            return Err(WizardError::EmptyCart);
        }
        Ok(self.advance(CheckoutStep::Shipping))
    }

    /// Submit the shipping form.
    ///
    /// Every field must contain a non-whitespace character; a field holding
    /// only spaces counts as missing. The info is kept even when rejected, so
    /// the form can be corrected.
    ///
    /// # Errors
    ///
    /// `InvalidShipping` naming the blank fields, `InvalidTransition` outside
    /// the shipping step.
    pub fn submit_shipping(&mut self, info: ShippingInfo) -> Result<CheckoutStep, WizardError> {
        self.expect_step(CheckoutStep::Shipping, WizardAction::SubmitShipping)?;
        let missing = info.missing_fields();
        self.shipping = info;
        if !missing.is_empty() {
            tracing::debug!(?missing, "Shipping info rejected");
            return Err(WizardError::InvalidShipping { missing });
        }
        Ok(self.advance(CheckoutStep::Delivery))
    }

    /// Choose a delivery method. Stays on the delivery step.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside the delivery step.
    pub fn select_delivery(&mut self, method: DeliveryMethod) -> Result<CheckoutStep, WizardError> {
        self.expect_step(CheckoutStep::Delivery, WizardAction::SelectDelivery)?;
        self.delivery = Some(method);
        Ok(self.step)
    }

    /// Move from delivery to payment.
    ///
    /// # Errors
    ///
    /// `NoDeliveryMethod` if none was selected, `InvalidTransition` outside
    /// the delivery step.
    pub fn continue_to_payment(&mut self) -> Result<CheckoutStep, WizardError> {
        self.expect_step(CheckoutStep::Delivery, WizardAction::ContinueToPayment)?;
        if self.delivery.is_none() {
            return Err(WizardError::NoDeliveryMethod);
        }
        Ok(self.advance(CheckoutStep::Payment))
    }

    /// Place the order. Payment is a simulation and always succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` outside the payment step.
    pub fn submit_payment(&mut self, _details: &PaymentDetails) -> Result<CheckoutStep, WizardError> {
        self.expect_step(CheckoutStep::Payment, WizardAction::SubmitPayment)?;
        Ok(self.advance(CheckoutStep::Confirmation))
    }

    /// Return to the previous step. Entered data is kept.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` from the cart or confirmation steps.
    pub fn back(&mut self) -> Result<CheckoutStep, WizardError> {
        let previous = self.step.previous().ok_or(WizardError::InvalidTransition {
            step: self.step,
            action: WizardAction::Back,
        })?;
        Ok(self.advance(previous))
    }

    fn expect_step(&self, step: CheckoutStep, action: WizardAction) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                step: self.step,
                action,
            })
        }
    }

    fn advance(&mut self, to: CheckoutStep) -> CheckoutStep {
        tracing::debug!(from = %self.step, %to, "Checkout step changed");
        self.step = to;
        to
    }
}
