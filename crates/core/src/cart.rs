//! Cart store.
//!
//! A [`Cart`] is an insertion-ordered list of line items with at most one line
//! per product id. [`CartStore`] owns the cart for a process, applies
//! mutations, and writes the full line list to the storage port after every
//! change. On construction it rehydrates from storage; a missing or corrupt
//! entry yields an empty cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, StorageError, keys};
use crate::types::{Product, ProductId, Quantity};

/// A product and how many units of it are in the cart.
///
/// Serialized flat (`{...product, "quantity": n}`), which is also the shape of
/// carts persisted by earlier storefront builds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: Quantity,
}

impl CartLineItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity.get())
    }
}

/// How `add` treats a product that already has a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Add the new quantity to the existing one.
    #[default]
    Accumulate,
    /// Overwrite the existing quantity with the new one.
    Replace,
}

/// The line items of a cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.product.id == id)
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    /// Total number of units (the cart badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    fn add(&mut self, product: Product, quantity: Quantity, policy: MergePolicy) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = match policy {
                MergePolicy::Accumulate => line.quantity.saturating_add(quantity),
                MergePolicy::Replace => quantity,
            };
        } else {
            self.lines.push(CartLineItem { product, quantity });
        }
    }

    fn set_quantity(&mut self, id: ProductId, quantity: Quantity) -> bool {
        let Some(line) = self.lines.iter_mut().find(|line| line.product.id == id) else {
            return false;
        };
        line.quantity = quantity;
        true
    }

    fn remove(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product.id != id);
        self.lines.len() != before
    }
}

/// Process-wide cart backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
    policy: MergePolicy,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Open the cart with the default [`MergePolicy::Accumulate`].
    pub fn open(storage: S) -> Self {
        Self::with_policy(storage, MergePolicy::default())
    }

    /// Open the cart, rehydrating from storage.
    ///
    /// Storage read failures and corrupt data are logged and treated as an
    /// empty cart; they never reach the user.
    pub fn with_policy(storage: S, policy: MergePolicy) -> Self {
        let cart = match storage.get(keys::CART) {
            Ok(Some(raw)) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Discarding unreadable persisted cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart");
                Cart::new()
            }
        };

        Self {
            storage,
            cart,
            policy,
        }
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn policy(&self) -> MergePolicy {
        self.policy
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.cart.subtotal()
    }

    /// Add a product, merging with an existing line per the merge policy.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be persisted. The in-memory
    /// cart keeps the change either way.
    pub fn add(&mut self, product: Product, quantity: Quantity) -> Result<(), StorageError> {
        tracing::debug!(product_id = %product.id, %quantity, policy = ?self.policy, "Adding to cart");
        self.cart.add(product, quantity, self.policy);
        self.persist()
    }

    /// Set the quantity of an existing line. Unknown ids are ignored.
    ///
    /// Callers clamp user input with [`Quantity::clamped`] first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be persisted.
    pub fn update_quantity(&mut self, id: ProductId, quantity: Quantity) -> Result<(), StorageError> {
        if !self.cart.set_quantity(id, quantity) {
            tracing::debug!(product_id = %id, "Quantity update for product not in cart");
        }
        self.persist()
    }

    /// Remove the line for `id`. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be persisted.
    pub fn remove(&mut self, id: ProductId) -> Result<(), StorageError> {
        self.cart.remove(id);
        self.persist()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart = Cart::new();
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.cart)?;
        self.storage.set(keys::CART, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn yarn(id: i32, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Yarn {id}"),
            description: "2/20(s) ring spun".to_owned(),
            price: Decimal::new(cents, 2),
            image: format!("/images/{id}.jpg"),
            category: "Yarn".to_owned(),
            rating: None,
        }
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_add_merges_by_accumulating() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(&store);

        cart.add(yarn(1, 799), qty(2)).unwrap();
        cart.add(yarn(1, 799), qty(3)).unwrap();

        assert_eq!(cart.cart().len(), 1);
        assert_eq!(cart.cart().line(ProductId::new(1)).unwrap().quantity, qty(5));
    }

    #[test]
    fn test_add_merges_by_replacing() {
        let store = MemoryStore::new();
        let mut cart = CartStore::with_policy(&store, MergePolicy::Replace);

        cart.add(yarn(1, 799), qty(2)).unwrap();
        cart.add(yarn(1, 799), qty(3)).unwrap();

        assert_eq!(cart.cart().len(), 1);
        assert_eq!(cart.cart().line(ProductId::new(1)).unwrap().quantity, qty(3));
    }

    #[test]
    fn test_add_appends_in_insertion_order() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(&store);
        cart.add(yarn(2, 999), qty(1)).unwrap();
        cart.add(yarn(1, 799), qty(1)).unwrap();

        let ids: Vec<i32> = cart.cart().lines().iter().map(|l| l.product.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_subtotal() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(&store);
        cart.add(yarn(1, 799), qty(2)).unwrap();
        cart.add(yarn(2, 999), qty(1)).unwrap();

        assert_eq!(cart.subtotal(), Decimal::new(2597, 2));
        assert_eq!(cart.cart().item_count(), 3);
    }

    #[test]
    fn test_update_quantity_sets_directly() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(&store);
        cart.add(yarn(1, 799), qty(4)).unwrap();

        cart.update_quantity(ProductId::new(1), qty(1)).unwrap();
        assert_eq!(cart.cart().line(ProductId::new(1)).unwrap().quantity, qty(1));

        cart.update_quantity(ProductId::new(9), qty(7)).unwrap();
        assert_eq!(cart.cart().len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(&store);
        cart.add(yarn(1, 799), qty(1)).unwrap();

        cart.remove(ProductId::new(42)).unwrap();
        assert_eq!(cart.cart().len(), 1);

        cart.remove(ProductId::new(1)).unwrap();
        assert!(cart.cart().is_empty());
    }

    #[test]
    fn test_every_mutation_is_persisted_and_rehydrated() {
        let store = MemoryStore::new();
        {
            let mut cart = CartStore::open(&store);
            cart.add(yarn(1, 799), qty(2)).unwrap();
            cart.add(yarn(2, 999), qty(1)).unwrap();
            cart.remove(ProductId::new(2)).unwrap();
        }

        let reopened = CartStore::open(&store);
        assert_eq!(reopened.cart().len(), 1);
        assert_eq!(reopened.subtotal(), Decimal::new(1598, 2));
    }

    #[test]
    fn test_persisted_shape_is_flat() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(&store);
        cart.add(yarn(1, 799), qty(2)).unwrap();

        let raw = store.get(keys::CART).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["quantity"], 2);
        assert_eq!(json[0]["name"], "Yarn 1");
    }

    #[test]
    fn test_corrupt_cart_falls_back_to_empty() {
        let store = MemoryStore::new();
        store.set(keys::CART, "{not json").unwrap();
        assert!(CartStore::open(&store).cart().is_empty());

        store.set(keys::CART, r#"[{"id":1,"quantity":0}]"#).unwrap();
        assert!(CartStore::open(&store).cart().is_empty());
    }

    #[test]
    fn test_clear() {
        let store = MemoryStore::new();
        let mut cart = CartStore::open(&store);
        cart.add(yarn(1, 799), qty(2)).unwrap();
        cart.clear().unwrap();

        assert!(CartStore::open(&store).cart().is_empty());
    }
}
