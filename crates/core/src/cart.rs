//! Visitor cart.
//!
//! A cart is an ordered list of line items plus the next local identifier to
//! hand out. Every user action is expressed as a [`CartCommand`] and applied
//! through [`CartState::apply`], so the transition logic stays independent of
//! any rendering layer.
//!
//! # Invariants
//!
//! - Line identifiers are unique among current lines.
//! - `next_id` is strictly greater than every identifier ever assigned, so
//!   identifiers are never reused after removal.
//! - Insertion order is display order.
//! - Adding the same product twice produces two lines; lines are never merged.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{LineId, Price, ProductId, Quantity};

/// One row of the cart: a product snapshot taken at the time it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Session-local identifier of this line.
    pub id: LineId,
    /// Snapshot of the product when it was added.
    pub product: Product,
    /// Quantity on this line.
    pub quantity: Quantity,
}

impl CartLineItem {
    /// Upstream identifier of the product on this line.
    #[must_use]
    pub const fn pid(&self) -> &ProductId {
        &self.product.pid
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// A user action against the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    /// Append a new line for this product.
    Add(Product),
    /// Delete the line with this identifier.
    Remove(LineId),
    /// Replace the quantity of the line with this identifier.
    UpdateQuantity(LineId, Quantity),
}

/// What applying a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent {
    /// A line was appended with this identifier.
    Added(LineId),
    /// The line was removed.
    Removed(LineId),
    /// The line's quantity was replaced.
    QuantityUpdated(LineId),
    /// The command targeted a line that does not exist; nothing changed.
    Unchanged,
}

/// The cart held for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartLineItem>,
    next_id: LineId,
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: LineId::default(),
        }
    }

    /// Apply a command and report what happened.
    pub fn apply(&mut self, command: CartCommand) -> CartEvent {
        match command {
            CartCommand::Add(product) => CartEvent::Added(self.add(product)),
            CartCommand::Remove(id) => {
                if self.remove(id) {
                    CartEvent::Removed(id)
                } else {
                    CartEvent::Unchanged
                }
            }
            CartCommand::UpdateQuantity(id, quantity) => {
                if self.update_quantity(id, quantity) {
                    CartEvent::QuantityUpdated(id)
                } else {
                    CartEvent::Unchanged
                }
            }
        }
    }

    /// Append a new line for `product` and return its identifier.
    ///
    /// The line's quantity is seeded from the product record, clamped into
    /// the valid range.
    pub fn add(&mut self, product: Product) -> LineId {
        let id = self.next_id;
        self.next_id = id.next();

        let quantity = Quantity::clamped(product.quantity);
        self.items.push(CartLineItem {
            id,
            product,
            quantity,
        });
        id
    }

    /// Remove the line with identifier `id`.
    ///
    /// Returns `false`, leaving the cart untouched, if no such line exists.
    pub fn remove(&mut self, id: LineId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Replace the quantity of the line with identifier `id`.
    ///
    /// Returns `false`, leaving the cart untouched, if no such line exists.
    pub fn update_quantity(&mut self, id: LineId, quantity: Quantity) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Sum of `price * quantity` over all lines, unrounded.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartLineItem::subtotal).sum()
    }

    /// Lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up a line by identifier.
    #[must_use]
    pub fn get(&self, id: LineId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Identifier the next added line will receive.
    #[must_use]
    pub const fn next_id(&self) -> LineId {
        self.next_id
    }

    /// Number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
