//! Cart state: line items, derived summary, and the store that owns them.
//!
//! The cart is an explicit store object injected where it is needed - there
//! is no ambient singleton. Mutations are synchronous over in-memory state
//! and asynchronously mirrored to local persistence; reads never block on
//! persistence, and persistence failures never surface to the caller.

mod persistence;
mod store;

pub use persistence::{CartPersistence, FileCartPersistence, MemoryCartPersistence, PersistenceError};
pub use store::CartStore;

use serde::{Deserialize, Serialize};
use zentra_core::{Money, ProductId};

/// A purchasable product as seen by the cart.
///
/// Only the fields the cart snapshots; catalog browsing lives elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Current listed price; the cart captures it at add-time.
    pub price: Money,
}

/// One product+quantity entry within the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    /// Always >= 1; an update that would reach 0 removes the line instead.
    pub quantity: u32,
    /// Unit price captured when the product was added - never re-fetched.
    pub unit_price: Money,
}

impl CartLine {
    /// Derived line total: `quantity * unit_price`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Derived cart summary - recomputed on every read, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartSummary {
    pub total_quantity: u32,
    pub total_value: Money,
}

impl CartSummary {
    /// Compute a summary over a set of lines.
    #[must_use]
    pub fn compute(lines: &[CartLine]) -> Self {
        Self {
            total_quantity: lines.iter().map(|line| line.quantity).sum(),
            total_value: lines.iter().map(CartLine::line_total).sum(),
        }
    }

    /// Whether the cart has no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_quantity == 0
    }
}
