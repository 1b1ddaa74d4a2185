//! The cart store.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::warn;
use zentra_core::ProductId;

use super::{CartLine, CartPersistence, CartSummary, Product};

/// Process-wide cart store.
///
/// Cheaply cloneable; all clones share the same state. Mutations are
/// synchronous and serialized by an internal lock; each one recomputes the
/// summary visible to [`CartStore::subscribe`] observers (e.g., the badge
/// counter) and mirrors the new line set to persistence in the background.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    lines: Mutex<Vec<CartLine>>,
    summary_tx: watch::Sender<CartSummary>,
    persistence: Option<Arc<dyn CartPersistence>>,
}

impl CartStore {
    /// Create an empty in-memory cart with no persistence mirror.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::build(Vec::new(), None)
    }

    /// Create an empty cart mirrored to the given persistence.
    ///
    /// Mutations must then happen inside a Tokio runtime, since the mirror
    /// write is spawned as a background task.
    #[must_use]
    pub fn with_persistence(persistence: Arc<dyn CartPersistence>) -> Self {
        Self::build(Vec::new(), Some(persistence))
    }

    /// Create a cart restored from persistence.
    ///
    /// A load failure starts an empty cart; the stored blob is replaced on
    /// the next mutation.
    pub async fn restore(persistence: Arc<dyn CartPersistence>) -> Self {
        let lines = match persistence.load().await {
            Ok(Some(lines)) => lines,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to restore cart from persistence, starting empty");
                Vec::new()
            }
        };
        Self::build(lines, Some(persistence))
    }

    fn build(lines: Vec<CartLine>, persistence: Option<Arc<dyn CartPersistence>>) -> Self {
        let (summary_tx, _) = watch::channel(CartSummary::compute(&lines));
        Self {
            inner: Arc::new(CartStoreInner {
                lines: Mutex::new(lines),
                summary_tx,
                persistence,
            }),
        }
    }

    /// Add a product to the cart.
    ///
    /// If the product is already present, its quantity is increased;
    /// otherwise a new line is inserted with the product's current price
    /// captured as the unit price.
    pub fn add_item(&self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        self.mutate(|lines| {
            if let Some(line) = lines.iter_mut().find(|l| l.product_id == product.id) {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                lines.push(CartLine {
                    product_id: product.id,
                    name: product.name.clone(),
                    quantity,
                    unit_price: product.price,
                });
            }
        });
    }

    /// Set a line's quantity; a new quantity of zero or below removes the
    /// line entirely.
    pub fn update_quantity(&self, product_id: ProductId, new_quantity: i32) {
        self.mutate(|lines| {
            if new_quantity <= 0 {
                lines.retain(|l| l.product_id != product_id);
            } else if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
                #[allow(clippy::cast_sign_loss)] // new_quantity > 0 checked above
                {
                    line.quantity = new_quantity as u32;
                }
            }
        });
    }

    /// Remove a line from the cart.
    pub fn remove_item(&self, product_id: ProductId) {
        self.mutate(|lines| lines.retain(|l| l.product_id != product_id));
    }

    /// Remove every line (e.g., after successful checkout).
    pub fn clear(&self) {
        self.mutate(Vec::clear);
    }

    /// Snapshot of the current lines.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().clone()
    }

    /// Current summary, recomputed from the lines on every call.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::compute(&self.lock())
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Subscribe to summary changes (badge counters and the like).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.inner.summary_tx.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartLine>> {
        self.inner
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a mutation, publish the recomputed summary, and mirror to
    /// persistence. The mirror write is fire-and-forget: an error is
    /// logged and swallowed, and in-memory state stays authoritative.
    fn mutate(&self, f: impl FnOnce(&mut Vec<CartLine>)) {
        let snapshot = {
            let mut lines = self.lock();
            f(&mut lines);
            lines.clone()
        };

        self.inner
            .summary_tx
            .send_replace(CartSummary::compute(&snapshot));

        if let Some(persistence) = &self.inner.persistence {
            let persistence = Arc::clone(persistence);
            tokio::spawn(async move {
                if let Err(e) = persistence.save(&snapshot).await {
                    warn!(error = %e, "Failed to mirror cart to local persistence");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{MemoryCartPersistence, PersistenceError};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use zentra_core::Money;

    fn product(price: Money) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Vitamina C 1g".to_string(),
            price,
        }
    }

    #[test]
    fn add_item_merges_existing_lines() {
        let store = CartStore::in_memory();
        let p = product(Money::new(dec!(19.90)));

        store.add_item(&p, 1);
        store.add_item(&p, 2);

        let lines = store.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].line_total(), Money::new(dec!(59.70)));
    }

    #[test]
    fn captured_price_survives_product_price_change() {
        let store = CartStore::in_memory();
        let mut p = product(Money::new(dec!(10.00)));

        store.add_item(&p, 1);
        p.price = Money::new(dec!(99.00));
        store.add_item(&p, 1);

        // Quantity merged on the existing line: the add-time price holds
        let lines = store.lines();
        assert_eq!(lines[0].unit_price, Money::new(dec!(10.00)));
        assert_eq!(store.summary().total_value, Money::new(dec!(20.00)));
    }

    #[test]
    fn update_quantity_zero_or_negative_removes_line() {
        let store = CartStore::in_memory();
        let a = product(Money::new(dec!(5.00)));
        let b = product(Money::new(dec!(7.00)));

        store.add_item(&a, 4);
        store.add_item(&b, 1);

        store.update_quantity(a.id, 0);
        assert_eq!(store.lines().len(), 1);

        store.update_quantity(b.id, -1);
        assert!(store.is_empty());
    }

    #[test]
    fn update_quantity_recomputes_line_total() {
        let store = CartStore::in_memory();
        let p = product(Money::new(dec!(2.50)));

        store.add_item(&p, 1);
        store.update_quantity(p.id, 6);

        let lines = store.lines();
        assert_eq!(lines[0].quantity, 6);
        assert_eq!(lines[0].line_total(), Money::new(dec!(15.00)));
    }

    #[test]
    fn summary_invariant_holds_across_mutations() {
        let store = CartStore::in_memory();
        let a = product(Money::new(dec!(19.90)));
        let b = product(Money::new(dec!(3.15)));

        store.add_item(&a, 2);
        store.add_item(&b, 5);
        store.update_quantity(b.id, 3);
        store.remove_item(a.id);
        store.add_item(&a, 1);

        let lines = store.lines();
        let expected_quantity: u32 = lines.iter().map(|l| l.quantity).sum();
        let expected_value: Money = lines.iter().map(CartLine::line_total).sum();

        let summary = store.summary();
        assert_eq!(summary.total_quantity, expected_quantity);
        assert_eq!(summary.total_value, expected_value);
    }

    #[test]
    fn observers_see_every_mutation() {
        let store = CartStore::in_memory();
        let rx = store.subscribe();
        let p = product(Money::new(dec!(1.00)));

        store.add_item(&p, 2);
        assert_eq!(rx.borrow().total_quantity, 2);

        store.clear();
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test]
    async fn mutations_mirror_to_persistence() {
        let persistence = Arc::new(MemoryCartPersistence::new());
        let store = CartStore::with_persistence(persistence.clone());
        let p = product(Money::new(dec!(12.00)));

        store.add_item(&p, 1);

        // Mirror writes are spawned; yield until the blob lands
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let saved = persistence.load().await.unwrap().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].quantity, 1);
    }

    #[tokio::test]
    async fn restore_round_trips_through_persistence() {
        let persistence = Arc::new(MemoryCartPersistence::new());
        {
            let store = CartStore::with_persistence(persistence.clone());
            store.add_item(&product(Money::new(dec!(8.80))), 3);
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
        }

        let restored = CartStore::restore(persistence).await;
        assert_eq!(restored.summary().total_quantity, 3);
    }

    struct FailingPersistence;

    #[async_trait]
    impl CartPersistence for FailingPersistence {
        async fn save(&self, _lines: &[CartLine]) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }

        async fn load(&self) -> Result<Option<Vec<CartLine>>, PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }
    }

    #[tokio::test]
    async fn persistence_failures_are_swallowed() {
        let store = CartStore::with_persistence(Arc::new(FailingPersistence));
        let p = product(Money::new(dec!(4.00)));

        store.add_item(&p, 2);
        tokio::task::yield_now().await;

        // In-memory state stays authoritative despite the failed mirror
        assert_eq!(store.summary().total_quantity, 2);
    }

    #[tokio::test]
    async fn restore_failure_starts_empty() {
        let store = CartStore::restore(Arc::new(FailingPersistence)).await;
        assert!(store.is_empty());
    }
}
