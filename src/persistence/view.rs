//! Keeping a copy of an inventory up to date from store notifications.

use std::sync::{Arc, Mutex};

use crate::{
    Error,
    auth::User,
    persistence::{Inventory, InventoryStore},
    storage::Subscription,
};

/// How a new snapshot is combined with the inventory already held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The snapshot replaces everything.
    Replace,
    /// Records in the snapshot are inserted or updated by ID. Records
    /// missing from the snapshot are kept.
    Merge,
}

/// An inventory updated by applying snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryView {
    strategy: MergeStrategy,
    state: Inventory,
}

impl InventoryView {
    /// Create an empty view.
    pub fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            state: Inventory::default(),
        }
    }

    /// Combine `snapshot` with the current state.
    pub fn apply(&mut self, snapshot: &Inventory) {
        match self.strategy {
            MergeStrategy::Replace => self.state = snapshot.clone(),
            MergeStrategy::Merge => {
                for category in &snapshot.categories {
                    match self
                        .state
                        .categories
                        .iter_mut()
                        .find(|held| held.id == category.id)
                    {
                        Some(held) => *held = category.clone(),
                        None => self.state.categories.push(category.clone()),
                    }
                }

                for item in &snapshot.items {
                    match self.state.items.iter_mut().find(|held| held.id == item.id) {
                        Some(held) => *held = item.clone(),
                        None => self.state.items.push(item.clone()),
                    }
                }
            }
        }
    }

    /// The current state.
    pub fn inventory(&self) -> &Inventory {
        &self.state
    }
}

/// An [InventoryView] kept current by a subscription to a store.
///
/// Dropping it cancels the subscription.
#[derive(Debug)]
pub struct LiveInventory {
    view: Arc<Mutex<InventoryView>>,
    _subscription: Subscription,
}

impl LiveInventory {
    /// Subscribe to the inventory of `user` in `store`.
    pub fn start(
        store: &dyn InventoryStore,
        user: &User,
        strategy: MergeStrategy,
    ) -> Result<Self, Error> {
        let view = Arc::new(Mutex::new(InventoryView::new(strategy)));
        let sink = view.clone();

        let subscription = store.subscribe(
            user,
            Arc::new(move |snapshot: &Inventory| match sink.lock() {
                Ok(mut view) => view.apply(snapshot),
                Err(error) => tracing::error!("could not acquire inventory view lock: {error}"),
            }),
        )?;

        Ok(Self {
            view,
            _subscription: subscription,
        })
    }

    /// A copy of the current inventory.
    pub fn snapshot(&self) -> Result<Inventory, Error> {
        self.view
            .lock()
            .map(|view| view.inventory().clone())
            .inspect_err(|error| tracing::error!("could not acquire inventory view lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}
