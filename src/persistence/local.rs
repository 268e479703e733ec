//! Demo mode inventory kept as one JSON blob per user in a [KeyValueStore].

use std::sync::{Arc, Mutex};

use crate::{
    Error,
    auth::{Email, User},
    category::{Category, CategoryName},
    entity_id::{generate_id, now_millis},
    item::{Item, ItemDraft},
    persistence::{Inventory, InventoryListener, InventoryStore},
    storage::{KeyValueStore, Subscription, WatcherRegistry},
};

/// The key of the inventory blob of the user with `email`.
pub fn inventory_key(email: &Email) -> String {
    format!("makeup_inventory_{email}")
}

/// An [InventoryStore] that keeps each user's inventory under [inventory_key].
///
/// Every change rewrites the whole blob.
pub struct LocalInventory {
    key_values: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
    watchers: WatcherRegistry<String, Inventory>,
}

impl LocalInventory {
    /// Create an inventory store on top of `key_values`.
    pub fn new(key_values: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key_values,
            write_lock: Mutex::new(()),
            watchers: WatcherRegistry::new(),
        }
    }

    fn read(&self, key: &str) -> Result<Inventory, Error> {
        let Some(text) = self.key_values.get(key)? else {
            return Ok(Inventory::default());
        };

        match serde_json::from_str(&text) {
            Ok(inventory) => Ok(inventory),
            Err(error) => {
                tracing::warn!("could not parse stored inventory {key}, starting empty: {error}");
                Ok(Inventory::default())
            }
        }
    }

    /// Read, change and write back the inventory of `user`.
    ///
    /// Writes are serialized so concurrent changes are not lost. Watchers are
    /// notified after the write lock is released.
    fn mutate<R>(
        &self,
        user: &User,
        change: impl FnOnce(&mut Inventory) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let key = inventory_key(&user.email);

        let (result, inventory) = {
            let _guard = self
                .write_lock
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire inventory lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            let mut inventory = self.read(&key)?;
            let result = change(&mut inventory)?;
            self.key_values
                .set(&key, &serde_json::to_string(&inventory)?)?;

            (result, inventory)
        };

        self.watchers.notify(&key, &inventory);

        Ok(result)
    }
}

impl InventoryStore for LocalInventory {
    fn load(&self, user: &User) -> Result<Inventory, Error> {
        self.read(&inventory_key(&user.email))
    }

    fn save_category(
        &self,
        user: &User,
        existing: Option<&Category>,
        name: CategoryName,
    ) -> Result<Category, Error> {
        let category = Category {
            id: existing
                .map(|category| category.id.clone())
                .unwrap_or_else(generate_id),
            name,
        };

        self.mutate(user, |inventory| {
            match inventory
                .categories
                .iter_mut()
                .find(|stored| stored.id == category.id)
            {
                Some(stored) => *stored = category.clone(),
                None => inventory.categories.push(category.clone()),
            }

            Ok(category)
        })
    }

    fn delete_category(&self, user: &User, id: &str) -> Result<(), Error> {
        self.mutate(user, |inventory| {
            if inventory.category(id).is_none() {
                return Err(Error::DeleteMissingCategory);
            }

            inventory.categories.retain(|category| category.id != id);
            inventory.items.retain(|item| item.category_id != id);

            Ok(())
        })
    }

    fn save_item(
        &self,
        user: &User,
        existing: Option<&Item>,
        category_id: &str,
        draft: ItemDraft,
    ) -> Result<Item, Error> {
        let item = Item::assemble(existing, category_id, draft, now_millis());

        self.mutate(user, |inventory| {
            if inventory.category(category_id).is_none() {
                return Err(Error::CategoryNotFound);
            }

            match inventory.items.iter_mut().find(|stored| stored.id == item.id) {
                Some(stored) => *stored = item.clone(),
                None => inventory.items.push(item.clone()),
            }

            Ok(item)
        })
    }

    fn delete_item(&self, user: &User, id: &str) -> Result<(), Error> {
        self.mutate(user, |inventory| {
            let count = inventory.items.len();
            inventory.items.retain(|item| item.id != id);

            if inventory.items.len() == count {
                Err(Error::DeleteMissingItem)
            } else {
                Ok(())
            }
        })
    }

    fn subscribe(&self, user: &User, listener: InventoryListener) -> Result<Subscription, Error> {
        let key = inventory_key(&user.email);
        let current = self.read(&key)?;
        let subscription = self.watchers.register(key, listener.clone());

        listener(&current);

        Ok(subscription)
    }

    fn prune_orphans(&self, user: &User) -> Result<usize, Error> {
        self.mutate(user, |inventory| {
            let count = inventory.items.len();
            let categories = inventory.categories.clone();
            inventory
                .items
                .retain(|item| categories.iter().any(|category| category.id == item.category_id));

            Ok(count - inventory.items.len())
        })
    }
}
