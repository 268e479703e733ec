//! Inventory kept as documents under `users/{uid}/categories` and `users/{uid}/items`.

use std::sync::{Arc, Mutex};

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    Error,
    auth::{User, UserId},
    category::{Category, CategoryName},
    entity_id::{generate_id, now_millis},
    item::{Item, ItemDraft},
    persistence::{Inventory, InventoryListener, InventoryStore},
    storage::{DocumentStore, StoredDocument, Subscription, WriteBatch},
};

/// The collection that holds the categories of `uid`.
pub fn categories_collection(uid: &UserId) -> String {
    format!("users/{uid}/categories")
}

/// The collection that holds the items of `uid`.
pub fn items_collection(uid: &UserId) -> String {
    format!("users/{uid}/items")
}

/// An [InventoryStore] that keeps one document per category and item.
pub struct RemoteInventory {
    documents: Arc<dyn DocumentStore>,
}

impl RemoteInventory {
    /// Create an inventory store on top of `documents`.
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, Error> {
        Ok(parse_documents(collection, &self.documents.list(collection)?))
    }
}

fn parse_documents<T: DeserializeOwned>(collection: &str, documents: &[StoredDocument]) -> Vec<T> {
    documents
        .iter()
        .filter_map(
            |document| match serde_json::from_value(document.data.clone()) {
                Ok(value) => Some(value),
                Err(error) => {
                    tracing::warn!(
                        "skipping malformed document {collection}/{}: {error}",
                        document.id
                    );
                    None
                }
            },
        )
        .collect()
}

fn to_document(value: &impl Serialize) -> Result<Value, Error> {
    Ok(serde_json::to_value(value)?)
}

#[derive(Default)]
struct PendingSnapshot {
    categories: Option<Vec<Category>>,
    items: Option<Vec<Item>>,
}

impl PendingSnapshot {
    fn inventory(&self) -> Option<Inventory> {
        Some(Inventory {
            categories: self.categories.clone()?,
            items: self.items.clone()?,
        })
    }
}

impl InventoryStore for RemoteInventory {
    fn load(&self, user: &User) -> Result<Inventory, Error> {
        Ok(Inventory {
            categories: self.list(&categories_collection(&user.uid))?,
            items: self.list(&items_collection(&user.uid))?,
        })
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

        self.documents.set(
            &categories_collection(&user.uid),
            &category.id,
            &to_document(&category)?,
        )?;

        Ok(category)
    }

    fn delete_category(&self, user: &User, id: &str) -> Result<(), Error> {
        let categories = categories_collection(&user.uid);
        let items = items_collection(&user.uid);

        if self.documents.get(&categories, id)?.is_none() {
            return Err(Error::DeleteMissingCategory);
        }

        let mut batch = WriteBatch::new();
        batch.delete(&categories, id);

        for item in self.list::<Item>(&items)? {
            if item.category_id == id {
                batch.delete(&items, &item.id);
            }
        }

        self.documents.commit(batch)
    }

    fn save_item(
        &self,
        user: &User,
        existing: Option<&Item>,
        category_id: &str,
        draft: ItemDraft,
    ) -> Result<Item, Error> {
        if self
            .documents
            .get(&categories_collection(&user.uid), category_id)?
            .is_none()
        {
            return Err(Error::CategoryNotFound);
        }

        let item = Item::assemble(existing, category_id, draft, now_millis());
        self.documents
            .set(&items_collection(&user.uid), &item.id, &to_document(&item)?)?;

        Ok(item)
    }

    fn delete_item(&self, user: &User, id: &str) -> Result<(), Error> {
        if self.documents.delete(&items_collection(&user.uid), id)? {
            Ok(())
        } else {
            Err(Error::DeleteMissingItem)
        }
    }

    fn subscribe(&self, user: &User, listener: InventoryListener) -> Result<Subscription, Error> {
        let pending = Arc::new(Mutex::new(PendingSnapshot::default()));

        let emit = {
            let pending = pending.clone();
            move |update: &dyn Fn(&mut PendingSnapshot)| {
                let inventory = match pending.lock() {
                    Ok(mut pending) => {
                        update(&mut pending);
                        pending.inventory()
                    }
                    Err(error) => {
                        tracing::error!("could not acquire snapshot lock: {error}");
                        None
                    }
                };

                if let Some(inventory) = inventory {
                    listener(&inventory);
                }
            }
        };
        let emit = Arc::new(emit);

        let categories = categories_collection(&user.uid);
        let categories_subscription = {
            let emit = emit.clone();
            let collection = categories.clone();
            self.documents.watch(
                &categories,
                Arc::new(move |documents: &[StoredDocument]| {
                    let categories = parse_documents(&collection, documents);
                    emit(&|pending: &mut PendingSnapshot| pending.categories = Some(categories.clone()));
                }),
            )?
        };

        let items = items_collection(&user.uid);
        let items_subscription = {
            let collection = items.clone();
            self.documents.watch(
                &items,
                Arc::new(move |documents: &[StoredDocument]| {
                    let items = parse_documents(&collection, documents);
                    emit(&|pending: &mut PendingSnapshot| pending.items = Some(items.clone()));
                }),
            )?
        };

        Ok(Subscription::combine(vec![
            categories_subscription,
            items_subscription,
        ]))
    }

    fn prune_orphans(&self, user: &User) -> Result<usize, Error> {
        let inventory = self.load(user)?;
        let items = items_collection(&user.uid);

        let mut batch = WriteBatch::new();
        for orphan in inventory.orphans() {
            batch.delete(&items, &orphan.id);
        }

        let pruned = batch.len();
        if pruned > 0 {
            tracing::info!("removing {pruned} items without a category for {}", user.uid);
            self.documents.commit(batch)?;
        }

        Ok(pruned)
    }
}
