//! One CRUD surface for a user's inventory, stored either locally or in the
//! document database.
//!
//! The storage mode is resolved once at startup by [connect]. Request
//! handlers only see an [InventoryStore] and never check the mode.

mod local;
mod remote;
mod view;

use std::{
    fmt::Display,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{AuthBackend, LocalAuth, RemoteAuth, User},
    category::{Category, CategoryName},
    db::initialize,
    item::{Item, ItemDraft},
    storage::{DocumentStore, FileKeyValueStore, KeyValueStore, SqliteDocumentStore, Subscription},
};

pub use local::{LocalInventory, inventory_key};
pub use remote::{RemoteInventory, categories_collection, items_collection};
pub use view::{InventoryView, LiveInventory, MergeStrategy};

/// A user's categories and items.
///
/// This is also the shape of the JSON blob stored in local mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// The categories in creation order.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// The items of every category.
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Inventory {
    /// Find a category by ID.
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    /// Find an item by ID.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The items that belong to the category `category_id`.
    pub fn items_in<'a>(&'a self, category_id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.category_id == category_id)
    }

    /// Items whose category no longer exists.
    pub fn orphans(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(|item| self.category(&item.category_id).is_none())
    }
}

/// Called with the whole inventory each time it changes.
pub type InventoryListener = Arc<dyn Fn(&Inventory) + Send + Sync>;

/// Stores the categories and items of each user.
///
/// Creating and updating are the same operation: passing `None` for
/// `existing` creates a record, passing the current record updates it.
pub trait InventoryStore: Send + Sync {
    /// Load every category and item of `user`.
    fn load(&self, user: &User) -> Result<Inventory, Error>;

    /// Create or rename a category.
    fn save_category(
        &self,
        user: &User,
        existing: Option<&Category>,
        name: CategoryName,
    ) -> Result<Category, Error>;

    /// Delete a category and every item in it.
    ///
    /// # Errors
    ///
    /// Returns an [Error::DeleteMissingCategory] if the category does not exist.
    fn delete_category(&self, user: &User, id: &str) -> Result<(), Error>;

    /// Create or update an item in the category `category_id`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::CategoryNotFound] if the category does not exist.
    fn save_item(
        &self,
        user: &User,
        existing: Option<&Item>,
        category_id: &str,
        draft: ItemDraft,
    ) -> Result<Item, Error>;

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns an [Error::DeleteMissingItem] if the item does not exist.
    fn delete_item(&self, user: &User, id: &str) -> Result<(), Error>;

    /// Call `listener` with the current inventory of `user` and again after
    /// every change to it.
    fn subscribe(&self, user: &User, listener: InventoryListener) -> Result<Subscription, Error>;

    /// Delete items whose category no longer exists.
    ///
    /// Returns the number of items deleted.
    fn prune_orphans(&self, user: &User) -> Result<usize, Error>;
}

/// Where the inventory is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceMode {
    /// JSON blobs in the local data directory, no approval needed.
    Demo,
    /// The document database, new accounts need approval.
    Remote,
}

impl Display for PersistenceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceMode::Demo => write!(f, "demo"),
            PersistenceMode::Remote => write!(f, "remote"),
        }
    }
}

/// Where the application keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// The SQLite document database. `None` selects demo mode.
    pub db_path: Option<PathBuf>,
    /// The directory for key-value files (preferences, and the inventory in demo mode).
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// The mode selected by this configuration.
    pub fn mode(&self) -> PersistenceMode {
        match self.db_path {
            Some(_) => PersistenceMode::Remote,
            None => PersistenceMode::Demo,
        }
    }
}

/// The stores selected for a [PersistenceMode].
#[derive(Clone)]
pub struct Backends {
    /// The mode the stores were selected for.
    pub mode: PersistenceMode,
    /// The inventory of each user.
    pub inventory: Arc<dyn InventoryStore>,
    /// User accounts and credentials.
    pub auth: Arc<dyn AuthBackend>,
    /// Key-value storage for preferences.
    pub key_values: Arc<dyn KeyValueStore>,
}

impl Backends {
    /// Keep everything in `key_values`.
    pub fn demo(key_values: Arc<dyn KeyValueStore>) -> Self {
        Self {
            mode: PersistenceMode::Demo,
            inventory: Arc::new(LocalInventory::new(key_values.clone())),
            auth: Arc::new(LocalAuth::new(key_values.clone())),
            key_values,
        }
    }

    /// Keep inventories and accounts in the database behind `connection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database tables cannot be created.
    pub fn remote(connection: Connection, key_values: Arc<dyn KeyValueStore>) -> Result<Self, Error> {
        initialize(&connection)?;

        let connection = Arc::new(Mutex::new(connection));
        let documents: Arc<dyn DocumentStore> =
            Arc::new(SqliteDocumentStore::new(connection.clone()));

        Ok(Self {
            mode: PersistenceMode::Remote,
            inventory: Arc::new(RemoteInventory::new(documents.clone())),
            auth: Arc::new(RemoteAuth::new(connection, documents)),
            key_values,
        })
    }
}

/// Open the stores selected by `config`.
///
/// # Errors
///
/// Returns an error if the data directory or the database cannot be opened.
pub fn connect(config: &StorageConfig) -> Result<Backends, Error> {
    let key_values: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::open(&config.data_dir)?);

    let backends = match &config.db_path {
        Some(db_path) => Backends::remote(Connection::open(db_path)?, key_values)?,
        None => Backends::demo(key_values),
    };

    tracing::info!(
        "Storing data in {} mode (data directory {:?})",
        backends.mode,
        config.data_dir
    );

    Ok(backends)
}
