//! Low level storage: string key-value files and JSON document collections.

mod documents;
mod kv;
mod subscription;

pub use documents::{
    DocumentStore, MAX_DOCUMENT_SIZE, SnapshotListener, SqliteDocumentStore, StoredDocument,
    WriteBatch, WriteOperation, create_document_table,
};
pub use kv::{DEFAULT_QUOTA, FileKeyValueStore, KeyValueStore};
pub use subscription::{Listener, Subscription, WatcherRegistry};
