//! A JSON document store with collections, atomic batches and change watches.
//!
//! Documents are addressed by a collection path such as
//! `users/{uid}/items` and an ID unique within that collection.

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Value};

use crate::{
    Error,
    entity_id::now_millis,
    storage::subscription::{Subscription, WatcherRegistry},
};

/// The largest serialized document, in bytes, the store accepts.
pub const MAX_DOCUMENT_SIZE: usize = 1_048_576;

/// A document and its ID.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// The ID of the document within its collection.
    pub id: String,
    /// The document body.
    pub data: Value,
}

/// Called with every document in a collection each time it changes.
pub type SnapshotListener = Arc<dyn Fn(&[StoredDocument]) + Send + Sync>;

/// A write that is part of a [WriteBatch].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOperation {
    /// Create or replace a document.
    Set {
        /// The collection the document belongs to.
        collection: String,
        /// The ID of the document.
        id: String,
        /// The new document body.
        data: Value,
    },
    /// Delete a document.
    Delete {
        /// The collection the document belongs to.
        collection: String,
        /// The ID of the document.
        id: String,
    },
}

impl WriteOperation {
    fn collection(&self) -> &str {
        match self {
            WriteOperation::Set { collection, .. } | WriteOperation::Delete { collection, .. } => {
                collection
            }
        }
    }
}

/// A group of writes that are applied together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    operations: Vec<WriteOperation>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a create or replace to the batch.
    pub fn set(&mut self, collection: &str, id: &str, data: Value) -> &mut Self {
        self.operations.push(WriteOperation::Set {
            collection: collection.to_owned(),
            id: id.to_owned(),
            data,
        });
        self
    }

    /// Add a delete to the batch.
    pub fn delete(&mut self, collection: &str, id: &str) -> &mut Self {
        self.operations.push(WriteOperation::Delete {
            collection: collection.to_owned(),
            id: id.to_owned(),
        });
        self
    }

    /// The number of writes in the batch.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the batch has no writes.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The writes in the order they were added.
    pub fn operations(&self) -> &[WriteOperation] {
        &self.operations
    }
}

/// Storage for JSON documents grouped into collections.
pub trait DocumentStore: Send + Sync {
    /// Create or replace the document `id` in `collection`.
    fn set(&self, collection: &str, id: &str, data: &Value) -> Result<(), Error>;

    /// Get the document `id` in `collection`, or `None` if it does not exist.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, Error>;

    /// Update some fields of an existing document.
    ///
    /// # Errors
    ///
    /// Returns an [Error::NotFound] if the document does not exist.
    fn merge(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), Error>;

    /// Delete the document `id` in `collection`.
    ///
    /// Returns whether the document existed.
    fn delete(&self, collection: &str, id: &str) -> Result<bool, Error>;

    /// Get every document in `collection` in the order they were created.
    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, Error>;

    /// Apply every write in `batch` atomically.
    fn commit(&self, batch: WriteBatch) -> Result<(), Error>;

    /// Call `listener` with the documents in `collection` now and after every
    /// change to the collection.
    fn watch(&self, collection: &str, listener: SnapshotListener) -> Result<Subscription, Error>;
}

/// Create the table that holds the documents.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_document_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS document (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (collection, id)
                )",
        (),
    )?;

    Ok(())
}

/// A [DocumentStore] backed by a SQLite table.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    connection: Arc<Mutex<Connection>>,
    watchers: WatcherRegistry<String, [StoredDocument]>,
}

impl SqliteDocumentStore {
    /// Create a store on a connection to a database with the document table.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            connection,
            watchers: WatcherRegistry::new(),
        }
    }

    fn with_connection<R>(
        &self,
        f: impl FnOnce(&Connection) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let connection = self
            .connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        f(&connection)
    }

    /// Send fresh snapshots of `collections` to their watchers.
    ///
    /// Must be called without the connection lock held.
    fn notify<'a>(&self, collections: impl IntoIterator<Item = &'a str>) {
        for collection in collections {
            let collection = collection.to_owned();
            if !self.watchers.is_watched(&collection) {
                continue;
            }

            match self.list(&collection) {
                Ok(snapshot) => self.watchers.notify(&collection, &snapshot),
                Err(error) => {
                    tracing::error!("could not load snapshot of {collection} for watchers: {error}")
                }
            }
        }
    }
}

fn serialize_document(data: &Value) -> Result<String, Error> {
    let text = serde_json::to_string(data)?;

    if text.len() > MAX_DOCUMENT_SIZE {
        return Err(Error::DocumentTooLarge {
            size: text.len(),
            limit: MAX_DOCUMENT_SIZE,
        });
    }

    Ok(text)
}

fn upsert(connection: &Connection, collection: &str, id: &str, text: &str) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO document (collection, id, data, updated_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
        (collection, id, text, now_millis()),
    )?;

    Ok(())
}

fn select(connection: &Connection, collection: &str, id: &str) -> Result<Option<Value>, Error> {
    let text: Option<String> = connection
        .query_row(
            "SELECT data FROM document WHERE collection = ?1 AND id = ?2",
            (collection, id),
            |row| row.get(0),
        )
        .optional()?;

    text.map(|text| serde_json::from_str(&text).map_err(Error::from))
        .transpose()
}

fn remove(connection: &Connection, collection: &str, id: &str) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM document WHERE collection = ?1 AND id = ?2",
        (collection, id),
    )?;

    Ok(rows_affected > 0)
}

impl DocumentStore for SqliteDocumentStore {
    fn set(&self, collection: &str, id: &str, data: &Value) -> Result<(), Error> {
        let text = serialize_document(data)?;
        self.with_connection(|connection| upsert(connection, collection, id, &text))?;
        self.notify([collection]);

        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, Error> {
        self.with_connection(|connection| select(connection, collection, id))
    }

    fn merge(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), Error> {
        self.with_connection(|connection| {
            let mut document = select(connection, collection, id)?.ok_or(Error::NotFound)?;

            let object = document.as_object_mut().ok_or_else(|| {
                Error::JSONSerializationError(format!(
                    "document {collection}/{id} is not a JSON object"
                ))
            })?;
            object.extend(fields.clone());

            let text = serialize_document(&document)?;
            upsert(connection, collection, id, &text)
        })?;
        self.notify([collection]);

        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool, Error> {
        let existed = self.with_connection(|connection| remove(connection, collection, id))?;

        if existed {
            self.notify([collection]);
        }

        Ok(existed)
    }

    fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, Error> {
        self.with_connection(|connection| {
            let rows: Result<Vec<(String, String)>, rusqlite::Error> = connection
                .prepare("SELECT id, data FROM document WHERE collection = ?1 ORDER BY rowid")?
                .query_map((collection,), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect();

            rows?
                .into_iter()
                .map(|(id, text)| -> Result<StoredDocument, Error> {
                    Ok(StoredDocument {
                        id,
                        data: serde_json::from_str(&text)?,
                    })
                })
                .collect()
        })
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), Error> {
        if batch.is_empty() {
            return Ok(());
        }

        // Serialize everything up front so an oversized document aborts the
        // batch before anything is written.
        let prepared = batch
            .operations()
            .iter()
            .map(|operation| match operation {
                WriteOperation::Set { data, .. } => serialize_document(data).map(Some),
                WriteOperation::Delete { .. } => Ok(None),
            })
            .collect::<Result<Vec<_>, Error>>()?;

        self.with_connection(|connection| {
            let transaction = connection.unchecked_transaction()?;

            for (operation, text) in batch.operations().iter().zip(&prepared) {
                match (operation, text) {
                    (WriteOperation::Set { collection, id, .. }, Some(text)) => {
                        upsert(&transaction, collection, id, text)?
                    }
                    (WriteOperation::Delete { collection, id }, _) => {
                        remove(&transaction, collection, id)?;
                    }
                    (WriteOperation::Set { .. }, None) => {}
                }
            }

            transaction.commit()?;

            Ok(())
        })?;

        let collections = batch
            .operations()
            .iter()
            .map(WriteOperation::collection)
            .collect::<BTreeSet<_>>();
        self.notify(collections);

        Ok(())
    }

    fn watch(&self, collection: &str, listener: SnapshotListener) -> Result<Subscription, Error> {
        let snapshot = self.list(collection)?;
        let subscription = self
            .watchers
            .register(collection.to_owned(), listener.clone());

        listener(&snapshot);

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use serde_json::{Map, Value, json};

    use crate::{
        Error,
        storage::documents::{
            DocumentStore, MAX_DOCUMENT_SIZE, SqliteDocumentStore, StoredDocument, WriteBatch,
            create_document_table,
        },
    };

    fn get_store() -> SqliteDocumentStore {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_document_table(&connection).expect("Could not create document table");

        SqliteDocumentStore::new(Arc::new(Mutex::new(connection)))
    }

    #[test]
    fn set_then_get_returns_document() {
        let store = get_store();
        let data = json!({"id": "c1", "name": "Lipsticks"});

        store.set("users/u1/categories", "c1", &data).unwrap();

        assert_eq!(store.get("users/u1/categories", "c1"), Ok(Some(data)));
        assert_eq!(store.get("users/u2/categories", "c1"), Ok(None));
    }

    #[test]
    fn set_replaces_existing_document_and_keeps_order() {
        let store = get_store();
        store.set("c", "a", &json!({"n": 1})).unwrap();
        store.set("c", "b", &json!({"n": 2})).unwrap();

        store.set("c", "a", &json!({"n": 3})).unwrap();

        let ids = store
            .list("c")
            .unwrap()
            .into_iter()
            .map(|document| (document.id, document.data))
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                ("a".to_owned(), json!({"n": 3})),
                ("b".to_owned(), json!({"n": 2}))
            ]
        );
    }

    #[test]
    fn oversized_document_is_rejected() {
        let store = get_store();
        let data = json!({"images": ["x".repeat(MAX_DOCUMENT_SIZE)]});

        let result = store.set("c", "big", &data);

        assert!(matches!(
            result,
            Err(Error::DocumentTooLarge {
                limit: MAX_DOCUMENT_SIZE,
                ..
            })
        ));
        assert_eq!(store.get("c", "big"), Ok(None));
    }

    #[test]
    fn merge_updates_only_given_fields() {
        let store = get_store();
        store
            .set("users", "u1", &json!({"email": "a@example.com", "isApproved": false}))
            .unwrap();
        let mut fields = Map::new();
        fields.insert("isApproved".to_owned(), Value::Bool(true));

        store.merge("users", "u1", &fields).unwrap();

        assert_eq!(
            store.get("users", "u1"),
            Ok(Some(json!({"email": "a@example.com", "isApproved": true})))
        );
    }

    #[test]
    fn merge_missing_document_fails() {
        let store = get_store();

        let result = store.merge("users", "nobody", &Map::new());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_reports_whether_document_existed() {
        let store = get_store();
        store.set("c", "a", &json!({})).unwrap();

        assert_eq!(store.delete("c", "a"), Ok(true));
        assert_eq!(store.delete("c", "a"), Ok(false));
    }

    #[test]
    fn batch_is_applied_atomically() {
        let store = get_store();
        store.set("items", "i1", &json!({"title": "Ruby Red"})).unwrap();
        let mut batch = WriteBatch::new();
        batch
            .delete("items", "i1")
            .set("items", "i2", json!({"title": "Nude"}))
            .set(
                "items",
                "i3",
                json!({"images": ["x".repeat(MAX_DOCUMENT_SIZE)]}),
            );

        let result = store.commit(batch);

        assert!(matches!(result, Err(Error::DocumentTooLarge { .. })));
        let ids = store
            .list("items")
            .unwrap()
            .into_iter()
            .map(|document| document.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["i1".to_owned()]);
    }

    #[test]
    fn watch_delivers_initial_and_updated_snapshots() {
        let store = get_store();
        store.set("c", "a", &json!({"n": 1})).unwrap();
        let snapshots: Arc<Mutex<Vec<Vec<StoredDocument>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = snapshots.clone();

        let subscription = store
            .watch(
                "c",
                Arc::new(move |documents: &[StoredDocument]| sink.lock().unwrap().push(documents.to_vec())),
            )
            .unwrap();
        store.set("c", "b", &json!({"n": 2})).unwrap();
        store.set("other", "x", &json!({})).unwrap();
        drop(subscription);
        store.delete("c", "a").unwrap();

        let snapshots = snapshots.lock().unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].len(), 1);
        assert_eq!(snapshots[1].len(), 2);
    }

    #[test]
    fn watcher_can_read_store_from_listener() {
        let store = get_store();
        let reader = store.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let _subscription = store
            .watch(
                "c",
                Arc::new(move |_: &[StoredDocument]| {
                    let count = reader.list("c").map(|documents| documents.len());
                    sink.lock().unwrap().push(count);
                }),
            )
            .unwrap();
        store.set("c", "a", &json!({})).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![Ok(0), Ok(1)]);
    }
}
