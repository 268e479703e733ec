/*! Creates the SQLite schema used in remote mode. */

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{Error, auth::create_account_table, storage::create_document_table};

/// Create the document and account tables if they do not exist.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_document_table(&transaction)?;
    create_account_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
