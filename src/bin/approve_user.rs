use std::{
    error::Error,
    path::Path,
    process::exit,
    sync::{Arc, Mutex},
};

use clap::Parser;
use rusqlite::Connection;

use makeup_inventory::{
    auth::{AuthBackend, Email, RemoteAuth},
    initialize_db,
    storage::SqliteDocumentStore,
};

/// A utility for approving a pending account directly in the database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite document database.
    #[arg(long)]
    db_path: String,

    /// The e-mail address of the account to approve.
    #[arg(long)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        print_error(format!("File does not exist at {db_path:#?}!"));
        exit(1);
    }

    let email = match Email::new(&args.email) {
        Ok(email) => email,
        Err(error) => {
            print_error(error);
            exit(1);
        }
    };

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;
    let connection = Arc::new(Mutex::new(connection));
    let documents = Arc::new(SqliteDocumentStore::new(connection.clone()));
    let auth = RemoteAuth::new(connection, documents);

    let Some((user, _)) = auth.find_by_email(&email)? else {
        print_error(format!("No account found for {email}."));
        exit(1);
    };

    if user.is_approved {
        println!("{email} is already approved.");
        return Ok(());
    }

    auth.approve(&user.uid)?;
    println!("Approved {email}.");

    Ok(())
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string());
}
