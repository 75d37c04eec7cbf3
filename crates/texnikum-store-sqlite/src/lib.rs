//! SQLite backend for the Texnikum ERP store.
//!
//! Holds every collection as one row of a key/value table. A single
//! connection is shared behind a mutex, so individual reads and writes are
//! serialised but read-modify-write cycles are not.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
