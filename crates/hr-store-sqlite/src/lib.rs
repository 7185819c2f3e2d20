//! SQLite backend for the HR records store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Promotions run the `hr-core` engine
//! inside a single SQLite transaction.

mod encode;
mod schema;
mod store;
mod tx;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
