//! Core types and trait definitions for the HR records service.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the temporal history model, the error taxonomy, the store boundary and the
//! promotion engine; the SQLite backend and the REST layer build on top of it.

pub mod employee;
pub mod error;
pub mod history;
pub mod promotion;
pub mod store;

pub use error::{Error, ErrorKind, Result};

#[cfg(test)]
mod memory;
