//! SQLite-backed store of versioned cache generations.
//!
//! Each deployment version owns one named generation mapping request identity
//! to a stored response. The module provides:
//!
//! - Request identity hashing (SHA-256 of method and URL)
//! - Idempotent open, lookup, UPSERT and whole-generation delete
//! - Automatic schema migrations
//! - WAL mode for concurrent access from in-flight requests

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::{RequestKey, compute_request_key};
pub use store::{CacheStore, StoreSummary};
