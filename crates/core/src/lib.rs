//! Core types and shared functionality for mindful-sw.
//!
//! This crate provides:
//! - The intercepted request and response model
//! - The versioned cache store with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod request;
pub mod response;

pub use cache::{CacheDb, CacheStore, RequestKey};
pub use config::{ConfigError, SwConfig};
pub use error::Error;
pub use request::{Request, RequestMode};
pub use response::{Response, StoredResponse};
