//! Request interception for mindful-sw.
//!
//! This crate provides the network fetcher, the request router, the
//! cache-first and network-first strategies, and the install/activate
//! lifecycle, tied together by [`RequestInterceptor`].

pub mod fetch;
pub mod interceptor;
pub mod lifecycle;
pub mod router;
pub mod strategy;

#[cfg(test)]
mod testing;

pub use fetch::{FetchClient, FetchConfig, Fetcher};
pub use interceptor::{FetchOutcome, RequestInterceptor};
pub use lifecycle::{ActivateReport, InstallReport, Lifecycle, LifecycleState};
pub use router::{PassReason, Route, Router};
pub use strategy::{ResponseSource, StrategyResponse};
