//! Link retrieval through a prioritized chain of interchangeable HTTP
//! strategies.
//!
//! Strategies are tried strictly in order; the first one that returns a
//! response wins and no other strategy is contacted afterwards.

pub mod chain;
pub mod clients;
pub mod types;

pub use chain::Fetcher;
pub use clients::{BrowserStrategy, PlainTextStrategy, StandardStrategy};
pub use types::{FetchBody, FetchPolicy, FetchResult, FetchStrategy};
