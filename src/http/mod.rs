//! HTTP layer — low-level REST client with retry policies.

mod client;
pub mod retry;

pub use client::MarketHttp;
pub use retry::{RetryConfig, RetryPolicy};
