//! HTTP service for text2sql.
//!
//! Exposes query generation, execution and the knowledge tables over JSON.

#[cfg(feature = "server")]
mod server;

#[cfg(feature = "server")]
pub use server::*;
