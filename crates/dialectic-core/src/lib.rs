//! Core types and trait definitions for the Dialectic reasoning tutor.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::SessionStore`]; language-model
//! backends implement [`gateway::Gateway`]. The engine depends only on these
//! abstractions.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod gateway;
pub mod progress;
pub mod response;
pub mod stage;
pub mod store;

pub use error::{Error, Result};
