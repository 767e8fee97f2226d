//! Route handlers, one module per resource.
//!
//! Every handler takes the [`crate::auth::CurrentUser`] extractor, so
//! identity is resolved before any handler body runs.

pub mod contradictions;
pub mod progress;
pub mod questions;
pub mod responses;
pub mod session;
