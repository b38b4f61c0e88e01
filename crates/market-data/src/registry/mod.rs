//! Provider registry module.
//!
//! Maps each [`Source`](crate::models::Source) to the provider serving it.
//! The registry is built once at startup and never mutated.

mod registry;

pub use registry::{ProviderEndpoints, ProviderRegistry};
