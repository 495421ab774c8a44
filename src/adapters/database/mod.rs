//! Relational backend abstraction

pub mod factory;
pub mod traits;

pub use factory::{create_backends, Backends};
pub use traits::{AdminSession, RecordSource, SessionVerifier};
