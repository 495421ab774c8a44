//! External system integrations
//!
//! - [`database`] - relational capabilities (`RecordSource`, `SessionVerifier`)
//! - [`postgresql`] - PostgreSQL implementation of the relational capabilities
//! - [`storage`] - object storage capability and its REST client
//! - [`memory`] - in-memory implementations for tests
//!
//! The export pipeline only sees the traits, so every backend can be swapped
//! for a fake.

pub mod database;
pub mod memory;
pub mod postgresql;
pub mod storage;
