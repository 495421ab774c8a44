//! PostgreSQL integration
//!
//! Reads the managed backend's tables and admin sessions.

pub mod adapter;
pub mod client;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
