//! Object storage integration

pub mod client;
pub mod traits;

pub use client::StorageClient;
pub use traits::ObjectStore;
