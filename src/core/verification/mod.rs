//! Archive content checksums

pub mod checksum;

pub use checksum::{calculate_checksum_bytes, ChecksumSet};
