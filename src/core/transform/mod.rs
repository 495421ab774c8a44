//! Data transformation logic
//!
//! Record sets leave the pipeline as CSV text; see [`csv::to_csv`].

pub mod csv;

pub use self::csv::{render_value, to_csv};
