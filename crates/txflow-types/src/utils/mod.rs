//! Utility functions shared across the txflow crates.

pub mod formatting;

pub use formatting::{strip_hex_prefix, truncate_id};
