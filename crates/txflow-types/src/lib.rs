//! Common types module for the txflow system.
//!
//! This module defines the value objects that flow through the contract
//! interaction pipelines: transactions and caller options, receipts, and the
//! decoded forms of contract return data.

/// Return data decoding types.
pub mod decoding;
/// Transaction, option and receipt types.
pub mod transaction;
/// Utility functions for hex formatting.
pub mod utils;

// Re-export all types for convenient access
pub use alloy_dyn_abi::DynSolValue;
pub use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
pub use decoding::*;
pub use transaction::*;
pub use utils::{strip_hex_prefix, truncate_id};
