//! Execution provider module for the txflow system.
//!
//! This module defines the narrow JSON-RPC surface the pipelines need from an
//! Ethereum node: read-only calls, transaction submission, gas estimation and
//! receipt lookup. Results are returned as data; interpreting them is left to
//! the pipelines.

use async_trait::async_trait;
use thiserror::Error;
use txflow_types::{Address, Bytes, Transaction, TransactionReceipt, TxHash};

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod mock;
}

/// Errors that can occur while talking to an execution provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error returned by the node for a JSON-RPC request.
	#[error("RPC error: {0}")]
	Rpc(String),
	/// Error that occurs when the configured endpoint cannot be used.
	#[error("Invalid RPC URL: {0}")]
	InvalidUrl(String),
}

/// Trait defining the interface for execution providers.
///
/// Each method corresponds to a single JSON-RPC round-trip.
#[async_trait]
pub trait ProviderInterface: Send + Sync {
	/// Executes a read-only call (`eth_call`) and returns the raw return data.
	async fn call(&self, tx: &Transaction) -> Result<Bytes, ProviderError>;

	/// Submits a transaction for the node to sign and broadcast
	/// (`eth_sendTransaction`), returning its hash.
	async fn send_transaction(&self, tx: &Transaction) -> Result<TxHash, ProviderError>;

	/// Estimates the gas a transaction would consume (`eth_estimateGas`).
	///
	/// The transaction's `gas` field, when set, is passed through as an upper
	/// bound for the estimation.
	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, ProviderError>;

	/// Looks up a transaction receipt (`eth_getTransactionReceipt`).
	///
	/// Returns `Ok(None)` while the transaction is not yet mined.
	async fn get_transaction_receipt(
		&self,
		hash: &TxHash,
	) -> Result<Option<TransactionReceipt>, ProviderError>;

	/// Lists the accounts managed by the node (`eth_accounts`).
	async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;
}
