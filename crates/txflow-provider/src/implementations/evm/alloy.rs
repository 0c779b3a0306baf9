//! Alloy-based execution provider.
//!
//! Talks to an Ethereum node over HTTP JSON-RPC using the Alloy provider
//! stack. Transactions are sent with `eth_sendTransaction`, so the node is
//! expected to manage (and unlock) the sending accounts.

use crate::{ProviderError, ProviderInterface};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_transport::{RpcError, TransportErrorKind};
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::sync::Arc;
use txflow_types::{
	truncate_id, Address, Bytes, Transaction, TransactionReceipt, TxHash,
};

/// Alloy-based JSON-RPC provider.
pub struct AlloyProvider {
	/// Underlying Alloy provider.
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	/// Endpoint this provider talks to, kept for diagnostics.
	rpc_url: String,
}

impl AlloyProvider {
	/// Creates a new AlloyProvider for the given HTTP endpoint.
	pub fn new(rpc_url: &str) -> Result<Self, ProviderError> {
		let url: reqwest::Url = rpc_url
			.parse()
			.map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", rpc_url, e)))?;

		let provider = ProviderBuilder::new().on_http(url);

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
			rpc_url: rpc_url.to_string(),
		})
	}

	/// Returns the endpoint URL.
	pub fn rpc_url(&self) -> &str {
		&self.rpc_url
	}
}

/// Maps a transport error, keeping node-level JSON-RPC errors distinct from
/// connectivity failures.
fn map_transport_error(context: &str, error: RpcError<TransportErrorKind>) -> ProviderError {
	match error {
		RpcError::ErrorResp(payload) => ProviderError::Rpc(format!("{}: {}", context, payload)),
		other => ProviderError::Network(format!("{}: {}", context, other)),
	}
}

#[async_trait]
impl ProviderInterface for AlloyProvider {
	async fn call(&self, tx: &Transaction) -> Result<Bytes, ProviderError> {
		let request: TransactionRequest = tx.clone().into();

		self.provider
			.call(&request)
			.await
			.map_err(|e| map_transport_error("eth_call failed", e))
	}

	async fn send_transaction(&self, tx: &Transaction) -> Result<TxHash, ProviderError> {
		let request: TransactionRequest = tx.clone().into();

		let pending_tx = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| map_transport_error("Failed to send transaction", e))?;

		let tx_hash = *pending_tx.tx_hash();
		tracing::debug!(tx_hash = %truncate_id(&tx_hash.to_string()), rpc_url = %self.rpc_url, "Transaction accepted by node");

		Ok(tx_hash)
	}

	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, ProviderError> {
		let request: TransactionRequest = tx.clone().into();

		self.provider
			.estimate_gas(&request)
			.await
			.map_err(|e| map_transport_error("Failed to estimate gas", e))
	}

	async fn get_transaction_receipt(
		&self,
		hash: &TxHash,
	) -> Result<Option<TransactionReceipt>, ProviderError> {
		let receipt = self
			.provider
			.get_transaction_receipt(*hash)
			.await
			.map_err(|e| map_transport_error("Failed to get receipt", e))?;

		Ok(receipt.map(TransactionReceipt::from))
	}

	async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
		self.provider
			.get_accounts()
			.await
			.map_err(|e| map_transport_error("Failed to list accounts", e))
	}
}
