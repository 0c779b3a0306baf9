//! In-memory provider for testing and local development.
//!
//! `MockProvider` behaves like an instamining development node with
//! node-managed accounts. Every request is counted per method, failures can
//! be scripted, and mining can be delayed so that receipt polling can be
//! exercised without a real chain.

use crate::{ProviderError, ProviderInterface};
use alloy_primitives::keccak256;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use txflow_types::{
	Address, Bytes, Log, Transaction, TransactionReceipt, TxHash, U256,
};

/// The JSON-RPC methods served by [`MockProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockMethod {
	Call,
	SendTransaction,
	EstimateGas,
	GetTransactionReceipt,
	Accounts,
}

/// Result of executing a submitted transaction on the mock chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
	/// Whether the transaction succeeded.
	pub success: bool,
	/// Logs to attach to the receipt.
	pub logs: Vec<Log>,
	/// Gas to report as consumed.
	pub gas_used: u64,
}

impl Default for Execution {
	fn default() -> Self {
		Self {
			success: true,
			logs: Vec::new(),
			gas_used: 21_000,
		}
	}
}

type CallHandler = Box<dyn Fn(&Transaction) -> Result<Bytes, ProviderError> + Send + Sync>;
type ExecutionHandler = Box<dyn Fn(&Transaction, Option<Address>) -> Execution + Send + Sync>;

/// Mutable chain state guarded by a single lock.
#[derive(Default)]
struct MockState {
	block_number: u64,
	nonces: HashMap<Address, u64>,
	sent: Vec<Transaction>,
	estimate_requests: Vec<Transaction>,
	receipts: HashMap<TxHash, TransactionReceipt>,
	/// Remaining empty receipt lookups before a pending hash is reported mined.
	pending: HashMap<TxHash, u32>,
	/// Remaining receipt lookups that fail with a transport error.
	receipt_failures: u32,
	counts: HashMap<MockMethod, usize>,
}

/// In-memory execution provider.
pub struct MockProvider {
	accounts: Vec<Address>,
	gas_estimate: u64,
	fail_estimates: bool,
	fail_sends: bool,
	mine_after: Option<u32>,
	latency: Option<Duration>,
	call_handler: Option<CallHandler>,
	execution_handler: Option<ExecutionHandler>,
	state: Mutex<MockState>,
}

impl Default for MockProvider {
	fn default() -> Self {
		Self::new()
	}
}

impl MockProvider {
	/// Creates a mock node with three funded accounts that mines instantly.
	pub fn new() -> Self {
		let accounts = (1u8..=3).map(|i| Address::with_last_byte(i)).collect();

		Self {
			accounts,
			gas_estimate: 21_000,
			fail_estimates: false,
			fail_sends: false,
			mine_after: Some(0),
			latency: None,
			call_handler: None,
			execution_handler: None,
			state: Mutex::new(MockState::default()),
		}
	}

	/// Sets the value returned by `eth_estimateGas`.
	pub fn with_gas_estimate(mut self, gas: u64) -> Self {
		self.gas_estimate = gas;
		self
	}

	/// Makes every `eth_estimateGas` request fail.
	pub fn with_failing_estimates(mut self) -> Self {
		self.fail_estimates = true;
		self
	}

	/// Makes every `eth_sendTransaction` request fail.
	pub fn with_failing_sends(mut self) -> Self {
		self.fail_sends = true;
		self
	}

	/// Reports submitted transactions as pending for `polls` receipt lookups.
	pub fn with_mining_delay(mut self, polls: u32) -> Self {
		self.mine_after = Some(polls);
		self
	}

	/// Never mines submitted transactions.
	pub fn without_mining(mut self) -> Self {
		self.mine_after = None;
		self
	}

	/// Makes the first `failures` receipt lookups fail with a network error.
	pub fn with_receipt_failures(self, failures: u32) -> Self {
		if let Ok(mut state) = self.state.lock() {
			state.receipt_failures = failures;
		}
		self
	}

	/// Delays every request by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Answers `eth_call` requests with the given handler.
	pub fn with_call_handler<F>(mut self, handler: F) -> Self
	where
		F: Fn(&Transaction) -> Result<Bytes, ProviderError> + Send + Sync + 'static,
	{
		self.call_handler = Some(Box::new(handler));
		self
	}

	/// Decides the outcome of submitted transactions. The handler receives the
	/// transaction and, for deployments, the address the contract is created at.
	pub fn with_execution_handler<F>(mut self, handler: F) -> Self
	where
		F: Fn(&Transaction, Option<Address>) -> Execution + Send + Sync + 'static,
	{
		self.execution_handler = Some(Box::new(handler));
		self
	}

	/// Returns the number of requests served for a method.
	pub fn request_count(&self, method: MockMethod) -> usize {
		self.state
			.lock()
			.map(|state| state.counts.get(&method).copied().unwrap_or(0))
			.unwrap_or(0)
	}

	/// Returns the transactions submitted so far, in order.
	pub fn sent_transactions(&self) -> Vec<Transaction> {
		self.state
			.lock()
			.map(|state| state.sent.clone())
			.unwrap_or_default()
	}

	/// Returns the transactions passed to `eth_estimateGas`, in order.
	pub fn estimate_requests(&self) -> Vec<Transaction> {
		self.state
			.lock()
			.map(|state| state.estimate_requests.clone())
			.unwrap_or_default()
	}

	async fn enter(&self, method: MockMethod) -> Result<(), ProviderError> {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}

		let mut state = self.lock()?;
		*state.counts.entry(method).or_default() += 1;
		Ok(())
	}

	fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockState>, ProviderError> {
		self.state
			.lock()
			.map_err(|_| ProviderError::Network("Mock provider state poisoned".to_string()))
	}
}

#[async_trait]
impl ProviderInterface for MockProvider {
	async fn call(&self, tx: &Transaction) -> Result<Bytes, ProviderError> {
		self.enter(MockMethod::Call).await?;

		match &self.call_handler {
			Some(handler) => handler(tx),
			None => Ok(Bytes::new()),
		}
	}

	async fn send_transaction(&self, tx: &Transaction) -> Result<TxHash, ProviderError> {
		self.enter(MockMethod::SendTransaction).await?;

		if self.fail_sends {
			return Err(ProviderError::Rpc(
				"Failed to send transaction: mock rejection".to_string(),
			));
		}

		let from = tx.from.or_else(|| self.accounts.first().copied()).ok_or_else(|| {
			ProviderError::Rpc("Failed to send transaction: no sender".to_string())
		})?;

		let mut state = self.lock()?;

		let nonce = {
			let entry = state.nonces.entry(from).or_default();
			let nonce = tx.nonce.unwrap_or(*entry);
			*entry = nonce + 1;
			nonce
		};

		let mut preimage = Vec::with_capacity(20 + 32 + tx.data.len());
		preimage.extend_from_slice(from.as_slice());
		preimage.extend_from_slice(&U256::from(nonce).to_be_bytes::<32>());
		preimage.extend_from_slice(&tx.data);
		let hash = keccak256(&preimage);

		let contract_address = tx.is_deployment().then(|| from.create(nonce));
		let execution = match &self.execution_handler {
			Some(handler) => handler(tx, contract_address),
			None => Execution::default(),
		};

		state.block_number += 1;
		let receipt = TransactionReceipt {
			hash,
			block_number: state.block_number,
			success: execution.success,
			gas_used: execution.gas_used,
			contract_address: if execution.success { contract_address } else { None },
			logs: execution.logs,
		};

		state.sent.push(tx.clone());
		state.receipts.insert(hash, receipt);
		match self.mine_after {
			Some(polls) => {
				state.pending.insert(hash, polls);
			}
			None => {
				state.pending.insert(hash, u32::MAX);
			}
		}

		Ok(hash)
	}

	async fn estimate_gas(&self, tx: &Transaction) -> Result<u64, ProviderError> {
		self.enter(MockMethod::EstimateGas).await?;

		let mut state = self.lock()?;
		state.estimate_requests.push(tx.clone());

		if self.fail_estimates {
			return Err(ProviderError::Rpc(
				"Failed to estimate gas: execution reverted".to_string(),
			));
		}

		Ok(match tx.gas {
			Some(cap) => self.gas_estimate.min(cap),
			None => self.gas_estimate,
		})
	}

	async fn get_transaction_receipt(
		&self,
		hash: &TxHash,
	) -> Result<Option<TransactionReceipt>, ProviderError> {
		self.enter(MockMethod::GetTransactionReceipt).await?;

		let mut state = self.lock()?;

		if state.receipt_failures > 0 {
			state.receipt_failures -= 1;
			return Err(ProviderError::Network(
				"Failed to get receipt: connection reset".to_string(),
			));
		}

		let mined = match state.pending.get_mut(hash) {
			Some(&mut u32::MAX) => false,
			Some(remaining) if *remaining > 0 => {
				*remaining -= 1;
				false
			}
			_ => true,
		};

		if !mined {
			return Ok(None);
		}

		Ok(state.receipts.get(hash).cloned())
	}

	async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
		self.enter(MockMethod::Accounts).await?;

		Ok(self.accounts.clone())
	}
}
