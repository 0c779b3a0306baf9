//! Transaction types for contract interactions.
//!
//! This module defines the wire-ready transaction produced by an encoder, the
//! sparse options a caller can layer on top of it, and the receipt observed
//! once the transaction has been mined.

use alloy_primitives::{Address, Bytes, TxHash, TxKind, B256, U256};
use alloy_rpc_types::{AccessList, TransactionInput, TransactionRequest};
use serde::{Deserialize, Serialize};

/// A wire-ready transaction.
///
/// `to` is `None` for contract deployments, in which case `data` holds the
/// creation bytecode followed by the encoded constructor arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	/// Recipient contract, or `None` for deployments.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to: Option<Address>,
	/// Calldata (or creation code for deployments).
	#[serde(default, alias = "input")]
	pub data: Bytes,
	/// Sender account.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<Address>,
	/// Amount of wei to transfer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<U256>,
	/// Gas limit.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas: Option<u64>,
	/// Legacy gas price.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<u128>,
	/// EIP-1559 max fee per gas.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_fee_per_gas: Option<u128>,
	/// EIP-1559 priority fee per gas.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_priority_fee_per_gas: Option<u128>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nonce: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<u64>,
	/// EIP-2930 access list.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_list: Option<AccessList>,
}

impl Transaction {
	/// Returns true when this transaction creates a contract.
	pub fn is_deployment(&self) -> bool {
		self.to.is_none()
	}
}

impl From<Transaction> for TransactionRequest {
	fn from(tx: Transaction) -> Self {
		let to = match tx.to {
			Some(address) => TxKind::Call(address),
			None => TxKind::Create,
		};

		TransactionRequest {
			from: tx.from,
			to: Some(to),
			input: TransactionInput::new(tx.data),
			value: tx.value,
			gas: tx.gas,
			gas_price: tx.gas_price,
			max_fee_per_gas: tx.max_fee_per_gas,
			max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
			nonce: tx.nonce,
			chain_id: tx.chain_id,
			access_list: tx.access_list,
			..Default::default()
		}
	}
}

/// Caller-supplied transaction fields.
///
/// Every field is optional. Fields that are set always override the values
/// derived by the encoder, and a set `gas` disables gas estimation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxOptions {
	/// Recipient override. Ignored for deployments.
	pub to: Option<Address>,
	pub from: Option<Address>,
	pub nonce: Option<u64>,
	/// Gas limit. Also accepted as `gasLimit` / `gas_limit`.
	#[serde(alias = "gasLimit", alias = "gas_limit")]
	pub gas: Option<u64>,
	pub value: Option<U256>,
	#[serde(alias = "gas_price")]
	pub gas_price: Option<u128>,
	#[serde(alias = "max_fee_per_gas")]
	pub max_fee_per_gas: Option<u128>,
	#[serde(alias = "max_priority_fee_per_gas")]
	pub max_priority_fee_per_gas: Option<u128>,
	#[serde(alias = "chain_id")]
	pub chain_id: Option<u64>,
	#[serde(alias = "access_list")]
	pub access_list: Option<AccessList>,
}

impl TxOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_to(mut self, to: Address) -> Self {
		self.to = Some(to);
		self
	}

	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}

	pub fn with_nonce(mut self, nonce: u64) -> Self {
		self.nonce = Some(nonce);
		self
	}

	pub fn with_gas(mut self, gas: u64) -> Self {
		self.gas = Some(gas);
		self
	}

	/// Alias of [`TxOptions::with_gas`].
	pub fn with_gas_limit(self, gas_limit: u64) -> Self {
		self.with_gas(gas_limit)
	}

	pub fn with_value(mut self, value: U256) -> Self {
		self.value = Some(value);
		self
	}

	pub fn with_gas_price(mut self, gas_price: u128) -> Self {
		self.gas_price = Some(gas_price);
		self
	}

	pub fn with_max_fee_per_gas(mut self, max_fee_per_gas: u128) -> Self {
		self.max_fee_per_gas = Some(max_fee_per_gas);
		self
	}

	pub fn with_max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: u128) -> Self {
		self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
		self
	}

	pub fn with_chain_id(mut self, chain_id: u64) -> Self {
		self.chain_id = Some(chain_id);
		self
	}

	pub fn with_access_list(mut self, access_list: AccessList) -> Self {
		self.access_list = Some(access_list);
		self
	}

	/// Drops the recipient override, as required for contract creation.
	pub fn without_recipient(mut self) -> Self {
		self.to = None;
		self
	}

	/// Merges these options into an encoded transaction. Set fields win.
	pub fn apply(&self, mut tx: Transaction) -> Transaction {
		let options = self.clone();

		if options.to.is_some() {
			tx.to = options.to;
		}
		tx.from = options.from.or(tx.from);
		tx.nonce = options.nonce.or(tx.nonce);
		tx.gas = options.gas.or(tx.gas);
		tx.value = options.value.or(tx.value);
		tx.gas_price = options.gas_price.or(tx.gas_price);
		tx.max_fee_per_gas = options.max_fee_per_gas.or(tx.max_fee_per_gas);
		tx.max_priority_fee_per_gas = options
			.max_priority_fee_per_gas
			.or(tx.max_priority_fee_per_gas);
		tx.chain_id = options.chain_id.or(tx.chain_id);
		tx.access_list = options.access_list.or(tx.access_list);

		tx
	}
}

/// A log entry emitted during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
	/// Address of the emitting contract.
	pub address: Address,
	/// Indexed topics, event signature first for non-anonymous events.
	pub topics: Vec<B256>,
	/// Non-indexed event data.
	pub data: Bytes,
}

/// Transaction receipt containing execution details.
///
/// A receipt is terminal: a reverted transaction still produces one, with
/// `success` set to false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// The hash of the transaction.
	pub hash: TxHash,
	/// The block number where the transaction was included.
	pub block_number: u64,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Gas consumed by the transaction.
	pub gas_used: u64,
	/// Address of the created contract, for deployments.
	pub contract_address: Option<Address>,
	/// Logs emitted by the transaction.
	pub logs: Vec<Log>,
}

impl TransactionReceipt {
	/// Returns the receipt status in its JSON-RPC form ("0x1" or "0x0").
	pub fn status(&self) -> &'static str {
		if self.success {
			"0x1"
		} else {
			"0x0"
		}
	}
}

impl From<alloy_rpc_types::TransactionReceipt> for TransactionReceipt {
	fn from(receipt: alloy_rpc_types::TransactionReceipt) -> Self {
		let logs = receipt
			.inner
			.logs()
			.iter()
			.map(|log| Log {
				address: log.inner.address,
				topics: log.inner.data.topics().to_vec(),
				data: log.inner.data.data.clone(),
			})
			.collect();

		Self {
			hash: receipt.transaction_hash,
			block_number: receipt.block_number.unwrap_or(0),
			success: receipt.status(),
			gas_used: receipt.gas_used as u64,
			contract_address: receipt.contract_address,
			logs,
		}
	}
}
