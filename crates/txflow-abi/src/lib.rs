//! ABI encoding and decoding module for the txflow system.
//!
//! The pipelines never build calldata or interpret return data themselves.
//! They go through the two interfaces defined here: an encoder that turns a
//! function (or constructor) plus loosely typed inputs into a transaction, and
//! a decoder that turns return data into tagged candidate decodings.

use alloy_json_abi::{Constructor, Function};
use async_trait::async_trait;
use thiserror::Error;
use txflow_types::{Bytes, ReturndataDecoding, Transaction};

/// Re-export implementations
pub mod implementations {
	pub mod json;
}

pub use alloy_json_abi::JsonAbi;
pub use implementations::json::{ContractArtifact, JsonAbiCodec};

/// Errors that can occur while encoding or decoding.
#[derive(Debug, Clone, Error)]
pub enum AbiError {
	/// No function with the requested name or signature exists.
	#[error("Unknown function: {0}")]
	UnknownFunction(String),
	/// Several overloads exist but none accepts the inputs.
	#[error("No overload of {0} accepts the given inputs")]
	NoMatchingOverload(String),
	/// An input could not be coerced to its declared parameter type.
	#[error("Invalid input at index {index}: {reason}")]
	InvalidInput { index: usize, reason: String },
	/// The number of inputs does not match the declared parameters.
	#[error("Expected {expected} inputs but found {found}")]
	ArgumentCount { expected: usize, found: usize },
	/// A call was encoded without a deployed contract address.
	#[error("Encoder is not bound to a contract address")]
	MissingAddress,
	/// A deployment was encoded without creation bytecode.
	#[error("Contract artifact has no bytecode")]
	MissingBytecode,
	/// Error raised by the underlying ABI encoder.
	#[error("Encoding error: {0}")]
	Encoding(String),
	/// Error raised by the underlying ABI decoder.
	#[error("Decoding error: {0}")]
	Decoding(String),
	/// Error that occurs while reading a contract artifact.
	#[error("Artifact error: {0}")]
	Artifact(String),
}

/// Identifies the function a transaction should invoke.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionTarget {
	/// A bare function name (`transfer`) or a full signature
	/// (`transfer(address,uint256)`).
	Name(String),
	/// Explicit ABI entries to choose from.
	Abis(Vec<Function>),
}

impl FunctionTarget {
	/// Returns a human readable label for diagnostics.
	pub fn label(&self) -> String {
		match self {
			FunctionTarget::Name(name) => name.clone(),
			FunctionTarget::Abis(entries) => entries
				.first()
				.map(|entry| entry.name.clone())
				.unwrap_or_else(|| "<empty>".to_string()),
		}
	}
}

impl From<&str> for FunctionTarget {
	fn from(name: &str) -> Self {
		FunctionTarget::Name(name.to_string())
	}
}

impl From<String> for FunctionTarget {
	fn from(name: String) -> Self {
		FunctionTarget::Name(name)
	}
}

impl From<Function> for FunctionTarget {
	fn from(entry: Function) -> Self {
		FunctionTarget::Abis(vec![entry])
	}
}

impl From<Vec<Function>> for FunctionTarget {
	fn from(entries: Vec<Function>) -> Self {
		FunctionTarget::Abis(entries)
	}
}

/// A transaction together with the ABI entry used to encode it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTransaction {
	pub tx: Transaction,
	pub abi: Function,
}

/// Trait defining the interface for transaction encoders.
#[async_trait]
pub trait EncoderInterface: Send + Sync {
	/// Encodes a function invocation against a deployed contract.
	///
	/// Fails when the target cannot be resolved or the inputs do not match
	/// the declared parameter types.
	async fn encode_transaction(
		&self,
		target: &FunctionTarget,
		inputs: &[serde_json::Value],
	) -> Result<EncodedTransaction, AbiError>;

	/// Encodes a contract deployment.
	///
	/// `constructor` is `None` when the contract declares no constructor; the
	/// default empty constructor is used in that case.
	async fn encode_constructor(
		&self,
		constructor: Option<&Constructor>,
		inputs: &[serde_json::Value],
	) -> Result<Transaction, AbiError>;
}

/// Trait defining the interface for return data decoders.
#[async_trait]
pub trait DecoderInterface: Send + Sync {
	/// Decodes data returned by `abi` into candidate interpretations.
	///
	/// The list is never empty and the most likely interpretation comes first.
	async fn decode_return_value(
		&self,
		abi: &Function,
		data: &Bytes,
	) -> Result<Vec<ReturndataDecoding>, AbiError>;
}
