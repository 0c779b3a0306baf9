//! Error types shared by the pipelines.

use std::time::Duration;
use thiserror::Error;
use txflow_abi::AbiError;
use txflow_provider::ProviderError;
use txflow_types::{DecodingKind, TxHash};

/// Reasons a decoded result does not match the caller's expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// The decoder produced no candidate decoding.
	#[error("No decodings were produced")]
	NoDecodings,
	/// The authoritative decoding is a revert or an unrecognised failure.
	#[error("Expected return values but the call produced a {0}")]
	UnexpectedKind(DecodingKind),
	#[error("Expected {expected} return values but found {found}")]
	ArgumentCount { found: usize, expected: usize },
	/// A return value was read but is not valid for its declared type.
	#[error("Return value {index} could not be decoded: {reason}")]
	ArgumentDecoding { index: usize, reason: String },
	#[error("Return value {index} was rejected by its guard")]
	GuardRejected { index: usize },
}

/// Errors surfaced by pipeline accessors.
///
/// Stage results are memoized and handed to every reader, so the error is
/// `Clone` and carries only owned data.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
	/// Encoding failed before any request reached the provider.
	#[error("Encoding error: {0}")]
	Encoding(#[from] AbiError),
	/// The provider rejected a request or could not be reached.
	#[error("Transport error: {0}")]
	Transport(#[from] ProviderError),
	#[error("Decoding error: {0}")]
	Decoding(AbiError),
	#[error("Validation error: {0}")]
	Validation(#[from] ValidationError),
	/// No receipt was observed before the polling deadline.
	#[error("No receipt for transaction {hash} after {waited:?}")]
	ReceiptTimeout { hash: TxHash, waited: Duration },
	/// The deployment receipt does not name a created contract.
	#[error("Receipt for transaction {0} has no contract address")]
	MissingContractAddress(TxHash),
	#[error("Stage '{stage}' was cancelled")]
	Cancelled { stage: String },
	/// The stage task terminated abnormally.
	#[error("Stage '{stage}' failed: {message}")]
	StageFailed { stage: String, message: String },
	#[error("Configuration error: {0}")]
	Configuration(String),
}
