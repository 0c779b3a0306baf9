//! Return data decoding types.
//!
//! A decoder turns the raw bytes returned by a contract into one or more
//! candidate interpretations. Each candidate is tagged with its kind so that
//! callers expecting a successful return can reject reverts and unrecognised
//! data explicitly.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Bytes;
use std::fmt;

/// Kind tag of a [`ReturndataDecoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodingKind {
	/// Normal return values.
	Return,
	/// Revert data matching a known error (custom error, `Error(string)`, `Panic(uint256)`).
	Revert,
	/// Data that matches neither the return types nor any known error.
	Failure,
}

impl fmt::Display for DecodingKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DecodingKind::Return => write!(f, "return"),
			DecodingKind::Revert => write!(f, "revert"),
			DecodingKind::Failure => write!(f, "failure"),
		}
	}
}

/// Value of a decoded argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
	/// A concrete decoded value.
	Value(DynSolValue),
	/// The slot was read but does not hold a valid value for its declared type.
	Error(String),
}

impl ArgumentValue {
	/// Returns the concrete value, if any.
	pub fn as_value(&self) -> Option<&DynSolValue> {
		match self {
			ArgumentValue::Value(value) => Some(value),
			ArgumentValue::Error(_) => None,
		}
	}

	/// Consumes the argument value, returning the concrete value if any.
	pub fn into_value(self) -> Option<DynSolValue> {
		match self {
			ArgumentValue::Value(value) => Some(value),
			ArgumentValue::Error(_) => None,
		}
	}
}

/// A decoded ABI argument with its declared name.
#[derive(Debug, Clone, PartialEq)]
pub struct AbiArgument {
	/// Parameter name from the ABI, if it has one.
	pub name: Option<String>,
	pub value: ArgumentValue,
}

impl AbiArgument {
	pub fn new(name: Option<String>, value: ArgumentValue) -> Self {
		Self { name, value }
	}
}

/// One candidate interpretation of return data.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturndataDecoding {
	/// The data decoded as the function's declared outputs.
	Return { arguments: Vec<AbiArgument> },
	/// The data is revert data for a known error.
	Revert {
		/// Error name, e.g. `Error`, `Panic` or a custom error name.
		name: String,
		arguments: Vec<AbiArgument>,
	},
	/// The data could not be interpreted.
	Failure { data: Bytes },
}

impl ReturndataDecoding {
	pub fn kind(&self) -> DecodingKind {
		match self {
			ReturndataDecoding::Return { .. } => DecodingKind::Return,
			ReturndataDecoding::Revert { .. } => DecodingKind::Revert,
			ReturndataDecoding::Failure { .. } => DecodingKind::Failure,
		}
	}

	/// Returns the decoded arguments; empty for [`ReturndataDecoding::Failure`].
	pub fn arguments(&self) -> &[AbiArgument] {
		match self {
			ReturndataDecoding::Return { arguments } => arguments,
			ReturndataDecoding::Revert { arguments, .. } => arguments,
			ReturndataDecoding::Failure { .. } => &[],
		}
	}

	/// Returns the revert reason for `Error(string)` reverts.
	pub fn revert_reason(&self) -> Option<&str> {
		match self {
			ReturndataDecoding::Revert { name, arguments } if name == "Error" => arguments
				.first()
				.and_then(|argument| argument.value.as_value())
				.and_then(|value| value.as_str()),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_revert_reason() {
		let decoding = ReturndataDecoding::Revert {
			name: "Error".to_string(),
			arguments: vec![AbiArgument::new(
				Some("message".to_string()),
				ArgumentValue::Value(DynSolValue::String("fail!".to_string())),
			)],
		};

		assert_eq!(decoding.kind(), DecodingKind::Revert);
		assert_eq!(decoding.revert_reason(), Some("fail!"));
	}

	#[test]
	fn test_failure_has_no_arguments() {
		let decoding = ReturndataDecoding::Failure {
			data: Bytes::from_static(&[0x01, 0x02]),
		};

		assert_eq!(decoding.kind().to_string(), "failure");
		assert!(decoding.arguments().is_empty());
		assert_eq!(decoding.revert_reason(), None);
	}
}
