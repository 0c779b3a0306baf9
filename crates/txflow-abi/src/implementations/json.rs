//! JSON ABI encoder and decoder.
//!
//! Implements both [`EncoderInterface`] and [`DecoderInterface`] on top of a
//! contract's JSON ABI using Alloy's dynamic ABI support. Inputs are given as
//! JSON values and coerced against the declared parameter types, so callers
//! can pass `"1000"`, `1000` or `"0x3e8"` for a `uint256` alike.

use crate::{AbiError, DecoderInterface, EncodedTransaction, EncoderInterface, FunctionTarget};
use alloy_dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Constructor, Function, JsonAbi, Param};
use alloy_sol_types::{Panic, Revert, SolError};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use txflow_types::{
	strip_hex_prefix, AbiArgument, Address, ArgumentValue, Bytes, ReturndataDecoding, Transaction,
};

/// A compiled contract: its ABI and (optionally) its creation bytecode.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
	/// Contract name, when the artifact records one.
	pub contract_name: Option<String>,
	pub abi: JsonAbi,
	/// Creation bytecode; `None` for interfaces and abstract contracts.
	pub bytecode: Option<Bytes>,
}

impl ContractArtifact {
	/// Parses an artifact from JSON.
	///
	/// Accepts Truffle/Hardhat style artifacts (`"bytecode": "0x..."`) as well
	/// as Foundry output (`"bytecode": { "object": "0x..." }`). A bare ABI
	/// array is accepted too and yields an artifact without bytecode.
	pub fn from_json(json: &str) -> Result<Self, AbiError> {
		let value: Value = serde_json::from_str(json)
			.map_err(|e| AbiError::Artifact(format!("Invalid JSON: {}", e)))?;

		if value.is_array() {
			let abi = serde_json::from_value(value)
				.map_err(|e| AbiError::Artifact(format!("Invalid ABI: {}", e)))?;
			return Ok(Self {
				contract_name: None,
				abi,
				bytecode: None,
			});
		}

		let abi_value = value
			.get("abi")
			.cloned()
			.ok_or_else(|| AbiError::Artifact("Artifact has no abi field".to_string()))?;
		let abi: JsonAbi = serde_json::from_value(abi_value)
			.map_err(|e| AbiError::Artifact(format!("Invalid ABI: {}", e)))?;

		let bytecode_str = match value.get("bytecode") {
			Some(Value::String(code)) => Some(code.as_str()),
			Some(Value::Object(object)) => object.get("object").and_then(Value::as_str),
			_ => None,
		};

		let bytecode = match bytecode_str.map(strip_hex_prefix) {
			Some(code) if !code.is_empty() => Some(Bytes::from(hex::decode(code).map_err(
				|e| AbiError::Artifact(format!("Invalid bytecode: {}", e)),
			)?)),
			_ => None,
		};

		Ok(Self {
			contract_name: value
				.get("contractName")
				.and_then(Value::as_str)
				.map(str::to_string),
			abi,
			bytecode,
		})
	}

	/// Reads and parses an artifact file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, AbiError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path)
			.map_err(|e| AbiError::Artifact(format!("Cannot read {}: {}", path.display(), e)))?;
		Self::from_json(&content)
	}

	/// Returns the declared constructor, if any.
	pub fn constructor(&self) -> Option<&Constructor> {
		self.abi.constructor()
	}
}

/// Encoder and decoder backed by a contract's JSON ABI.
///
/// A codec without an address can only encode deployments; use
/// [`JsonAbiCodec::for_instance`] to bind it to a deployed contract.
#[derive(Debug, Clone)]
pub struct JsonAbiCodec {
	abi: Arc<JsonAbi>,
	bytecode: Option<Bytes>,
	address: Option<Address>,
}

impl JsonAbiCodec {
	pub fn new(abi: JsonAbi) -> Self {
		Self {
			abi: Arc::new(abi),
			bytecode: None,
			address: None,
		}
	}

	pub fn from_artifact(artifact: &ContractArtifact) -> Self {
		Self {
			abi: Arc::new(artifact.abi.clone()),
			bytecode: artifact.bytecode.clone(),
			address: None,
		}
	}

	pub fn with_bytecode(mut self, bytecode: Bytes) -> Self {
		self.bytecode = Some(bytecode);
		self
	}

	/// Returns a codec bound to a deployed instance of this contract.
	pub fn for_instance(&self, address: Address) -> Self {
		Self {
			abi: Arc::clone(&self.abi),
			bytecode: self.bytecode.clone(),
			address: Some(address),
		}
	}

	pub fn abi(&self) -> &JsonAbi {
		&self.abi
	}

	pub fn address(&self) -> Option<Address> {
		self.address
	}

	/// Finds the candidate entries for a target.
	fn candidates(&self, target: &FunctionTarget) -> Result<Vec<Function>, AbiError> {
		let candidates: Vec<Function> = match target {
			FunctionTarget::Name(name) if name.contains('(') => self
				.abi
				.functions()
				.filter(|function| function.signature() == *name)
				.cloned()
				.collect(),
			FunctionTarget::Name(name) => self.abi.function(name).cloned().unwrap_or_default(),
			FunctionTarget::Abis(entries) => entries.clone(),
		};

		if candidates.is_empty() {
			return Err(AbiError::UnknownFunction(target.label()));
		}
		Ok(candidates)
	}

	/// Picks the overload accepting `inputs` and coerces them.
	fn resolve(
		&self,
		target: &FunctionTarget,
		inputs: &[Value],
	) -> Result<(Function, Vec<DynSolValue>), AbiError> {
		let candidates = self.candidates(target)?;

		let same_arity: Vec<&Function> = candidates
			.iter()
			.filter(|function| function.inputs.len() == inputs.len())
			.collect();

		match same_arity.as_slice() {
			[] => Err(AbiError::ArgumentCount {
				expected: candidates[0].inputs.len(),
				found: inputs.len(),
			}),
			[function] => {
				let values = coerce_inputs(&function.inputs, inputs)?;
				Ok(((*function).clone(), values))
			}
			overloads => overloads
				.iter()
				.find_map(|function| {
					coerce_inputs(&function.inputs, inputs)
						.ok()
						.map(|values| ((*function).clone(), values))
				})
				.ok_or_else(|| AbiError::NoMatchingOverload(target.label())),
		}
	}

	/// Interprets data as revert data of a known error.
	fn decode_revert(&self, data: &[u8]) -> Option<ReturndataDecoding> {
		if data.len() < 4 {
			return None;
		}

		if let Ok(revert) = Revert::abi_decode(data, true) {
			return Some(ReturndataDecoding::Revert {
				name: "Error".to_string(),
				arguments: vec![AbiArgument::new(
					Some("message".to_string()),
					ArgumentValue::Value(DynSolValue::String(revert.reason)),
				)],
			});
		}

		if let Ok(panic) = Panic::abi_decode(data, true) {
			return Some(ReturndataDecoding::Revert {
				name: "Panic".to_string(),
				arguments: vec![AbiArgument::new(
					Some("code".to_string()),
					ArgumentValue::Value(DynSolValue::Uint(panic.code, 256)),
				)],
			});
		}

		self.abi
			.errors()
			.filter(|error| error.selector().as_slice() == &data[..4])
			.find_map(|error| {
				let types = resolve_types(&error.inputs).ok()?;
				let decoded = DynSolType::Tuple(types.clone())
					.abi_decode_params(&data[4..])
					.ok()?;
				let values = match decoded {
					DynSolValue::Tuple(values) => values,
					other => vec![other],
				};
				Some(ReturndataDecoding::Revert {
					name: error.name.clone(),
					arguments: to_arguments(&error.inputs, values, &types, &data[4..]),
				})
			})
	}
}

/// Resolves the Solidity types of a parameter list.
fn resolve_types(params: &[Param]) -> Result<Vec<DynSolType>, AbiError> {
	params
		.iter()
		.map(|param| {
			param
				.resolve()
				.map_err(|e| AbiError::Encoding(format!("Unsupported type {}: {}", param.ty, e)))
		})
		.collect()
}

/// Coerces JSON inputs to the declared parameter types.
fn coerce_inputs(params: &[Param], inputs: &[Value]) -> Result<Vec<DynSolValue>, AbiError> {
	if params.len() != inputs.len() {
		return Err(AbiError::ArgumentCount {
			expected: params.len(),
			found: inputs.len(),
		});
	}

	let types = resolve_types(params)?;
	types
		.iter()
		.zip(inputs)
		.enumerate()
		.map(|(index, (ty, input))| {
			coerce_value(ty, input).map_err(|reason| AbiError::InvalidInput { index, reason })
		})
		.collect()
}

/// Coerces a single JSON value, recursing into arrays and tuples.
fn coerce_value(ty: &DynSolType, input: &Value) -> Result<DynSolValue, String> {
	match (ty, input) {
		(_, Value::String(text)) => ty.coerce_str(text).map_err(|e| e.to_string()),
		(_, Value::Bool(flag)) => ty
			.coerce_str(if *flag { "true" } else { "false" })
			.map_err(|e| e.to_string()),
		(_, Value::Number(number)) => ty.coerce_str(&number.to_string()).map_err(|e| e.to_string()),
		(DynSolType::Array(inner), Value::Array(items)) => items
			.iter()
			.map(|item| coerce_value(inner, item))
			.collect::<Result<Vec<_>, _>>()
			.map(DynSolValue::Array),
		(DynSolType::FixedArray(inner, len), Value::Array(items)) => {
			if items.len() != *len {
				return Err(format!("expected {} elements but found {}", len, items.len()));
			}
			items
				.iter()
				.map(|item| coerce_value(inner, item))
				.collect::<Result<Vec<_>, _>>()
				.map(DynSolValue::FixedArray)
		}
		(DynSolType::Tuple(types), Value::Array(items)) => {
			if items.len() != types.len() {
				return Err(format!(
					"expected {} tuple members but found {}",
					types.len(),
					items.len()
				));
			}
			types
				.iter()
				.zip(items)
				.map(|(ty, item)| coerce_value(ty, item))
				.collect::<Result<Vec<_>, _>>()
				.map(DynSolValue::Tuple)
		}
		_ => Err(format!("cannot coerce {} to {}", input, ty.sol_type_name())),
	}
}

/// Pairs decoded values with their parameter names.
///
/// `encoded` is the data the values were decoded from, without any selector.
/// Values whose encoding is not canonical for their declared type, or whose
/// decoded value does not fit it, are replaced with an
/// [`ArgumentValue::Error`] placeholder.
fn to_arguments(
	params: &[Param],
	values: Vec<DynSolValue>,
	types: &[DynSolType],
	encoded: &[u8],
) -> Vec<AbiArgument> {
	let mut offset = 0;

	values
		.into_iter()
		.enumerate()
		.map(|(index, value)| {
			let name = params
				.get(index)
				.map(|param| param.name.clone())
				.filter(|name| !name.is_empty());

			let flaw = types.get(index).and_then(|ty| {
				let word = encoded.get(offset..offset + 32);
				offset += head_words(ty) * 32;
				word.and_then(|word| non_canonical(ty, word))
					.or_else(|| out_of_range(ty, &value))
			});

			let value = match flaw {
				Some(reason) => ArgumentValue::Error(reason),
				None => ArgumentValue::Value(value),
			};
			AbiArgument::new(name, value)
		})
		.collect()
}

/// Number of head words a value of `ty` occupies in a parameter list.
fn head_words(ty: &DynSolType) -> usize {
	if is_dynamic(ty) {
		return 1;
	}
	match ty {
		DynSolType::Tuple(types) => types.iter().map(head_words).sum(),
		DynSolType::FixedArray(inner, len) => head_words(inner) * len,
		_ => 1,
	}
}

/// Whether `ty` is dynamically sized (`DynSolType` has no `is_dynamic` in
/// alloy-dyn-abi 0.8; mirrors `DynSolValue::is_dynamic`).
fn is_dynamic(ty: &DynSolType) -> bool {
	match ty {
		DynSolType::Bytes | DynSolType::String | DynSolType::Array(_) => true,
		DynSolType::FixedArray(inner, _) => is_dynamic(inner),
		_ => ty.as_tuple().is_some_and(|types| types.iter().any(is_dynamic)),
	}
}

/// Checks the padding of a single-word value, which decoding discards.
fn non_canonical(ty: &DynSolType, word: &[u8]) -> Option<String> {
	let dirty = match ty {
		DynSolType::Bool => word[..31].iter().any(|b| *b != 0) || word[31] > 1,
		DynSolType::Address => word[..12].iter().any(|b| *b != 0),
		DynSolType::Uint(bits) => word[..32 - bits / 8].iter().any(|b| *b != 0),
		DynSolType::Int(bits) => {
			let split = 32 - bits / 8;
			let fill = if word[split] & 0x80 != 0 { 0xff } else { 0x00 };
			word[..split].iter().any(|b| *b != fill)
		}
		DynSolType::FixedBytes(size) => word[*size..].iter().any(|b| *b != 0),
		_ => false,
	};

	dirty.then(|| {
		format!(
			"non-canonical encoding 0x{} for {}",
			hex::encode(word),
			ty.sol_type_name()
		)
	})
}

/// Reports decoded values that do not fit the declared type.
fn out_of_range(ty: &DynSolType, value: &DynSolValue) -> Option<String> {
	match (ty, value) {
		(DynSolType::Uint(bits), DynSolValue::Uint(number, _))
			if *bits < 256 && number.bit_len() > *bits =>
		{
			Some(format!("value {} out of range for uint{}", number, bits))
		}
		_ if !ty.matches(value) => Some(format!(
			"value does not match type {}",
			ty.sol_type_name()
		)),
		_ => None,
	}
}

#[async_trait]
impl EncoderInterface for JsonAbiCodec {
	async fn encode_transaction(
		&self,
		target: &FunctionTarget,
		inputs: &[Value],
	) -> Result<EncodedTransaction, AbiError> {
		let address = self.address.ok_or(AbiError::MissingAddress)?;
		let (function, values) = self.resolve(target, inputs)?;

		let data = function
			.abi_encode_input(&values)
			.map_err(|e| AbiError::Encoding(e.to_string()))?;

		tracing::trace!(function = %function.signature(), "Encoded transaction");

		Ok(EncodedTransaction {
			tx: Transaction {
				to: Some(address),
				data: data.into(),
				..Default::default()
			},
			abi: function,
		})
	}

	async fn encode_constructor(
		&self,
		constructor: Option<&Constructor>,
		inputs: &[Value],
	) -> Result<Transaction, AbiError> {
		let bytecode = self.bytecode.as_ref().ok_or(AbiError::MissingBytecode)?;

		let arguments = match constructor {
			Some(constructor) => {
				let values = coerce_inputs(&constructor.inputs, inputs)?;
				constructor
					.abi_encode_input(&values)
					.map_err(|e| AbiError::Encoding(e.to_string()))?
			}
			None if inputs.is_empty() => Vec::new(),
			None => {
				return Err(AbiError::ArgumentCount {
					expected: 0,
					found: inputs.len(),
				})
			}
		};

		let mut data = bytecode.to_vec();
		data.extend_from_slice(&arguments);

		Ok(Transaction {
			to: None,
			data: data.into(),
			..Default::default()
		})
	}
}

#[async_trait]
impl DecoderInterface for JsonAbiCodec {
	async fn decode_return_value(
		&self,
		abi: &Function,
		data: &Bytes,
	) -> Result<Vec<ReturndataDecoding>, AbiError> {
		let mut decodings = Vec::new();

		// Return data is a whole number of words; error data is a selector
		// followed by words.
		if data.len() % 32 == 0 {
			if let Ok(values) = abi.abi_decode_output(data, false) {
				let types = resolve_types(&abi.outputs)?;
				decodings.push(ReturndataDecoding::Return {
					arguments: to_arguments(&abi.outputs, values, &types, data),
				});
			}
		} else if let Some(revert) = self.decode_revert(data) {
			decodings.push(revert);
		}

		if decodings.is_empty() {
			decodings.push(ReturndataDecoding::Failure { data: data.clone() });
		}

		Ok(decodings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, I256, U256};
	use serde_json::json;
	use txflow_types::DecodingKind;

	const TOKEN: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");

	const ARTIFACT: &str = r#"{
		"contractName": "Token",
		"abi": [
			{ "type": "constructor", "stateMutability": "nonpayable",
			  "inputs": [{ "name": "supply", "type": "uint256" }] },
			{ "type": "function", "name": "balanceOf", "stateMutability": "view",
			  "inputs": [{ "name": "owner", "type": "address" }],
			  "outputs": [{ "name": "", "type": "uint256" }] },
			{ "type": "function", "name": "transfer", "stateMutability": "nonpayable",
			  "inputs": [{ "name": "to", "type": "address" }, { "name": "amount", "type": "uint256" }],
			  "outputs": [{ "name": "ok", "type": "bool" }] },
			{ "type": "function", "name": "mint", "stateMutability": "nonpayable",
			  "inputs": [{ "name": "amount", "type": "uint256" }], "outputs": [] },
			{ "type": "function", "name": "mint", "stateMutability": "nonpayable",
			  "inputs": [{ "name": "flag", "type": "bool" }], "outputs": [] },
			{ "type": "error", "name": "Insufficient",
			  "inputs": [{ "name": "needed", "type": "uint256" }] }
		],
		"bytecode": "0x6080604052"
	}"#;

	fn codec() -> JsonAbiCodec {
		let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
		JsonAbiCodec::from_artifact(&artifact).for_instance(TOKEN)
	}

	#[test]
	fn test_artifact_formats() {
		let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
		assert_eq!(artifact.contract_name.as_deref(), Some("Token"));
		assert!(artifact.constructor().is_some());
		assert_eq!(
			artifact.bytecode.map(|code| code.to_vec()),
			Some(vec![0x60, 0x80, 0x60, 0x40, 0x52])
		);

		let foundry = r#"{ "abi": [], "bytecode": { "object": "0x00" } }"#;
		let artifact = ContractArtifact::from_json(foundry).unwrap();
		assert_eq!(artifact.bytecode.map(|code| code.to_vec()), Some(vec![0x00]));

		let bare = ContractArtifact::from_json("[]").unwrap();
		assert!(bare.bytecode.is_none());

		assert!(matches!(
			ContractArtifact::from_json(r#"{ "bytecode": "0x" }"#),
			Err(AbiError::Artifact(_))
		));
	}

	#[test]
	fn test_load_artifact_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("Token.json");
		std::fs::write(&path, ARTIFACT).unwrap();

		let artifact = ContractArtifact::load(&path).unwrap();
		assert_eq!(artifact.abi.functions().count(), 4);

		assert!(ContractArtifact::load(dir.path().join("missing.json")).is_err());
	}

	#[tokio::test]
	async fn test_encode_by_name_and_signature() {
		let codec = codec();
		let owner = json!("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

		let by_name = codec
			.encode_transaction(&"balanceOf".into(), &[owner.clone()])
			.await
			.unwrap();
		let by_signature = codec
			.encode_transaction(&"balanceOf(address)".into(), &[owner])
			.await
			.unwrap();

		assert_eq!(by_name.tx.to, Some(TOKEN));
		assert_eq!(by_name.tx, by_signature.tx);
		assert_eq!(&by_name.tx.data[..4], by_name.abi.selector().as_slice());
		assert_eq!(by_name.tx.data.len(), 4 + 32);
	}

	#[tokio::test]
	async fn test_overloads_resolved_by_coercion() {
		let codec = codec();

		let with_bool = codec
			.encode_transaction(&"mint".into(), &[json!(true)])
			.await
			.unwrap();
		assert_eq!(with_bool.abi.signature(), "mint(bool)");

		let with_amount = codec
			.encode_transaction(&"mint".into(), &[json!(1000)])
			.await
			.unwrap();
		assert_eq!(with_amount.abi.signature(), "mint(uint256)");
	}

	#[tokio::test]
	async fn test_encoding_errors() {
		let codec = codec();

		assert!(matches!(
			codec.encode_transaction(&"burn".into(), &[]).await,
			Err(AbiError::UnknownFunction(name)) if name == "burn"
		));
		assert!(matches!(
			codec.encode_transaction(&"transfer".into(), &[json!("0x00")]).await,
			Err(AbiError::ArgumentCount { expected: 2, found: 1 })
		));
		assert!(matches!(
			codec
				.encode_transaction(&"transfer".into(), &[json!("not an address"), json!(1)])
				.await,
			Err(AbiError::InvalidInput { index: 0, .. })
		));

		let unbound = JsonAbiCodec::from_artifact(&ContractArtifact::from_json(ARTIFACT).unwrap());
		assert!(matches!(
			unbound.encode_transaction(&"mint".into(), &[json!(1)]).await,
			Err(AbiError::MissingAddress)
		));
	}

	#[tokio::test]
	async fn test_encode_constructor() {
		let artifact = ContractArtifact::from_json(ARTIFACT).unwrap();
		let codec = JsonAbiCodec::from_artifact(&artifact);

		let tx = codec
			.encode_constructor(artifact.constructor(), &[json!("1000")])
			.await
			.unwrap();
		assert!(tx.is_deployment());
		assert_eq!(tx.data.len(), 5 + 32);
		assert_eq!(&tx.data[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);
		assert_eq!(U256::from_be_slice(&tx.data[5..]), U256::from(1000));

		// Without a declared constructor only the bytecode is sent
		let tx = codec.encode_constructor(None, &[]).await.unwrap();
		assert_eq!(tx.data.len(), 5);
		assert!(matches!(
			codec.encode_constructor(None, &[json!(1)]).await,
			Err(AbiError::ArgumentCount { expected: 0, found: 1 })
		));

		let no_code = JsonAbiCodec::new(JsonAbi::default());
		assert!(matches!(
			no_code.encode_constructor(None, &[]).await,
			Err(AbiError::MissingBytecode)
		));
	}

	#[tokio::test]
	async fn test_decode_return_and_reverts() {
		let codec = codec();
		let balance_of = codec.abi().function("balanceOf").unwrap()[0].clone();

		let data = Bytes::from(U256::from(42).to_be_bytes::<32>().to_vec());
		let decodings = codec.decode_return_value(&balance_of, &data).await.unwrap();
		assert_eq!(decodings[0].kind(), DecodingKind::Return);
		assert_eq!(
			decodings[0].arguments()[0].value,
			ArgumentValue::Value(DynSolValue::Uint(U256::from(42), 256))
		);

		let revert = Revert {
			reason: "fail!".to_string(),
		}
		.abi_encode();
		let decodings = codec
			.decode_return_value(&balance_of, &revert.into())
			.await
			.unwrap();
		assert_eq!(decodings[0].kind(), DecodingKind::Revert);
		assert_eq!(decodings[0].revert_reason(), Some("fail!"));

		let garbage = Bytes::from_static(&[0xff, 0xff]);
		let decodings = codec.decode_return_value(&balance_of, &garbage).await.unwrap();
		assert_eq!(decodings, vec![ReturndataDecoding::Failure { data: garbage }]);
	}

	#[tokio::test]
	async fn test_decode_custom_error() {
		let codec = codec();
		let transfer = codec.abi().function("transfer").unwrap()[0].clone();
		let error = codec.abi().errors().next().unwrap().clone();

		let mut data = error.selector().to_vec();
		data.extend_from_slice(&U256::from(7).to_be_bytes::<32>());

		let decodings = codec
			.decode_return_value(&transfer, &data.into())
			.await
			.unwrap();

		match &decodings[0] {
			ReturndataDecoding::Revert { name, arguments } => {
				assert_eq!(name, "Insufficient");
				assert_eq!(arguments[0].name.as_deref(), Some("needed"));
			}
			other => panic!("unexpected decoding {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_decode_flags_non_canonical_words() {
		let abi: JsonAbi = serde_json::from_value(json!([
			{ "type": "function", "name": "limits", "stateMutability": "view", "inputs": [],
			  "outputs": [
				{ "name": "decimals", "type": "uint8" },
				{ "name": "paused", "type": "bool" },
				{ "name": "offset", "type": "int8" },
				{ "name": "owner", "type": "address" }
			  ] }
		]))
		.unwrap();
		let codec = JsonAbiCodec::new(abi);
		let limits = codec.abi().function("limits").unwrap()[0].clone();

		let mut data = Vec::new();
		data.extend_from_slice(&U256::from(500).to_be_bytes::<32>());
		data.extend_from_slice(&U256::from(2).to_be_bytes::<32>());
		data.extend_from_slice(&[0xff; 32]);
		data.extend_from_slice(TOKEN.into_word().as_slice());

		let decodings = codec.decode_return_value(&limits, &data.into()).await.unwrap();
		assert_eq!(decodings[0].kind(), DecodingKind::Return);

		let arguments = decodings[0].arguments();
		assert_eq!(arguments.len(), 4);
		assert!(matches!(arguments[0].value, ArgumentValue::Error(_)));
		assert!(matches!(arguments[1].value, ArgumentValue::Error(_)));
		assert_eq!(
			arguments[2].value,
			ArgumentValue::Value(DynSolValue::Int(I256::MINUS_ONE, 8))
		);
		assert_eq!(
			arguments[3].value,
			ArgumentValue::Value(DynSolValue::Address(TOKEN))
		);
	}
}
