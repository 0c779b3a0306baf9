//! Typed validation of decoded return values.
//!
//! Callers describe the return values they expect as a list of
//! [`ArgumentSchema`]s, one per value. Each schema pairs a guard, deciding
//! whether a decoded value is acceptable, with a transform turning it into the
//! caller's type. Schemas come either as a homogeneous `Vec` or as a tuple of
//! up to eight schemas with independent output types.
//!
//! Every check runs before any transform, so a rejected result never yields
//! partially converted values.

use crate::ValidationError;
use txflow_types::{
	Address, ArgumentValue, Bytes, DynSolValue, ReturndataDecoding, U256,
};

type Guard = Box<dyn Fn(&DynSolValue) -> bool + Send + Sync>;
type Transform<R> = Box<dyn FnOnce(DynSolValue) -> R + Send>;

/// Expected shape of one decoded return value.
pub struct ArgumentSchema<R> {
	guard: Guard,
	transform: Transform<R>,
}

impl<R: 'static> ArgumentSchema<R> {
	pub fn new<G, T>(guard: G, transform: T) -> Self
	where
		G: Fn(&DynSolValue) -> bool + Send + Sync + 'static,
		T: FnOnce(DynSolValue) -> R + Send + 'static,
	{
		Self {
			guard: Box::new(guard),
			transform: Box::new(transform),
		}
	}

	pub fn accepts(&self, value: &DynSolValue) -> bool {
		(self.guard)(value)
	}

	pub fn apply(self, value: DynSolValue) -> R {
		(self.transform)(value)
	}

	/// Adds a further condition the value must satisfy.
	pub fn and<G>(self, condition: G) -> Self
	where
		G: Fn(&DynSolValue) -> bool + Send + Sync + 'static,
	{
		let guard = self.guard;
		Self {
			guard: Box::new(move |value| guard(value) && condition(value)),
			transform: self.transform,
		}
	}

	/// Chains a conversion after the schema's transform.
	pub fn map<S, F>(self, f: F) -> ArgumentSchema<S>
	where
		F: FnOnce(R) -> S + Send + 'static,
		S: 'static,
	{
		let transform = self.transform;
		ArgumentSchema {
			guard: self.guard,
			transform: Box::new(move |value| f(transform(value))),
		}
	}
}

impl ArgumentSchema<DynSolValue> {
	/// Accepts any value and returns it unchanged.
	pub fn any() -> Self {
		Self::new(|_| true, |value| value)
	}
}

impl ArgumentSchema<U256> {
	/// Accepts unsigned integers of any width.
	pub fn uint() -> Self {
		Self::new(
			|value| matches!(value, DynSolValue::Uint(..)),
			|value| value.as_uint().map(|(n, _)| n).unwrap_or_default(),
		)
	}
}

impl ArgumentSchema<Address> {
	pub fn address() -> Self {
		Self::new(
			|value| matches!(value, DynSolValue::Address(_)),
			|value| value.as_address().unwrap_or_default(),
		)
	}
}

impl ArgumentSchema<bool> {
	pub fn boolean() -> Self {
		Self::new(
			|value| matches!(value, DynSolValue::Bool(_)),
			|value| value.as_bool().unwrap_or_default(),
		)
	}
}

impl ArgumentSchema<String> {
	pub fn string() -> Self {
		Self::new(
			|value| matches!(value, DynSolValue::String(_)),
			|value| match value {
				DynSolValue::String(s) => s,
				_ => String::new(),
			},
		)
	}
}

impl ArgumentSchema<Bytes> {
	/// Accepts dynamic `bytes` values.
	pub fn bytes() -> Self {
		Self::new(
			|value| matches!(value, DynSolValue::Bytes(_)),
			|value| match value {
				DynSolValue::Bytes(b) => Bytes::from(b),
				_ => Bytes::new(),
			},
		)
	}
}

/// An ordered list of schemas, positionally aligned with decoded values.
pub trait Schemas {
	type Output;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Runs the guard at `index` against `value`.
	fn accepts(&self, index: usize, value: &DynSolValue) -> bool;

	/// Applies every transform. `values` holds exactly `len()` guarded values.
	fn transform(self, values: Vec<DynSolValue>) -> Result<Self::Output, ValidationError>;
}

impl<R: 'static> Schemas for Vec<ArgumentSchema<R>> {
	type Output = Vec<R>;

	fn len(&self) -> usize {
		Vec::len(self)
	}

	fn accepts(&self, index: usize, value: &DynSolValue) -> bool {
		self.get(index).is_some_and(|schema| schema.accepts(value))
	}

	fn transform(self, values: Vec<DynSolValue>) -> Result<Self::Output, ValidationError> {
		if values.len() != Vec::len(&self) {
			return Err(ValidationError::ArgumentCount {
				found: values.len(),
				expected: Vec::len(&self),
			});
		}

		Ok(self
			.into_iter()
			.zip(values)
			.map(|(schema, value)| schema.apply(value))
			.collect())
	}
}

macro_rules! tuple_schemas {
	($len:literal => $($ty:ident $idx:tt),+) => {
		impl<$($ty: 'static),+> Schemas for ($(ArgumentSchema<$ty>,)+) {
			type Output = ($($ty,)+);

			fn len(&self) -> usize {
				$len
			}

			fn accepts(&self, index: usize, value: &DynSolValue) -> bool {
				match index {
					$($idx => self.$idx.accepts(value),)+
					_ => false,
				}
			}

			fn transform(self, values: Vec<DynSolValue>) -> Result<Self::Output, ValidationError> {
				let found = values.len();
				if found != $len {
					return Err(ValidationError::ArgumentCount { found, expected: $len });
				}

				let mut values = values.into_iter();
				Ok(($(
					self.$idx.apply(values.next().ok_or(ValidationError::ArgumentCount {
						found,
						expected: $len,
					})?),
				)+))
			}
		}
	};
}

tuple_schemas!(1 => A 0);
tuple_schemas!(2 => A 0, B 1);
tuple_schemas!(3 => A 0, B 1, C 2);
tuple_schemas!(4 => A 0, B 1, C 2, D 3);
tuple_schemas!(5 => A 0, B 1, C 2, D 3, E 4);
tuple_schemas!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
tuple_schemas!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
tuple_schemas!(8 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

/// Checks the authoritative decoding against `schemas` and transforms it.
///
/// Only the first decoding is considered. Checks run in order and the first
/// failing one is returned: decoding present, kind is `Return`, value count
/// matches, then per value in order a concrete value accepted by its guard.
/// Transforms run only once every check has passed.
pub fn validate_arguments<S: Schemas>(
	decodings: Vec<ReturndataDecoding>,
	schemas: S,
) -> Result<S::Output, ValidationError> {
	let decoding = decodings
		.into_iter()
		.next()
		.ok_or(ValidationError::NoDecodings)?;

	let arguments = match decoding {
		ReturndataDecoding::Return { arguments } => arguments,
		other => return Err(ValidationError::UnexpectedKind(other.kind())),
	};

	if arguments.len() != schemas.len() {
		return Err(ValidationError::ArgumentCount {
			found: arguments.len(),
			expected: schemas.len(),
		});
	}

	let mut values = Vec::with_capacity(arguments.len());
	for (index, argument) in arguments.into_iter().enumerate() {
		let value = match argument.value {
			ArgumentValue::Value(value) => value,
			ArgumentValue::Error(reason) => {
				return Err(ValidationError::ArgumentDecoding { index, reason })
			}
		};

		if !schemas.accepts(index, &value) {
			return Err(ValidationError::GuardRejected { index });
		}
		values.push(value);
	}

	schemas.transform(values)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;
	use txflow_types::{AbiArgument, DecodingKind};

	fn returned(values: Vec<ArgumentValue>) -> Vec<ReturndataDecoding> {
		vec![ReturndataDecoding::Return {
			arguments: values
				.into_iter()
				.map(|value| AbiArgument::new(None, value))
				.collect(),
		}]
	}

	fn uint(n: u64) -> ArgumentValue {
		ArgumentValue::Value(DynSolValue::Uint(U256::from(n), 256))
	}

	fn counting(counter: &Arc<AtomicUsize>) -> ArgumentSchema<U256> {
		let counter = Arc::clone(counter);
		ArgumentSchema::uint().map(move |n| {
			counter.fetch_add(1, Ordering::SeqCst);
			n
		})
	}

	#[test]
	fn test_tuple_schemas_transform_in_order() {
		let owner = Address::with_last_byte(9);
		let decodings = returned(vec![
			uint(42),
			ArgumentValue::Value(DynSolValue::Address(owner)),
			ArgumentValue::Value(DynSolValue::String("token".into())),
		]);

		let (amount, address, name) = validate_arguments(
			decodings,
			(
				ArgumentSchema::uint(),
				ArgumentSchema::address(),
				ArgumentSchema::string(),
			),
		)
		.unwrap();

		assert_eq!(amount, U256::from(42));
		assert_eq!(address, owner);
		assert_eq!(name, "token");
	}

	#[test]
	fn test_vec_schemas() {
		let decodings = returned(vec![uint(1), uint(2), uint(3)]);
		let schemas = vec![
			ArgumentSchema::uint().map(|n| n.to::<u64>()),
			ArgumentSchema::uint().map(|n| n.to::<u64>()),
			ArgumentSchema::uint().map(|n| n.to::<u64>()),
		];

		assert_eq!(validate_arguments(decodings, schemas).unwrap(), vec![1, 2, 3]);
	}

	#[test]
	fn test_count_mismatch() {
		let decodings = returned(vec![uint(1), uint(2), uint(3)]);

		let result = validate_arguments(decodings, (ArgumentSchema::uint(), ArgumentSchema::uint()));

		assert_eq!(
			result.unwrap_err(),
			ValidationError::ArgumentCount {
				found: 3,
				expected: 2
			}
		);
	}

	#[test]
	fn test_guard_rejection_skips_all_transforms() {
		let transforms = Arc::new(AtomicUsize::new(0));
		let decodings = returned(vec![uint(1), uint(500), uint(3)]);
		let schemas = vec![
			counting(&transforms),
			counting(&transforms).and(|value| {
				value.as_uint().is_some_and(|(n, _)| n < U256::from(100))
			}),
			counting(&transforms),
		];

		let result = validate_arguments(decodings, schemas);

		assert_eq!(result.unwrap_err(), ValidationError::GuardRejected { index: 1 });
		assert_eq!(transforms.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_indeterminate_value() {
		let decodings = returned(vec![
			uint(1),
			ArgumentValue::Error("value out of range for uint8".into()),
		]);

		let result = validate_arguments(decodings, (ArgumentSchema::uint(), ArgumentSchema::uint()));

		assert!(matches!(
			result,
			Err(ValidationError::ArgumentDecoding { index: 1, ref reason }) if reason.contains("uint8")
		));
	}

	#[test]
	fn test_kind_and_presence_checks() {
		let revert = vec![ReturndataDecoding::Revert {
			name: "Error".into(),
			arguments: vec![],
		}];
		assert_eq!(
			validate_arguments(revert, vec![ArgumentSchema::any()]).unwrap_err(),
			ValidationError::UnexpectedKind(DecodingKind::Revert)
		);

		assert_eq!(
			validate_arguments(Vec::new(), vec![ArgumentSchema::any()]).unwrap_err(),
			ValidationError::NoDecodings
		);
	}

	#[test]
	fn test_only_first_decoding_counts() {
		let mut decodings = vec![ReturndataDecoding::Failure { data: Bytes::new() }];
		decodings.extend(returned(vec![uint(1)]));

		assert_eq!(
			validate_arguments(decodings, (ArgumentSchema::uint(),)).unwrap_err(),
			ValidationError::UnexpectedKind(DecodingKind::Failure)
		);
	}
}
