//! Read-only contract calls.

use crate::stage::{Stage, StageGraph};
use crate::validate::{validate_arguments, Schemas};
use crate::PipelineError;
use std::sync::Arc;
use tracing::instrument;
use txflow_abi::{DecoderInterface, EncodedTransaction, EncoderInterface, FunctionTarget};
use txflow_provider::ProviderInterface;
use txflow_types::{Bytes, ReturndataDecoding, TxOptions};

/// Creates call pipelines against a shared provider, encoder and decoder.
#[derive(Clone)]
pub struct CallFactory {
	provider: Arc<dyn ProviderInterface>,
	encoder: Arc<dyn EncoderInterface>,
	decoder: Arc<dyn DecoderInterface>,
}

impl CallFactory {
	pub fn new(
		provider: Arc<dyn ProviderInterface>,
		encoder: Arc<dyn EncoderInterface>,
		decoder: Arc<dyn DecoderInterface>,
	) -> Self {
		Self {
			provider,
			encoder,
			decoder,
		}
	}

	/// Starts a read-only call of `target` with `inputs`.
	///
	/// Fields set in `options` override the encoded transaction, including
	/// the recipient.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime, since every stage is
	/// spawned immediately.
	#[instrument(skip_all)]
	pub fn call(
		&self,
		target: impl Into<FunctionTarget>,
		inputs: Vec<serde_json::Value>,
		options: TxOptions,
	) -> CallPipeline {
		let target = target.into();
		tracing::debug!(function = %target.label(), inputs = inputs.len(), "Starting call");

		let mut graph = StageGraph::new(format!("call:{}", target.label()));

		let encode = graph.root(
			"encode",
			encode_call(Arc::clone(&self.encoder), target, inputs, options),
		);

		let provider = Arc::clone(&self.provider);
		let execute = graph.then("execute", &encode, move |encoded| {
			execute_call(provider, encoded)
		});

		let decoder = Arc::clone(&self.decoder);
		let decode = graph.join("decode", &encode, &execute, move |encoded, data| {
			decode_output(decoder, encoded, data)
		});

		CallPipeline {
			graph,
			encode,
			execute,
			decode,
		}
	}
}

/// A running read-only call.
///
/// Dropping the pipeline cancels any stage that has not finished.
#[derive(Debug)]
pub struct CallPipeline {
	graph: StageGraph,
	encode: Stage<EncodedTransaction>,
	execute: Stage<Bytes>,
	decode: Stage<Vec<ReturndataDecoding>>,
}

impl CallPipeline {
	/// Returns every candidate decoding of the return data, most likely first.
	pub async fn decode(&self) -> Result<Vec<ReturndataDecoding>, PipelineError> {
		self.decode.get().await
	}

	/// Validates the authoritative decoding against `schemas` and returns
	/// the transformed values.
	pub async fn decode_arguments<S: Schemas>(
		&self,
		schemas: S,
	) -> Result<S::Output, PipelineError> {
		let decodings = self.decode.get().await?;
		Ok(validate_arguments(decodings, schemas)?)
	}

	/// Returns the transaction that was executed.
	pub async fn transaction(&self) -> Result<EncodedTransaction, PipelineError> {
		self.encode.get().await
	}

	/// Returns the raw data returned by the provider.
	pub async fn return_data(&self) -> Result<Bytes, PipelineError> {
		self.execute.get().await
	}

	pub fn cancel(&self) {
		self.graph.cancel();
	}

	pub fn graph(&self) -> &StageGraph {
		&self.graph
	}
}

/// Encodes a function invocation and merges the caller's options over it.
pub(crate) async fn encode_call(
	encoder: Arc<dyn EncoderInterface>,
	target: FunctionTarget,
	inputs: Vec<serde_json::Value>,
	options: TxOptions,
) -> Result<EncodedTransaction, PipelineError> {
	let encoded = encoder.encode_transaction(&target, &inputs).await?;

	Ok(EncodedTransaction {
		tx: options.apply(encoded.tx),
		abi: encoded.abi,
	})
}

async fn execute_call(
	provider: Arc<dyn ProviderInterface>,
	encoded: EncodedTransaction,
) -> Result<Bytes, PipelineError> {
	Ok(provider.call(&encoded.tx).await?)
}

async fn decode_output(
	decoder: Arc<dyn DecoderInterface>,
	encoded: EncodedTransaction,
	data: Bytes,
) -> Result<Vec<ReturndataDecoding>, PipelineError> {
	decoder
		.decode_return_value(&encoded.abi, &data)
		.await
		.map_err(PipelineError::Decoding)
}
