//! Contract deployments.

use crate::estimate::{GasEstimate, GasEstimator};
use crate::receipt::{ReceiptPoller, ReceiptPolicy};
use crate::send::Submission;
use crate::stage::{Stage, StageGraph};
use crate::PipelineError;
use alloy_json_abi::Constructor;
use std::convert::identity;
use std::sync::Arc;
use tracing::instrument;
use txflow_abi::EncoderInterface;
use txflow_provider::ProviderInterface;
use txflow_types::{Address, Transaction, TransactionReceipt, TxHash, TxOptions};

/// Creates deployment pipelines for one contract.
#[derive(Clone)]
pub struct CreateFactory {
	provider: Arc<dyn ProviderInterface>,
	encoder: Arc<dyn EncoderInterface>,
	/// `None` when the contract declares no constructor.
	constructor: Option<Constructor>,
	estimator: GasEstimator,
	poller: ReceiptPoller,
}

impl CreateFactory {
	pub fn new(
		provider: Arc<dyn ProviderInterface>,
		encoder: Arc<dyn EncoderInterface>,
		constructor: Option<Constructor>,
		max_gas: Option<u64>,
		policy: ReceiptPolicy,
	) -> Self {
		Self {
			estimator: GasEstimator::new(Arc::clone(&provider), max_gas),
			poller: ReceiptPoller::new(Arc::clone(&provider), policy),
			provider,
			encoder,
			constructor,
		}
	}

	/// Starts a deployment with the given constructor `inputs`.
	///
	/// `options.to` is ignored; every other field set in `options` overrides
	/// the encoded transaction.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime, since every stage is
	/// spawned immediately.
	#[instrument(skip_all)]
	pub fn create(&self, inputs: Vec<serde_json::Value>, options: TxOptions) -> CreatePipeline {
		tracing::debug!(inputs = inputs.len(), "Starting deployment");

		let mut graph = StageGraph::new("create");

		let encode = graph.root(
			"encode",
			encode_deployment(
				Arc::clone(&self.encoder),
				self.constructor.clone(),
				inputs,
				options,
			),
		);
		let submission = Submission::declare(
			&mut graph,
			&encode,
			identity,
			Arc::clone(&self.provider),
			self.estimator.clone(),
			self.poller.clone(),
		);

		CreatePipeline {
			graph,
			encode,
			submission,
		}
	}
}

/// A running deployment.
///
/// Dropping the pipeline cancels any stage that has not finished, including
/// the receipt wait.
#[derive(Debug)]
pub struct CreatePipeline {
	graph: StageGraph,
	encode: Stage<Transaction>,
	submission: Submission,
}

impl CreatePipeline {
	/// Returns the deployment transaction as encoded, before gas is filled in.
	pub async fn transaction(&self) -> Result<Transaction, PipelineError> {
		self.encode.get().await
	}

	pub async fn gas_estimate(&self) -> Result<GasEstimate, PipelineError> {
		self.submission.estimate.get().await
	}

	pub async fn transaction_hash(&self) -> Result<TxHash, PipelineError> {
		self.submission.hash.get().await
	}

	pub async fn receipt(&self) -> Result<TransactionReceipt, PipelineError> {
		self.submission.receipt.get().await
	}

	/// Returns the address of the deployed contract.
	///
	/// Fails with [`PipelineError::MissingContractAddress`] when the receipt
	/// names no contract, as for a reverted deployment.
	pub async fn contract_address(&self) -> Result<Address, PipelineError> {
		let receipt = self.receipt().await?;
		receipt
			.contract_address
			.ok_or(PipelineError::MissingContractAddress(receipt.hash))
	}

	pub fn cancel(&self) {
		self.graph.cancel();
	}

	pub fn graph(&self) -> &StageGraph {
		&self.graph
	}
}

async fn encode_deployment(
	encoder: Arc<dyn EncoderInterface>,
	constructor: Option<Constructor>,
	inputs: Vec<serde_json::Value>,
	options: TxOptions,
) -> Result<Transaction, PipelineError> {
	let tx = encoder
		.encode_constructor(constructor.as_ref(), &inputs)
		.await?;
	Ok(options.without_recipient().apply(tx))
}
