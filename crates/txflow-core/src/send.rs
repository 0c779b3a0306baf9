//! State-changing transactions.
//!
//! A send pipeline encodes the invocation, estimates gas from the encoded
//! transaction, submits once both are available and then waits for the
//! receipt. The estimate and submission stages are shared with deployments.

use crate::call::encode_call;
use crate::estimate::{GasEstimate, GasEstimator};
use crate::receipt::{ReceiptPoller, ReceiptPolicy};
use crate::stage::{Stage, StageGraph};
use crate::PipelineError;
use std::sync::Arc;
use tracing::instrument;
use txflow_abi::{EncodedTransaction, EncoderInterface, FunctionTarget};
use txflow_provider::ProviderInterface;
use txflow_types::{truncate_id, Transaction, TransactionReceipt, TxHash, TxOptions};

/// Creates send pipelines against a shared provider and encoder.
#[derive(Clone)]
pub struct SendFactory {
	provider: Arc<dyn ProviderInterface>,
	encoder: Arc<dyn EncoderInterface>,
	estimator: GasEstimator,
	poller: ReceiptPoller,
}

impl SendFactory {
	pub fn new(
		provider: Arc<dyn ProviderInterface>,
		encoder: Arc<dyn EncoderInterface>,
		max_gas: Option<u64>,
		policy: ReceiptPolicy,
	) -> Self {
		Self {
			estimator: GasEstimator::new(Arc::clone(&provider), max_gas),
			poller: ReceiptPoller::new(Arc::clone(&provider), policy),
			provider,
			encoder,
		}
	}

	/// Starts a transaction invoking `target` with `inputs`.
	///
	/// Fields set in `options` override the encoded transaction. A gas limit
	/// in `options` is used as is and suppresses estimation.
	///
	/// # Panics
	///
	/// Panics when called outside a tokio runtime, since every stage is
	/// spawned immediately.
	#[instrument(skip_all)]
	pub fn send(
		&self,
		target: impl Into<FunctionTarget>,
		inputs: Vec<serde_json::Value>,
		options: TxOptions,
	) -> SendPipeline {
		let target = target.into();
		tracing::debug!(function = %target.label(), inputs = inputs.len(), "Starting send");

		let mut graph = StageGraph::new(format!("send:{}", target.label()));

		let encode = graph.root(
			"encode",
			encode_call(Arc::clone(&self.encoder), target, inputs, options),
		);
		let submission = Submission::declare(
			&mut graph,
			&encode,
			|encoded: EncodedTransaction| encoded.tx,
			Arc::clone(&self.provider),
			self.estimator.clone(),
			self.poller.clone(),
		);

		SendPipeline {
			graph,
			encode,
			submission,
		}
	}
}

/// A running state-changing transaction.
///
/// Dropping the pipeline cancels any stage that has not finished, including
/// the receipt wait.
#[derive(Debug)]
pub struct SendPipeline {
	graph: StageGraph,
	encode: Stage<EncodedTransaction>,
	submission: Submission,
}

impl SendPipeline {
	/// Returns the transaction as encoded, before gas is filled in.
	pub async fn transaction(&self) -> Result<EncodedTransaction, PipelineError> {
		self.encode.get().await
	}

	pub async fn gas_estimate(&self) -> Result<GasEstimate, PipelineError> {
		self.submission.estimate.get().await
	}

	/// Resolves once the provider accepted the transaction.
	pub async fn transaction_hash(&self) -> Result<TxHash, PipelineError> {
		self.submission.hash.get().await
	}

	/// Resolves once the transaction is mined.
	///
	/// A reverted transaction resolves to a receipt with a failed status.
	pub async fn receipt(&self) -> Result<TransactionReceipt, PipelineError> {
		self.submission.receipt.get().await
	}

	pub fn cancel(&self) {
		self.graph.cancel();
	}

	pub fn graph(&self) -> &StageGraph {
		&self.graph
	}
}

/// Estimate, submit and confirm stages following an encode stage.
#[derive(Debug)]
pub(crate) struct Submission {
	pub(crate) estimate: Stage<GasEstimate>,
	pub(crate) hash: Stage<TxHash>,
	pub(crate) receipt: Stage<TransactionReceipt>,
}

impl Submission {
	/// Declares the stages on `graph`. `into_tx` extracts the transaction from
	/// the value produced by `encode`.
	pub(crate) fn declare<E>(
		graph: &mut StageGraph,
		encode: &Stage<E>,
		into_tx: fn(E) -> Transaction,
		provider: Arc<dyn ProviderInterface>,
		estimator: GasEstimator,
		poller: ReceiptPoller,
	) -> Self
	where
		E: Clone + Send + Sync + 'static,
	{
		let estimate = graph.then("estimate", encode, move |encoded| {
			estimate_gas(estimator, into_tx(encoded))
		});
		let hash = graph.join("submit", encode, &estimate, move |encoded, estimate| {
			submit(provider, into_tx(encoded), estimate)
		});
		let receipt = graph.then("confirm", &hash, move |hash| confirm(poller, hash));

		Self {
			estimate,
			hash,
			receipt,
		}
	}
}

async fn estimate_gas(
	estimator: GasEstimator,
	tx: Transaction,
) -> Result<GasEstimate, PipelineError> {
	Ok(estimator.estimate(&tx).await)
}

async fn submit(
	provider: Arc<dyn ProviderInterface>,
	tx: Transaction,
	estimate: GasEstimate,
) -> Result<TxHash, PipelineError> {
	let tx = Transaction {
		gas: tx.gas.or(estimate.gas()),
		..tx
	};

	let hash = provider.send_transaction(&tx).await?;
	tracing::info!(
		tx_hash = %truncate_id(&hash.to_string()),
		gas = ?tx.gas,
		deployment = tx.is_deployment(),
		"Submitted transaction"
	);
	Ok(hash)
}

async fn confirm(
	poller: ReceiptPoller,
	hash: TxHash,
) -> Result<TransactionReceipt, PipelineError> {
	poller.wait(hash).await
}
