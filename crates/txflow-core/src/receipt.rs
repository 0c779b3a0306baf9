//! Receipt polling for submitted transactions.
//!
//! The poller asks the provider for the receipt until one is observed. Both
//! "not mined yet" and transport failures are treated as transient and retried
//! with exponential backoff. The wait is bounded by an optional deadline.

use crate::PipelineError;
use backoff::ExponentialBackoffBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use txflow_config::ReceiptConfig;
use txflow_provider::{ProviderError, ProviderInterface};
use txflow_types::{truncate_id, TransactionReceipt, TxHash};

/// How often, and for how long, receipts are polled.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptPolicy {
	/// Delay before the second lookup.
	pub initial_interval: Duration,
	/// Upper bound for the delay between lookups.
	pub max_interval: Duration,
	/// Growth factor applied to the delay after each lookup.
	pub multiplier: f64,
	/// Deadline for the whole wait; `None` waits indefinitely.
	pub timeout: Option<Duration>,
}

impl Default for ReceiptPolicy {
	fn default() -> Self {
		Self::from(&ReceiptConfig::default())
	}
}

impl From<&ReceiptConfig> for ReceiptPolicy {
	fn from(config: &ReceiptConfig) -> Self {
		Self {
			initial_interval: config.initial_interval(),
			max_interval: config.max_interval(),
			multiplier: config.multiplier,
			timeout: config.timeout(),
		}
	}
}

impl ReceiptPolicy {
	pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.timeout = timeout;
		self
	}
}

/// Waits for transaction receipts.
#[derive(Clone)]
pub struct ReceiptPoller {
	provider: Arc<dyn ProviderInterface>,
	policy: ReceiptPolicy,
}

impl ReceiptPoller {
	pub fn new(provider: Arc<dyn ProviderInterface>, policy: ReceiptPolicy) -> Self {
		Self { provider, policy }
	}

	pub fn policy(&self) -> &ReceiptPolicy {
		&self.policy
	}

	/// Polls until the receipt for `hash` is available.
	///
	/// A reverted transaction still has a receipt and is returned as such.
	/// Fails with [`PipelineError::ReceiptTimeout`] once the policy's deadline
	/// passes.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(&hash.to_string())))]
	pub async fn wait(&self, hash: TxHash) -> Result<TransactionReceipt, PipelineError> {
		let polling = self.poll(hash);

		match self.policy.timeout {
			Some(limit) => tokio::time::timeout(limit, polling)
				.await
				.map_err(|_| {
					tracing::warn!(waited = ?limit, "Receipt polling timed out");
					PipelineError::ReceiptTimeout {
						hash,
						waited: limit,
					}
				})?,
			None => polling.await,
		}
	}

	async fn poll(&self, hash: TxHash) -> Result<TransactionReceipt, PipelineError> {
		let backoff = ExponentialBackoffBuilder::new()
			.with_initial_interval(self.policy.initial_interval)
			.with_multiplier(self.policy.multiplier)
			.with_max_interval(self.policy.max_interval)
			.with_max_elapsed_time(None)
			.build();

		let provider = Arc::clone(&self.provider);
		let lookup = move || {
			let provider = Arc::clone(&provider);
			async move {
				match provider.get_transaction_receipt(&hash).await {
					Ok(Some(receipt)) => Ok(receipt),
					// Pending transactions are reported as a missing error
					Ok(None) => Err(backoff::Error::transient(None)),
					Err(e) => Err(backoff::Error::transient(Some(e))),
				}
			}
		};

		let notify = |error: Option<ProviderError>, delay: Duration| match error {
			None => tracing::trace!(retry_in = ?delay, "Waiting for transaction to be mined"),
			Some(e) => tracing::debug!(error = %e, retry_in = ?delay, "Receipt lookup failed"),
		};

		let receipt = backoff::future::retry_notify(backoff, lookup, notify)
			.await
			.map_err(|error| match error {
				Some(e) => PipelineError::Transport(e),
				None => PipelineError::ReceiptTimeout {
					hash,
					waited: self.policy.timeout.unwrap_or_default(),
				},
			})?;

		tracing::debug!(
			block = receipt.block_number,
			status = receipt.status(),
			"Receipt observed"
		);
		Ok(receipt)
	}
}
