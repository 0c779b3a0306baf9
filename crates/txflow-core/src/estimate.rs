//! Best-effort gas estimation.
//!
//! Estimation never fails a pipeline. When the provider cannot estimate, the
//! outcome is tagged [`GasEstimate::Unavailable`] and the transaction is
//! submitted without a gas limit, leaving the choice to the node.

use std::sync::Arc;
use txflow_provider::ProviderInterface;
use txflow_types::Transaction;

/// Outcome of a gas estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GasEstimate {
	/// The transaction already carried a gas limit; the provider was not asked.
	Preset(u64),
	/// The provider returned an estimate.
	Estimated(u64),
	/// Estimation failed; the transaction goes out without a gas limit.
	Unavailable { reason: String },
}

impl GasEstimate {
	/// Returns the gas limit to submit with, if any.
	pub fn gas(&self) -> Option<u64> {
		match self {
			GasEstimate::Preset(gas) | GasEstimate::Estimated(gas) => Some(*gas),
			GasEstimate::Unavailable { .. } => None,
		}
	}

	pub fn is_available(&self) -> bool {
		self.gas().is_some()
	}
}

/// Estimates gas for transactions that do not carry a limit.
#[derive(Clone)]
pub struct GasEstimator {
	provider: Arc<dyn ProviderInterface>,
	/// Upper bound sent along with every estimation request.
	max_gas: Option<u64>,
}

impl GasEstimator {
	pub fn new(provider: Arc<dyn ProviderInterface>, max_gas: Option<u64>) -> Self {
		Self { provider, max_gas }
	}

	pub async fn estimate(&self, tx: &Transaction) -> GasEstimate {
		if let Some(gas) = tx.gas {
			return GasEstimate::Preset(gas);
		}

		let request = Transaction {
			gas: self.max_gas,
			..tx.clone()
		};

		match self.provider.estimate_gas(&request).await {
			Ok(gas) => {
				tracing::debug!(gas, "Estimated gas");
				GasEstimate::Estimated(gas)
			}
			Err(e) => {
				tracing::debug!(error = %e, "Gas estimation failed, submitting without a gas limit");
				GasEstimate::Unavailable {
					reason: e.to_string(),
				}
			}
		}
	}
}
