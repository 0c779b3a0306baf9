//! Shared collaborators for pipeline factories.

use crate::call::{CallFactory, CallPipeline};
use crate::create::CreateFactory;
use crate::receipt::ReceiptPolicy;
use crate::send::{SendFactory, SendPipeline};
use crate::PipelineError;
use alloy_json_abi::Constructor;
use std::sync::Arc;
use txflow_abi::{DecoderInterface, EncoderInterface, FunctionTarget, JsonAbiCodec};
use txflow_config::PipelineConfig;
use txflow_provider::ProviderInterface;
use txflow_types::{Address, TxOptions};

/// Provider, encoder and decoder shared by every pipeline created from it,
/// together with the gas ceiling and the receipt polling policy.
#[derive(Clone)]
pub struct PipelineContext {
	provider: Arc<dyn ProviderInterface>,
	encoder: Arc<dyn EncoderInterface>,
	decoder: Arc<dyn DecoderInterface>,
	max_gas: Option<u64>,
	receipt_policy: ReceiptPolicy,
}

impl PipelineContext {
	pub fn builder() -> PipelineContextBuilder {
		PipelineContextBuilder::default()
	}

	pub fn provider(&self) -> &Arc<dyn ProviderInterface> {
		&self.provider
	}

	pub fn max_gas(&self) -> Option<u64> {
		self.max_gas
	}

	pub fn receipt_policy(&self) -> &ReceiptPolicy {
		&self.receipt_policy
	}

	pub fn calls(&self) -> CallFactory {
		CallFactory::new(
			Arc::clone(&self.provider),
			Arc::clone(&self.encoder),
			Arc::clone(&self.decoder),
		)
	}

	pub fn sends(&self) -> SendFactory {
		SendFactory::new(
			Arc::clone(&self.provider),
			Arc::clone(&self.encoder),
			self.max_gas,
			self.receipt_policy.clone(),
		)
	}

	/// Returns a factory deploying contracts with the given constructor.
	pub fn deployments(&self, constructor: Option<Constructor>) -> CreateFactory {
		CreateFactory::new(
			Arc::clone(&self.provider),
			Arc::clone(&self.encoder),
			constructor,
			self.max_gas,
			self.receipt_policy.clone(),
		)
	}

	/// Returns a copy of this context that encodes and decodes with `codec`.
	pub fn with_codec<C>(&self, codec: Arc<C>) -> Self
	where
		C: EncoderInterface + DecoderInterface + 'static,
	{
		Self {
			encoder: codec.clone(),
			decoder: codec,
			..self.clone()
		}
	}
}

/// Builder for [`PipelineContext`].
#[derive(Default)]
pub struct PipelineContextBuilder {
	provider: Option<Arc<dyn ProviderInterface>>,
	encoder: Option<Arc<dyn EncoderInterface>>,
	decoder: Option<Arc<dyn DecoderInterface>>,
	max_gas: Option<u64>,
	receipt_policy: Option<ReceiptPolicy>,
}

impl PipelineContextBuilder {
	pub fn provider(mut self, provider: Arc<dyn ProviderInterface>) -> Self {
		self.provider = Some(provider);
		self
	}

	pub fn encoder(mut self, encoder: Arc<dyn EncoderInterface>) -> Self {
		self.encoder = Some(encoder);
		self
	}

	pub fn decoder(mut self, decoder: Arc<dyn DecoderInterface>) -> Self {
		self.decoder = Some(decoder);
		self
	}

	/// Uses one value as both encoder and decoder.
	pub fn codec<C>(mut self, codec: Arc<C>) -> Self
	where
		C: EncoderInterface + DecoderInterface + 'static,
	{
		self.encoder = Some(codec.clone());
		self.decoder = Some(codec);
		self
	}

	pub fn max_gas(mut self, max_gas: u64) -> Self {
		self.max_gas = Some(max_gas);
		self
	}

	pub fn receipt_policy(mut self, policy: ReceiptPolicy) -> Self {
		self.receipt_policy = Some(policy);
		self
	}

	/// Applies the gas ceiling and receipt policy from configuration.
	pub fn pipeline_config(mut self, config: &PipelineConfig) -> Self {
		self.max_gas = config.max_gas;
		self.receipt_policy = Some(ReceiptPolicy::from(&config.receipt));
		self
	}

	pub fn build(self) -> Result<PipelineContext, PipelineError> {
		let provider = self
			.provider
			.ok_or_else(|| PipelineError::Configuration("No provider configured".into()))?;
		let encoder = self
			.encoder
			.ok_or_else(|| PipelineError::Configuration("No encoder configured".into()))?;
		let decoder = self
			.decoder
			.ok_or_else(|| PipelineError::Configuration("No decoder configured".into()))?;

		Ok(PipelineContext {
			provider,
			encoder,
			decoder,
			max_gas: self.max_gas,
			receipt_policy: self.receipt_policy.unwrap_or_default(),
		})
	}
}

/// Client bound to one deployed contract.
#[derive(Clone)]
pub struct ContractClient {
	address: Address,
	calls: CallFactory,
	sends: SendFactory,
}

impl ContractClient {
	/// Binds `codec` to the contract at `address` and creates pipelines
	/// through `context`'s provider and policies.
	pub fn new(context: &PipelineContext, codec: &JsonAbiCodec, address: Address) -> Self {
		let instance = context.with_codec(Arc::new(codec.for_instance(address)));

		Self {
			address,
			calls: instance.calls(),
			sends: instance.sends(),
		}
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn call(
		&self,
		target: impl Into<FunctionTarget>,
		inputs: Vec<serde_json::Value>,
		options: TxOptions,
	) -> CallPipeline {
		self.calls.call(target, inputs, options)
	}

	pub fn send(
		&self,
		target: impl Into<FunctionTarget>,
		inputs: Vec<serde_json::Value>,
		options: TxOptions,
	) -> SendPipeline {
		self.sends.send(target, inputs, options)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;
	use txflow_abi::JsonAbi;
	use txflow_config::Config;
	use txflow_provider::implementations::mock::MockProvider;

	#[test]
	fn test_missing_collaborators() {
		let result = PipelineContext::builder()
			.provider(Arc::new(MockProvider::new()))
			.build();

		assert!(matches!(
			result,
			Err(PipelineError::Configuration(ref message)) if message.contains("encoder")
		));
	}

	#[test]
	fn test_config_sets_policies() {
		let config: Config = r#"
[provider]
rpc_url = "http://127.0.0.1:8545"

[pipeline]
max_gas = 5000000

[pipeline.receipt]
initial_interval_ms = 100
max_interval_ms = 400
multiplier = 2.0
timeout_seconds = 0
"#
		.parse()
		.unwrap();

		let context = PipelineContext::builder()
			.provider(Arc::new(MockProvider::new()))
			.codec(Arc::new(JsonAbiCodec::new(JsonAbi::default())))
			.pipeline_config(&config.pipeline)
			.build()
			.unwrap();

		assert_eq!(context.max_gas(), Some(5_000_000));
		assert_eq!(
			context.receipt_policy(),
			&ReceiptPolicy {
				initial_interval: Duration::from_millis(100),
				max_interval: Duration::from_millis(400),
				multiplier: 2.0,
				timeout: None,
			}
		);
	}
}
