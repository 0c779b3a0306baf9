//! Main entry point for the txflow command line.
//!
//! Runs a single contract interaction against the node named in the
//! configuration file: a read-only call, a state-changing transaction, or a
//! deployment. Contracts are described by compiled JSON artifacts.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use txflow_abi::{ContractArtifact, JsonAbiCodec};
use txflow_config::Config;
use txflow_core::{ContractClient, PipelineContext};
use txflow_provider::implementations::evm::alloy::AlloyProvider;
use txflow_provider::ProviderInterface;
use txflow_types::{
	Address, ArgumentValue, DynSolValue, ReturndataDecoding, TransactionReceipt, TxOptions, U256,
};

/// Command-line arguments for txflow.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Executes a read-only call and prints the decoded result
	Call {
		/// Contract artifact (JSON with abi and bytecode)
		artifact: PathBuf,
		/// Deployed contract address
		address: Address,
		/// Function name or full signature, e.g. `transfer(address,uint256)`
		function: String,
		/// Function arguments; JSON values or plain strings
		#[arg(allow_hyphen_values = true)]
		args: Vec<String>,
		#[command(flatten)]
		options: TxArgs,
	},
	/// Sends a transaction and waits for its receipt
	Send {
		artifact: PathBuf,
		address: Address,
		function: String,
		#[arg(allow_hyphen_values = true)]
		args: Vec<String>,
		#[command(flatten)]
		options: TxArgs,
	},
	/// Deploys a contract and prints its address
	Deploy {
		artifact: PathBuf,
		/// Constructor arguments; JSON values or plain strings
		#[arg(allow_hyphen_values = true)]
		args: Vec<String>,
		#[command(flatten)]
		options: TxArgs,
	},
}

/// Transaction overrides shared by all commands.
#[derive(ClapArgs, Debug)]
struct TxArgs {
	/// Sender; defaults to the node's first account
	#[arg(long)]
	from: Option<Address>,
	/// Value in wei
	#[arg(long)]
	value: Option<U256>,
	/// Gas limit; skips estimation
	#[arg(long)]
	gas: Option<u64>,
}

impl TxArgs {
	/// Builds transaction options from the flags given on the command line.
	fn into_options(self) -> TxOptions {
		let mut options = TxOptions::new();
		if let Some(from) = self.from {
			options = options.with_from(from);
		}
		if let Some(value) = self.value {
			options = options.with_value(value);
		}
		if let Some(gas) = self.gas {
			options = options.with_gas(gas);
		}
		options
	}

	/// Like [`TxArgs::into_options`], asking the node for a sender if none
	/// was given.
	async fn into_options_with_sender(
		self,
		provider: &Arc<dyn ProviderInterface>,
	) -> Result<TxOptions, Box<dyn std::error::Error>> {
		let from = match self.from {
			Some(from) => from,
			None => provider
				.accounts()
				.await?
				.first()
				.copied()
				.ok_or("Node manages no accounts; pass --from")?,
		};

		Ok(TxArgs {
			from: Some(from),
			..self
		}
		.into_options())
	}
}

/// Main entry point for txflow.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Runs the requested pipeline and prints its outcome
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid configuration path: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!(rpc_url = %config.provider.rpc_url, "Loaded configuration");

	let provider: Arc<dyn ProviderInterface> =
		Arc::new(AlloyProvider::new(&config.provider.rpc_url)?);

	match args.command {
		Command::Call {
			artifact,
			address,
			function,
			args,
			options,
		} => {
			let (context, _, codec) = load(&config, &provider, &artifact)?;
			let client = ContractClient::new(&context, &codec, address);

			let pipeline = client.call(function, parse_inputs(args), options.into_options());
			let decodings = pipeline.decode().await?;
			print_decoding(decodings.first());
		}
		Command::Send {
			artifact,
			address,
			function,
			args,
			options,
		} => {
			let (context, _, codec) = load(&config, &provider, &artifact)?;
			let client = ContractClient::new(&context, &codec, address);
			let options = options.into_options_with_sender(&provider).await?;

			let pipeline = client.send(function, parse_inputs(args), options);
			println!("hash: {}", pipeline.transaction_hash().await?);
			print_receipt(&pipeline.receipt().await?);
		}
		Command::Deploy {
			artifact,
			args,
			options,
		} => {
			let (context, artifact, _) = load(&config, &provider, &artifact)?;
			let options = options.into_options_with_sender(&provider).await?;

			let pipeline = context
				.deployments(artifact.constructor().cloned())
				.create(parse_inputs(args), options);
			println!("hash: {}", pipeline.transaction_hash().await?);
			print_receipt(&pipeline.receipt().await?);
			println!("address: {}", pipeline.contract_address().await?);
		}
	}

	Ok(())
}

/// Reads an artifact and builds a pipeline context around it.
fn load(
	config: &Config,
	provider: &Arc<dyn ProviderInterface>,
	path: &Path,
) -> Result<(PipelineContext, ContractArtifact, JsonAbiCodec), Box<dyn std::error::Error>> {
	let artifact = ContractArtifact::load(path)?;
	tracing::debug!(
		contract = artifact.contract_name.as_deref().unwrap_or("<unnamed>"),
		"Loaded artifact"
	);

	let codec = JsonAbiCodec::from_artifact(&artifact);
	let context = PipelineContext::builder()
		.provider(Arc::clone(provider))
		.codec(Arc::new(codec.clone()))
		.pipeline_config(&config.pipeline)
		.build()?;

	Ok((context, artifact, codec))
}

/// Interprets each argument as JSON, falling back to a plain string.
fn parse_inputs(args: Vec<String>) -> Vec<serde_json::Value> {
	args.into_iter()
		.map(|arg| serde_json::from_str(&arg).unwrap_or(serde_json::Value::String(arg)))
		.collect()
}

fn print_receipt(receipt: &TransactionReceipt) {
	println!("block: {}", receipt.block_number);
	println!("status: {}", receipt.status());
	println!("gas used: {}", receipt.gas_used);
	println!("logs: {}", receipt.logs.len());
}

fn print_decoding(decoding: Option<&ReturndataDecoding>) {
	let Some(decoding) = decoding else {
		println!("(no result)");
		return;
	};

	match decoding {
		ReturndataDecoding::Return { .. } => {}
		ReturndataDecoding::Revert { name, .. } => println!("reverted: {}", name),
		ReturndataDecoding::Failure { data } => println!("unrecognized return data: {}", data),
	}

	for (index, argument) in decoding.arguments().iter().enumerate() {
		let label = argument
			.name
			.clone()
			.unwrap_or_else(|| index.to_string());
		match &argument.value {
			ArgumentValue::Value(value) => println!("{}: {}", label, format_value(value)),
			ArgumentValue::Error(reason) => println!("{}: <invalid: {}>", label, reason),
		}
	}
}

fn format_value(value: &DynSolValue) -> String {
	match value {
		DynSolValue::Bool(flag) => flag.to_string(),
		DynSolValue::Int(number, _) => number.to_string(),
		DynSolValue::Uint(number, _) => number.to_string(),
		DynSolValue::Address(address) => address.to_string(),
		DynSolValue::String(text) => format!("{:?}", text),
		DynSolValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
		DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
		DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
			let items: Vec<String> = items.iter().map(format_value).collect();
			format!("[{}]", items.join(", "))
		}
		other => format!("{:?}", other),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use txflow_provider::implementations::mock::{MockMethod, MockProvider};

	fn no_flags() -> TxArgs {
		TxArgs {
			from: None,
			value: None,
			gas: None,
		}
	}

	#[test]
	fn test_call_options_leave_sender_unset() {
		let options = TxArgs {
			gas: Some(50_000),
			..no_flags()
		}
		.into_options();

		assert_eq!(options.from, None);
		assert_eq!(options.gas, Some(50_000));
	}

	#[tokio::test]
	async fn test_sender_defaults_to_first_account() {
		let mock = Arc::new(MockProvider::new());
		let provider: Arc<dyn ProviderInterface> = mock.clone();

		let options = no_flags().into_options_with_sender(&provider).await.unwrap();
		assert_eq!(options.from, Some(Address::with_last_byte(1)));
		assert_eq!(mock.request_count(MockMethod::Accounts), 1);

		let sender = Address::with_last_byte(9);
		let options = TxArgs {
			from: Some(sender),
			..no_flags()
		}
		.into_options_with_sender(&provider)
		.await
		.unwrap();
		assert_eq!(options.from, Some(sender));
		assert_eq!(mock.request_count(MockMethod::Accounts), 1);
	}
}
