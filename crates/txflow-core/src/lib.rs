//! Contract interaction pipelines for the txflow system.
//!
//! Each contract interaction runs as a small graph of asynchronous stages:
//!
//! - **call**: encode → execute (`eth_call`) → decode
//! - **send**: encode → estimate → submit → confirm
//! - **create**: encode constructor → estimate → submit → confirm
//!
//! Stages start as soon as a pipeline is created and their outcomes are
//! memoized, so accessors may be awaited any number of times and in any order
//! without repeating provider requests. Gas estimation is best-effort; a
//! failed estimate never prevents submission.

pub mod call;
pub mod context;
pub mod create;
pub mod error;
pub mod estimate;
pub mod receipt;
pub mod send;
pub mod stage;
pub mod validate;

pub use call::{CallFactory, CallPipeline};
pub use context::{ContractClient, PipelineContext, PipelineContextBuilder};
pub use create::{CreateFactory, CreatePipeline};
pub use error::{PipelineError, ValidationError};
pub use estimate::{GasEstimate, GasEstimator};
pub use receipt::{ReceiptPoller, ReceiptPolicy};
pub use send::{SendFactory, SendPipeline};
pub use stage::{Stage, StageGraph};
pub use validate::{validate_arguments, ArgumentSchema, Schemas};
