//! Explicit task graph backing every pipeline.
//!
//! A pipeline invocation owns one [`StageGraph`]. Each stage is spawned on the
//! tokio runtime as soon as it is declared, waits for the stages it depends
//! on, then runs its own work. The outcome is memoized: every [`Stage`] handle
//! observes the same value or the same error, and the work runs exactly once
//! no matter how often it is read.
//!
//! Failures flow along declared edges only. A failing stage fails its
//! dependents but leaves unrelated stages untouched.
//!
//! Dropping the graph aborts every stage that has not finished yet.

use crate::PipelineError;
use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinError};
use tracing::Instrument;

type Memoized<T> = Shared<BoxFuture<'static, Result<T, PipelineError>>>;

/// Handle to the memoized outcome of a stage.
pub struct Stage<T: Clone> {
	name: Arc<str>,
	outcome: Memoized<T>,
}

impl<T: Clone> Clone for Stage<T> {
	fn clone(&self) -> Self {
		Self {
			name: Arc::clone(&self.name),
			outcome: self.outcome.clone(),
		}
	}
}

impl<T: Clone> fmt::Debug for Stage<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Stage")
			.field("name", &self.name)
			.field("resolved", &self.outcome.peek().is_some())
			.finish()
	}
}

impl<T> Stage<T>
where
	T: Clone + Send + Sync + 'static,
{
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Waits for the stage and returns its outcome.
	pub async fn get(&self) -> Result<T, PipelineError> {
		self.outcome.clone().await
	}

	/// Returns the outcome if the stage has already been awaited to completion.
	pub fn peek(&self) -> Option<Result<T, PipelineError>> {
		self.outcome.peek().cloned()
	}
}

struct StageNode {
	name: String,
	dependencies: Vec<String>,
	abort: AbortHandle,
}

/// The stages of one pipeline invocation.
pub struct StageGraph {
	label: String,
	nodes: Vec<StageNode>,
}

impl StageGraph {
	pub fn new(label: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			nodes: Vec::new(),
		}
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Declares a stage with no dependencies.
	///
	/// Must be called from within a tokio runtime.
	pub fn root<T, F>(&mut self, name: &str, work: F) -> Stage<T>
	where
		T: Clone + Send + Sync + 'static,
		F: Future<Output = Result<T, PipelineError>> + Send + 'static,
	{
		self.spawn(name, Vec::new(), work)
	}

	/// Declares a stage that runs `work` on the value of `upstream`.
	pub fn then<A, T, W, Fut>(&mut self, name: &str, upstream: &Stage<A>, work: W) -> Stage<T>
	where
		A: Clone + Send + Sync + 'static,
		T: Clone + Send + Sync + 'static,
		W: FnOnce(A) -> Fut + Send + 'static,
		Fut: Future<Output = Result<T, PipelineError>> + Send + 'static,
	{
		let upstream = upstream.clone();
		let dependencies = vec![upstream.name().to_string()];

		self.spawn(name, dependencies, async move {
			let value = upstream.get().await?;
			work(value).await
		})
	}

	/// Declares a stage that runs `work` once both `left` and `right` resolve.
	pub fn join<A, B, T, W, Fut>(
		&mut self,
		name: &str,
		left: &Stage<A>,
		right: &Stage<B>,
		work: W,
	) -> Stage<T>
	where
		A: Clone + Send + Sync + 'static,
		B: Clone + Send + Sync + 'static,
		T: Clone + Send + Sync + 'static,
		W: FnOnce(A, B) -> Fut + Send + 'static,
		Fut: Future<Output = Result<T, PipelineError>> + Send + 'static,
	{
		let (left, right) = (left.clone(), right.clone());
		let dependencies = vec![left.name().to_string(), right.name().to_string()];

		self.spawn(name, dependencies, async move {
			let (a, b) = future::try_join(left.get(), right.get()).await?;
			work(a, b).await
		})
	}

	/// Lists each stage with the names of the stages it waits on.
	pub fn stages(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
		self.nodes
			.iter()
			.map(|node| (node.name.as_str(), node.dependencies.as_slice()))
	}

	/// Aborts every stage that has not finished yet.
	///
	/// Readers of an aborted stage observe [`PipelineError::Cancelled`].
	pub fn cancel(&self) {
		for node in &self.nodes {
			node.abort.abort();
		}
	}

	fn spawn<T, F>(&mut self, name: &str, dependencies: Vec<String>, work: F) -> Stage<T>
	where
		T: Clone + Send + Sync + 'static,
		F: Future<Output = Result<T, PipelineError>> + Send + 'static,
	{
		let span = tracing::debug_span!("stage", graph = %self.label, stage = %name);
		let handle = tokio::spawn(
			async move {
				tracing::trace!("Started");
				let outcome = work.await;
				match &outcome {
					Ok(_) => tracing::trace!("Resolved"),
					Err(e) => tracing::trace!(error = %e, "Failed"),
				}
				outcome
			}
			.instrument(span),
		);

		self.nodes.push(StageNode {
			name: name.to_string(),
			dependencies,
			abort: handle.abort_handle(),
		});

		let name: Arc<str> = Arc::from(name);
		let stage = Arc::clone(&name);
		let outcome = async move {
			match handle.await {
				Ok(outcome) => outcome,
				Err(e) => Err(join_failure(&stage, e)),
			}
		}
		.boxed()
		.shared();

		Stage { name, outcome }
	}
}

impl Drop for StageGraph {
	fn drop(&mut self) {
		self.cancel();
	}
}

impl fmt::Debug for StageGraph {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StageGraph")
			.field("label", &self.label)
			.field("stages", &self.stages().map(|(name, _)| name).collect::<Vec<_>>())
			.finish()
	}
}

fn join_failure(stage: &str, error: JoinError) -> PipelineError {
	if error.is_cancelled() {
		return PipelineError::Cancelled {
			stage: stage.to_string(),
		};
	}

	let message = match error.try_into_panic() {
		Ok(payload) => payload
			.downcast_ref::<&str>()
			.map(|s| s.to_string())
			.or_else(|| payload.downcast_ref::<String>().cloned())
			.unwrap_or_else(|| "stage panicked".to_string()),
		Err(e) => e.to_string(),
	};

	PipelineError::StageFailed {
		stage: stage.to_string(),
		message,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::time::Duration;
	use txflow_provider::ProviderError;

	#[tokio::test]
	async fn test_work_runs_once() {
		let runs = Arc::new(AtomicUsize::new(0));
		let mut graph = StageGraph::new("test");

		let counter = Arc::clone(&runs);
		let stage = graph.root("count", async move {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok::<_, PipelineError>(7u64)
		});

		assert_eq!(stage.get().await.unwrap(), 7);
		assert_eq!(stage.clone().get().await.unwrap(), 7);
		assert_eq!(stage.peek().unwrap().unwrap(), 7);
		assert_eq!(runs.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_failure_reaches_dependents_only() {
		let mut graph = StageGraph::new("test");

		let failing = graph.root("failing", async {
			Err::<u64, _>(PipelineError::from(ProviderError::Network(
				"unreachable".into(),
			)))
		});
		let sibling = graph.root("sibling", async { Ok::<_, PipelineError>("ok".to_string()) });
		let dependent = graph.then("dependent", &failing, |value| async move {
			Ok::<_, PipelineError>(value + 1)
		});
		let joined = graph.join("joined", &sibling, &dependent, |text, value| async move {
			Ok::<_, PipelineError>(format!("{}{}", text, value))
		});

		assert_eq!(sibling.get().await.unwrap(), "ok");
		assert!(matches!(
			dependent.get().await,
			Err(PipelineError::Transport(ProviderError::Network(_)))
		));
		assert!(matches!(
			joined.get().await,
			Err(PipelineError::Transport(ProviderError::Network(_)))
		));
		// Repeated reads observe the same failure
		assert!(matches!(
			failing.get().await,
			Err(PipelineError::Transport(_))
		));
	}

	#[tokio::test]
	async fn test_join_combines_values() {
		let mut graph = StageGraph::new("test");

		let a = graph.root("a", async { Ok::<_, PipelineError>(2u64) });
		let b = graph.then("b", &a, |value| async move { Ok::<_, PipelineError>(value * 10) });
		let sum = graph.join("sum", &a, &b, |a, b| async move {
			Ok::<_, PipelineError>(a + b)
		});

		assert_eq!(sum.get().await.unwrap(), 22);

		let stages: Vec<_> = graph
			.stages()
			.map(|(name, deps)| (name.to_string(), deps.to_vec()))
			.collect();
		assert_eq!(
			stages,
			vec![
				("a".to_string(), vec![]),
				("b".to_string(), vec!["a".to_string()]),
				("sum".to_string(), vec!["a".to_string(), "b".to_string()]),
			]
		);
	}

	#[tokio::test(start_paused = true)]
	async fn test_cancel_aborts_pending_stages() {
		let mut graph = StageGraph::new("test");

		let done = graph.root("done", async { Ok::<_, PipelineError>(1u64) });
		assert_eq!(done.get().await.unwrap(), 1);

		let slow = graph.root("slow", async {
			tokio::time::sleep(Duration::from_secs(3600)).await;
			Ok::<_, PipelineError>(2u64)
		});
		let after = graph.then("after", &slow, |value| async move {
			Ok::<_, PipelineError>(value)
		});

		graph.cancel();

		assert!(matches!(
			slow.get().await,
			Err(PipelineError::Cancelled { ref stage }) if stage == "slow"
		));
		assert!(matches!(after.get().await, Err(PipelineError::Cancelled { .. })));
		// Finished stages keep their value
		assert_eq!(done.get().await.unwrap(), 1);
	}

	#[tokio::test(start_paused = true)]
	async fn test_drop_cancels_graph() {
		let mut graph = StageGraph::new("test");
		let slow = graph.root("slow", async {
			tokio::time::sleep(Duration::from_secs(60)).await;
			Ok::<_, PipelineError>(())
		});

		drop(graph);

		assert!(matches!(slow.get().await, Err(PipelineError::Cancelled { .. })));
	}

	fn stage_should_panic() -> bool {
		true
	}

	#[tokio::test]
	async fn test_panic_becomes_stage_failure() {
		let mut graph = StageGraph::new("test");
		let stage = graph.root("explode", async {
			if stage_should_panic() {
				panic!("boom");
			}
			Ok::<u64, PipelineError>(1)
		});

		match stage.get().await {
			Err(PipelineError::StageFailed { stage, message }) => {
				assert_eq!(stage, "explode");
				assert_eq!(message, "boom");
			}
			other => panic!("unexpected outcome: {:?}", other),
		}
	}
}
