//! Execution orchestration.
//!
//! Two combinators over lazy operations (closures that start a future when
//! called), plus the process launcher they are normally used with:
//! - [`run_in_order`]: one after another, stopping at the first failure
//! - [`run_concurrently`]: all at once, failing on the first failure observed
//!
//! Neither combinator knows anything about packs or packwiz.

mod invocation;
mod process;
mod types;

use std::future::Future;

use tokio::task::JoinSet;
use tracing::{debug, warn};

pub use invocation::{Invocation, quote};
pub use process::{exec, exec_shell};
pub use types::{ExecConfig, ExecError, ExecResult};

/// Run operations strictly in order.
///
/// Each operation is started only after the previous one succeeded. The first
/// failure is returned immediately and later operations are never started.
/// Work already done by earlier operations is not undone.
pub async fn run_in_order<T, E, F, Fut, I>(ops: I) -> Result<Vec<T>, E>
where
  I: IntoIterator<Item = F>,
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<T, E>>,
{
  let mut results = Vec::new();
  for (index, op) in ops.into_iter().enumerate() {
    match op().await {
      Ok(value) => results.push(value),
      Err(e) => {
        debug!(index, "operation failed, skipping remaining operations");
        return Err(e);
      }
    }
  }
  Ok(results)
}

/// Run operations concurrently on the tokio runtime.
///
/// Every operation is started immediately. Succeeds with the results in
/// operation order once all have succeeded; fails with the first failure
/// observed. Operations still running at that point are detached: they run to
/// completion in the background and their results are discarded.
pub async fn run_concurrently<T, E, F, Fut, I>(ops: I) -> Result<Vec<T>, E>
where
  I: IntoIterator<Item = F>,
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<T, E>> + Send + 'static,
  T: Send + 'static,
  E: From<ExecError> + Send + 'static,
{
  let mut join_set = JoinSet::new();
  for (index, op) in ops.into_iter().enumerate() {
    let fut = op();
    join_set.spawn(async move { (index, fut.await) });
  }

  let mut slots: Vec<Option<T>> = (0..join_set.len()).map(|_| None).collect();

  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((index, Ok(value))) => slots[index] = Some(value),
      Ok((index, Err(e))) => {
        if !join_set.is_empty() {
          warn!(index, still_running = join_set.len(), "operation failed, detaching siblings");
        }
        join_set.detach_all();
        return Err(e);
      }
      Err(join_error) => {
        join_set.detach_all();
        return Err(ExecError::Join(join_error.to_string()).into());
      }
    }
  }

  Ok(slots.into_iter().flatten().collect())
}
