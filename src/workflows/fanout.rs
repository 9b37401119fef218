//! Generic fan-out/fan-in over a [`JoinSet`].
//!
//! A [`DispatchSet`] lists exactly which branches to launch and with what
//! input. [`fan_out`] runs them concurrently, waits for every one of them and
//! returns the outputs ordered by dispatch index, whatever order they
//! finished in.

use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::types::{AppError, Result};

/// One branch of a fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch<I> {
    pub index: usize,
    pub input: I,
}

/// The branches of one fan-out step, indexed from 0 in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSet<I> {
    branches: Vec<Branch<I>>,
}

impl<I> DispatchSet<I> {
    pub fn new(inputs: impl IntoIterator<Item = I>) -> Self {
        let branches = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| Branch { index, input })
            .collect();
        Self { branches }
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn branches(&self) -> &[Branch<I>] {
        &self.branches
    }
}

impl<I: Clone> DispatchSet<I> {
    /// `count` branches with identical input
    pub fn replicate(input: I, count: usize) -> Self {
        Self::new(std::iter::repeat(input).take(count))
    }
}

/// Run every branch of `set` through `task` and collect the outputs in
/// dispatch order.
///
/// # Errors
///
/// - [`AppError::Cancelled`] if `cancel` fires first; in-flight branches are
///   aborted and no output is returned.
/// - [`AppError::Internal`] if a branch panics or the number of outputs does
///   not match the number of branches dispatched.
pub async fn fan_out<I, O, F, Fut>(
    set: DispatchSet<I>,
    cancel: &CancellationToken,
    task: F,
) -> Result<Vec<O>>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = O> + Send + 'static,
    O: Send + 'static,
{
    let expected = set.len();
    let mut tasks = JoinSet::new();
    for branch in set.branches {
        let fut = task(branch.input);
        let index = branch.index;
        tasks.spawn(async move { (index, fut.await) });
    }

    let mut slots: Vec<Option<O>> = std::iter::repeat_with(|| None).take(expected).collect();
    loop {
        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tasks.abort_all();
                tracing::warn!(pending = tasks.len(), "Fan-out cancelled");
                return Err(AppError::Cancelled);
            }
            joined = tasks.join_next() => joined,
        };

        let Some(joined) = joined else { break };
        let (index, output) =
            joined.map_err(|e| AppError::Internal(format!("Branch task failed: {}", e)))?;

        let slot = slots.get_mut(index).ok_or_else(|| {
            AppError::Internal(format!(
                "Branch {} outside dispatch set of {}",
                index, expected
            ))
        })?;
        if slot.is_some() {
            return Err(AppError::Internal(format!(
                "Branch {} completed twice",
                index
            )));
        }
        *slot = Some(output);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| AppError::Internal(format!("Branch {} produced no output", index)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_dispatch_set_indexes_in_order() {
        let set = DispatchSet::new(vec!["a", "b", "c"]);
        let indices: Vec<usize> = set.branches().iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(DispatchSet::replicate((), 5).len(), 5);
    }

    #[tokio::test]
    async fn test_outputs_follow_dispatch_order() {
        let set = DispatchSet::new(vec![30u64, 0, 15]);
        let cancel = CancellationToken::new();

        let out = fan_out(set, &cancel, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            delay
        })
        .await
        .unwrap();

        assert_eq!(out, vec![30, 0, 15]);
    }

    #[tokio::test]
    async fn test_every_branch_runs_exactly_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let out = fan_out(DispatchSet::replicate((), 5), &cancel, |_| {
            let runs = runs.clone();
            async move { runs.fetch_add(1, Ordering::SeqCst) }
        })
        .await
        .unwrap();

        assert_eq!(out.len(), 5);
        assert_eq!(runs.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_empty_set_returns_immediately() {
        let cancel = CancellationToken::new();
        let out: Vec<u8> = fan_out(DispatchSet::new(Vec::<u8>::new()), &cancel, |x| async move { x })
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_aborts_branches() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = fan_out(DispatchSet::replicate((), 3), &cancel, |_| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
        })
        .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
    }

    #[tokio::test]
    async fn test_panicking_branch_is_internal_error() {
        let cancel = CancellationToken::new();
        let result = fan_out(DispatchSet::new(vec![1u8, 2]), &cancel, |x| async move {
            if x == 2 {
                panic!("boom");
            }
            x
        })
        .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
