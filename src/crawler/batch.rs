//! Bounded-concurrency batch scheduler
//!
//! This is the single fan-out primitive used at every level of the crawl.
//! Work items are partitioned into consecutive groups no larger than the
//! concurrency limit; each group is spawned as independent tasks and fully
//! joined before the next group is dispatched. Peak in-flight tasks never
//! exceed the limit, and pending results are bounded to one group's worth.

use crate::{MotormapError, Result};
use std::future::Future;
use tokio::task::JoinSet;

/// Runs `work` over `items` with at most `concurrency` tasks in flight
///
/// Items are processed in consecutive groups of up to `concurrency` (the last
/// group may be smaller). Every task in a group runs to completion (success
/// or failure) before the next group starts; a failing item never cancels
/// its group siblings. The scheduler performs no retries of its own: retry
/// behavior belongs to the `work` function.
///
/// Returns one outcome per item. Within a group, outcomes land in completion
/// order, so callers must not depend on output order matching input order;
/// with `concurrency` = 1 the groups are singletons and order is preserved,
/// which reproduces fully synchronous behavior. A panicked or cancelled task
/// surfaces as [`MotormapError::Worker`] instead of aborting the batch.
pub async fn run_batched<I, T, F, Fut>(items: Vec<I>, concurrency: usize, work: F) -> Vec<Result<T>>
where
    I: Send + 'static,
    T: Send + 'static,
    F: Fn(I) -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let concurrency = concurrency.max(1);
    let mut outcomes = Vec::with_capacity(items.len());
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        let mut group = JoinSet::new();
        for item in items.by_ref().take(concurrency) {
            group.spawn(work(item));
        }

        while let Some(joined) = group.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => outcomes.push(Err(MotormapError::Worker(e.to_string()))),
            }
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_items_yield_no_outcomes() {
        let outcomes = run_batched(Vec::<u32>::new(), 5, |n| async move { Ok(n) }).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_all_items_produce_an_outcome() {
        let items: Vec<u32> = (0..25).collect();
        let outcomes = run_batched(items, 4, |n| async move { Ok(n * 2) }).await;

        assert_eq!(outcomes.len(), 25);

        let mut values: Vec<u32> = outcomes.into_iter().map(|o| o.unwrap()).collect();
        values.sort_unstable();
        let expected: Vec<u32> = (0..25).map(|n| n * 2).collect();
        assert_eq!(values, expected);
    }

    #[tokio::test]
    async fn test_in_flight_tasks_never_exceed_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let high_water = Arc::new(AtomicUsize::new(0));

        let items: Vec<u32> = (0..40).collect();
        let outcomes = run_batched(items, 7, {
            let in_flight = Arc::clone(&in_flight);
            let high_water = Arc::clone(&high_water);
            move |n| {
                let in_flight = Arc::clone(&in_flight);
                let high_water = Arc::clone(&high_water);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    high_water.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(outcomes.len(), 40);
        assert!(outcomes.iter().all(|o| o.is_ok()));

        let peak = high_water.load(Ordering::SeqCst);
        assert!(peak <= 7, "observed {} concurrent tasks, limit is 7", peak);
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_group_siblings() {
        let completed = Arc::new(AtomicUsize::new(0));

        let items: Vec<u32> = (0..10).collect();
        let outcomes = run_batched(items, 10, {
            let completed = Arc::clone(&completed);
            move |n| {
                let completed = Arc::clone(&completed);
                async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    completed.fetch_add(1, Ordering::SeqCst);
                    if n == 3 {
                        Err(MotormapError::Worker("boom".to_string()))
                    } else {
                        Ok(n)
                    }
                }
            }
        })
        .await;

        // Every sibling ran to completion despite the one failure
        assert_eq!(completed.load(Ordering::SeqCst), 10);
        assert_eq!(outcomes.len(), 10);
        assert_eq!(outcomes.iter().filter(|o| o.is_err()).count(), 1);
    }

    #[tokio::test]
    async fn test_concurrency_one_preserves_input_order() {
        let items: Vec<u32> = (0..12).collect();
        let outcomes = run_batched(items, 1, |n| async move { Ok(n) }).await;

        let values: Vec<u32> = outcomes.into_iter().map(|o| o.unwrap()).collect();
        assert_eq!(values, (0..12).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped_to_one() {
        let items: Vec<u32> = (0..3).collect();
        let outcomes = run_batched(items, 0, |n| async move { Ok(n) }).await;
        assert_eq!(outcomes.len(), 3);
    }

    #[tokio::test]
    async fn test_panicked_task_surfaces_as_worker_error() {
        let outcomes: Vec<Result<u32>> =
            run_batched(vec![1u32], 1, |_| async move { panic!("worker panic") }).await;

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(outcomes[0], Err(MotormapError::Worker(_))));
    }
}
