//! Bounded fan-out with a full join.
//!
//! Tasks are spawned onto a [`JoinSet`] gated by a semaphore. Every task is
//! awaited before results are returned, failures included: callers inspect
//! the ordered results afterwards and decide what a failure means.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{Error, Result};

/// Runs `tasks` with at most `limit` in flight and returns their results in
/// submission order.
///
/// A task that panics yields [`Error::Join`] in its slot.
pub async fn run_bounded<T, Fut>(limit: usize, tasks: Vec<Fut>) -> Vec<Result<T>>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let total = tasks.len();
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut join_set: JoinSet<(usize, Result<T>)> = JoinSet::new();
    let mut slots: Vec<Option<Result<T>>> = (0..total).map(|_| None).collect();
    let mut join_errors = Vec::new();

    for (index, task) in tasks.into_iter().enumerate() {
        // The semaphore is never closed, so acquisition only fails if it is dropped.
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                slots[index] = Some(Err(Error::Scheduling(format!("semaphore closed: {e}"))));
                continue;
            }
        };

        join_set.spawn(async move {
            let _permit = permit;
            (index, task.await)
        });
    }

    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(join_err) => join_errors.push(join_err),
        }
    }

    slots
        .into_iter()
        .map(|slot| match slot {
            Some(result) => result,
            None => Err(missing_result(&mut join_errors)),
        })
        .collect()
}

/// Error for a slot no task filled: a recorded join failure if one is left.
fn missing_result(join_errors: &mut Vec<tokio::task::JoinError>) -> Error {
    join_errors.pop().map_or_else(
        || Error::Scheduling("task finished without a result".to_string()),
        Error::Join,
    )
}

/// Returns every value, or the first error in submission order.
pub fn first_failure<T>(results: Vec<Result<T>>) -> Result<Vec<T>> {
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_keep_submission_order() {
        let tasks: Vec<_> = (0..6u64)
            .map(|i| async move {
                // Later tasks finish first.
                tokio::time::sleep(Duration::from_millis(30 - i * 5)).await;
                Ok::<_, Error>(i)
            })
            .collect();

        let results = first_failure(run_bounded(3, tasks).await).unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, Error>(())
                }
            })
            .collect();

        run_bounded(2, tasks).await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_all_tasks_finish_despite_failure() {
        let finished = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let finished = finished.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    finished.fetch_add(1, Ordering::SeqCst);
                    if i == 1 {
                        Err(Error::transform(i, "boom"))
                    } else {
                        Ok(i)
                    }
                }
            })
            .collect();

        let results = run_bounded(2, tasks).await;
        assert_eq!(finished.load(Ordering::SeqCst), 5);
        assert!(matches!(
            first_failure(results),
            Err(Error::Transform { id, .. }) if id == "1"
        ));
    }

    #[tokio::test]
    async fn test_panicking_task_reports_join_error() {
        let tasks: Vec<std::pin::Pin<Box<dyn Future<Output = Result<u8>> + Send>>> = vec![
            Box::pin(async { Ok(1) }),
            Box::pin(async { panic!("task exploded") }),
        ];

        let results = run_bounded(2, tasks).await;
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Join(_))));
    }

    #[test]
    fn test_missing_result_is_a_scheduling_error() {
        let err = missing_result(&mut Vec::new());
        assert!(matches!(err, Error::Scheduling(_)));
        assert!(err.to_string().starts_with("Task scheduling error"));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let tasks: Vec<std::future::Ready<Result<u8>>> = Vec::new();
        assert!(run_bounded(4, tasks).await.is_empty());
    }
}
