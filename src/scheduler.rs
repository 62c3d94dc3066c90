//! Bounded fan-out for independent feed fetches.

use std::future::Future;

use futures_util::stream::{self, StreamExt};

/// Run `tasks` with at most `limit` in flight, returning results in task
/// order.
///
/// Slots refill as soon as any task finishes, so one slow task never holds
/// back the rest of a batch. `limit` is raised to 1 if zero; a limit above
/// `tasks.len()` simply runs everything at once. All tasks are polled on the
/// caller's task; nothing is spawned.
pub async fn run_bounded<T, F, Fut>(tasks: Vec<F>, limit: usize) -> Vec<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let n = tasks.len();
    let limit = limit.max(1).min(n.max(1));

    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(n).collect();
    let mut completed = stream::iter(tasks.into_iter().enumerate())
        .map(|(i, task)| async move { (i, task().await) })
        .buffer_unordered(limit);

    while let Some((i, result)) = completed.next().await {
        slots[i] = Some(result);
    }

    // buffer_unordered drives every task to completion, so every slot is filled.
    slots.into_iter().flatten().collect()
}
