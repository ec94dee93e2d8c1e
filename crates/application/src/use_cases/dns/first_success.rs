use futures::stream::{self, StreamExt};
use std::future::{self, Future};
use std::pin::pin;

/// Runs `attempt` over `candidates` one at a time, in order, and yields the
/// first `Ok` value.
///
/// Attempts are strictly sequential: the next candidate is only tried once the
/// previous attempt has failed, and nothing after the first success is polled.
/// Returns `None` when every attempt failed or `candidates` was empty.
pub async fn first_success<I, F, Fut, T, E>(candidates: I, attempt: F) -> Option<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let successes = stream::iter(candidates)
        .then(attempt)
        .filter_map(|outcome| future::ready(outcome.ok()));

    pin!(successes).next().await
}
