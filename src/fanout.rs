use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::future::Future;

/// Upper bound on concurrently running upstream reads for a single request.
pub const MAX_IN_FLIGHT: usize = 4;

/// Runs a set of independent fallible reads and waits for all of them.
///
/// At most [`MAX_IN_FLIGHT`] futures are polled at once. Results come back in
/// the order the operations were given. The first error is returned as soon
/// as it is observed and every operation still pending is dropped, which
/// cancels its in-flight request. There is no partial result.
///
/// Reads of different types are joined with `tokio::try_join!` instead, which
/// has the same all-or-first-error contract.
pub async fn try_join_bounded<I, F, T, E>(operations: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    let mut waiting = operations.into_iter().enumerate();
    let mut in_flight = FuturesUnordered::new();
    let mut results: Vec<(usize, T)> = Vec::new();

    loop {
        while in_flight.len() < MAX_IN_FLIGHT {
            let Some((index, operation)) = waiting.next() else {
                break;
            };
            in_flight.push(async move { operation.await.map(|value| (index, value)) });
        }

        match in_flight.next().await {
            Some(result) => results.push(result?),
            None => break,
        }
    }

    results.sort_unstable_by_key(|(index, _)| *index);

    Ok(results.into_iter().map(|(_, value)| value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let operations = (1..=6).map(|n| async move {
            // later operations finish first
            for _ in 0..(6 - n) {
                tokio::task::yield_now().await;
            }
            Ok::<_, String>(n * 10)
        });

        let results = try_join_bounded(operations).await;

        assert_eq!(results, Ok(vec![10, 20, 30, 40, 50, 60]));
    }

    #[tokio::test]
    async fn test_first_error_does_not_wait_for_pending_siblings() {
        let never = Box::pin(async {
            std::future::pending::<()>().await;
            Ok::<u32, String>(1)
        }) as std::pin::Pin<Box<dyn Future<Output = Result<u32, String>> + Send>>;
        let fails = Box::pin(async { Err::<u32, String>("case 2 not found".to_string()) })
            as std::pin::Pin<Box<dyn Future<Output = Result<u32, String>> + Send>>;

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            try_join_bounded(vec![never, fails]),
        )
        .await
        .expect("fan-out should fail fast");

        assert_eq!(result, Err("case 2 not found".to_string()));
    }

    #[tokio::test]
    async fn test_pending_operations_are_dropped_on_error() {
        let finished = Arc::new(AtomicUsize::new(0));

        let operations = (0..3).map(|n| {
            let finished = finished.clone();
            async move {
                if n == 0 {
                    return Err("teams unavailable");
                }
                std::future::pending::<()>().await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok(n)
            }
        });

        let result = try_join_bounded(operations).await;

        assert_eq!(result, Err("teams unavailable"));
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_never_exceeds_max_in_flight() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let operations = (0..20).map(|n| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                for _ in 0..3 {
                    tokio::task::yield_now().await;
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, ()>(n)
            }
        });

        let results = try_join_bounded(operations).await.unwrap();

        assert_eq!(results.len(), 20);
        assert!(peak.load(Ordering::SeqCst) <= MAX_IN_FLIGHT);
    }

    #[tokio::test]
    async fn test_empty_input_is_ok() {
        let operations: Vec<std::future::Ready<Result<u32, ()>>> = Vec::new();

        assert_eq!(try_join_bounded(operations).await, Ok(vec![]));
    }
}
