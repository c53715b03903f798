//! Deadline for a single invocation.
//!
//! The invocation is spawned onto the runtime and raced against a timer that
//! starts when the guard is entered. If the timer wins, the task handle is
//! dropped and the invocation keeps running detached; its eventual result is
//! discarded. Whether the work behind it can be stopped at all is up to the
//! [`Invoker`](super::Invoker) implementation.

use super::invoker::HandlerError;
use super::result::InvocationError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Effective timeout for a raw `--timeout` value.
///
/// Leading whitespace and trailing garbage are tolerated (`"5s"` is 5). Only
/// strictly positive integers override the default; missing, zero, negative,
/// non-numeric and out-of-range values all give [`DEFAULT_TIMEOUT_SECONDS`].
pub fn effective_timeout(input: Option<&str>) -> u64 {
    input
        .and_then(parse_leading_integer)
        .filter(|&seconds| seconds > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
}

/// Parses the leading decimal integer of `input`; negatives map to `None`.
fn parse_leading_integer(input: &str) -> Option<u64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let value: u64 = rest[..end].parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    Some(value)
}

/// Race `invocation` against the timeout derived from `timeout`.
pub async fn race_with_timeout<T, F>(invocation: F, timeout: Option<&str>) -> Result<T, InvocationError>
where
    F: Future<Output = Result<T, HandlerError>> + Send + 'static,
    T: Send + 'static,
{
    race_with_deadline(invocation, effective_timeout(timeout)).await
}

/// Race `invocation` against a deadline of `seconds`.
pub async fn race_with_deadline<T, F>(invocation: F, seconds: u64) -> Result<T, InvocationError>
where
    F: Future<Output = Result<T, HandlerError>> + Send + 'static,
    T: Send + 'static,
{
    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    let handle = tokio::spawn(invocation);
    debug!(seconds, "Invocation started under deadline");

    tokio::select! {
        joined = handle => match joined {
            Ok(result) => result.map_err(InvocationError::Handler),
            Err(e) => Err(InvocationError::Handler(HandlerError::new(format!(
                "Handler task failed: {}",
                e
            )))),
        },
        _ = deadline => {
            warn!(seconds, "Invocation timed out; abandoning it");
            Err(InvocationError::Timeout { seconds })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn positive_integers_override_default() {
        assert_eq!(effective_timeout(Some("1")), 1);
        assert_eq!(effective_timeout(Some("30")), 30);
        assert_eq!(effective_timeout(Some(" 12")), 12);
        assert_eq!(effective_timeout(Some("5s")), 5);
        assert_eq!(effective_timeout(Some("+3")), 3);
    }

    #[test]
    fn everything_else_uses_default() {
        for input in [None, Some("0"), Some("-5"), Some("abc"), Some(""), Some("-0"), Some("s5")] {
            assert_eq!(effective_timeout(input), DEFAULT_TIMEOUT_SECONDS, "{:?}", input);
        }
        assert_eq!(
            effective_timeout(Some("99999999999999999999999")),
            DEFAULT_TIMEOUT_SECONDS
        );
    }

    #[tokio::test]
    async fn fast_invocation_wins() {
        let result = race_with_timeout(async { Ok::<_, HandlerError>(42) }, Some("5")).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn handler_error_is_not_a_timeout() {
        let result =
            race_with_timeout(async { Err::<(), _>(HandlerError::new("bad input")) }, None).await;
        match result {
            Err(InvocationError::Handler(e)) => assert_eq!(e.message, "bad input"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn deadline_wins_over_pending_invocation() {
        let started = Instant::now();
        let result =
            race_with_timeout(std::future::pending::<Result<(), HandlerError>>(), Some("1")).await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out after 1 seconds"));
        assert!(err.to_string().contains("15 minutes"));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(900), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn late_success_does_not_change_reported_timeout() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let slow = async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, HandlerError>("late")
        };

        let result = race_with_deadline(slow, 1).await;
        assert!(result.unwrap_err().is_timeout());

        // The abandoned invocation still runs to completion in the background.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn panicking_handler_reports_handler_error() {
        let result = race_with_deadline(
            async {
                if true {
                    panic!("handler blew up");
                }
                Ok::<(), HandlerError>(())
            },
            5,
        )
        .await;
        assert!(matches!(result, Err(InvocationError::Handler(_))));
    }

    proptest! {
        #[test]
        fn any_positive_integer_is_used(n in 1u64..=86_400) {
            prop_assert_eq!(effective_timeout(Some(n.to_string().as_str())), n);
        }

        #[test]
        fn any_negative_integer_falls_back(n in 1u64..=86_400) {
            prop_assert_eq!(effective_timeout(Some(format!("-{}", n).as_str())), DEFAULT_TIMEOUT_SECONDS);
        }
    }
}
