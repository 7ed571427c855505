//! Bounded retry loop for transient store conditions.
//!
//! # Invariants
//! - An operation runs at most `RetryPolicy::max_attempts` times.
//! - Only `RepoError::is_transient()` failures are retried.
//! - Cancellation is observed before every attempt and during backoff.

use super::cancel::CancelToken;
use super::station_repo::{RepoError, RepoResult};
use crate::config::RetryPolicy;
use log::warn;

/// Outcome of a successful retried operation.
#[derive(Debug)]
pub(crate) struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Runs `operation` until it succeeds, fails permanently, or the retry
/// budget is spent. The closure receives the 1-based attempt number.
pub(crate) fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    mut operation: F,
) -> RepoResult<Attempted<T>>
where
    F: FnMut(u32) -> RepoResult<T>,
{
    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return Err(RepoError::Cancelled);
        }

        let err = match operation(attempt) {
            Ok(value) => {
                return Ok(Attempted {
                    value,
                    attempts: attempt,
                })
            }
            Err(err) => err,
        };

        let RepoError::Db(db_err) = err else {
            return Err(err);
        };
        if !db_err.is_transient() {
            return Err(RepoError::Db(db_err));
        }
        if attempt >= policy.max_attempts() {
            return Err(RepoError::RetriesExhausted {
                attempts: attempt,
                source: db_err,
            });
        }

        let backoff = policy.backoff_after(attempt);
        warn!(
            "event=station_query_retry module=repo status=retry attempt={} max_attempts={} backoff_ms={} error_code={}",
            attempt,
            policy.max_attempts(),
            backoff.as_millis(),
            db_err.code()
        );
        if !cancel.sleep(backoff) {
            return Err(RepoError::Cancelled);
        }
        attempt += 1;
    }
}
