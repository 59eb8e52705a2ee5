//! Note store calls with rate-limit handling.
//!
//! Two policies exist because the calls differ in cost. Tag lookup and
//! catalog pages are rare, so a rate limit there is handed back to the
//! caller. Per-note fetches and updates are frequent: a rate limit there is
//! waited out and the note is given up for this pass, without reissuing the
//! call.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::Result;
use crate::remote::RemoteResult;

/// Rate limits are returned to the caller as [`crate::RedateError::RateLimited`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Propagate;

/// Rate limits are slept through (signaled cooldown plus `margin`) and
/// reported as [`Invocation::CooledDown`].
#[derive(Debug, Clone, Copy)]
pub struct CooldownAndSkip {
    pub margin: Duration,
}

/// Result of a [`CooldownAndSkip`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation<T> {
    Completed(T),
    /// The call was rate limited and the cooldown has been slept through.
    CooledDown { waited: Duration },
}

/// Awaits note store calls once, applying the rate-limit policy `P`.
#[derive(Debug, Clone)]
pub struct RateLimitedInvoker<P> {
    policy: P,
}

impl<P> RateLimitedInvoker<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }
}

impl RateLimitedInvoker<Propagate> {
    /// Errors, rate limits included, propagate unchanged.
    pub async fn invoke<T, Fut>(&self, operation: &str, call: Fut) -> Result<T>
    where
        Fut: Future<Output = RemoteResult<T>>,
    {
        call.await.map_err(|err| {
            if let Some(duration_secs) = err.rate_limit_duration() {
                warn!(
                    operation,
                    duration_secs,
                    minutes = duration_secs / 60,
                    "Rate limited, aborting"
                );
            }
            err.into()
        })
    }
}

impl RateLimitedInvoker<CooldownAndSkip> {
    /// Errors other than rate limits propagate unchanged.
    pub async fn invoke<T, Fut>(&self, operation: &str, call: Fut) -> Result<Invocation<T>>
    where
        Fut: Future<Output = RemoteResult<T>>,
    {
        let err = match call.await {
            Ok(value) => return Ok(Invocation::Completed(value)),
            Err(err) => err,
        };

        let Some(duration_secs) = err.rate_limit_duration() else {
            return Err(err.into());
        };

        let waited = Duration::from_secs(duration_secs) + self.policy.margin;
        warn!(
            operation,
            duration_secs,
            minutes = duration_secs / 60,
            wait_secs = waited.as_secs(),
            "Rate limited, cooling down"
        );
        tokio::time::sleep(waited).await;
        Ok(Invocation::CooledDown { waited })
    }
}
