//! Per-call cancellation and deadline.

use quarry_transport::{Result, TransportError};
use std::future::{Future, pending};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

/// Cancellation token and deadline bounding one call.
///
/// The dispatcher races the round trip and the body read against both.
/// A cancelled token yields [`TransportError::Cancelled`]; an elapsed
/// deadline yields [`TransportError::DeadlineExceeded`].
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl RequestContext {
    /// Context with neither deadline nor cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bound the call to `timeout` from now. An earlier deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bound the call to an absolute deadline. An earlier deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Abort the call when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Check if the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Drive `future` to completion unless the context ends first.
    ///
    /// A context that already ended never polls `future`.
    pub async fn run<T, F>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(TransportError::Cancelled),
            () = expired => Err(TransportError::DeadlineExceeded),
            result = future => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = RequestContext::background();
        assert_eq!(ctx.run(async { Ok(7) }).await.unwrap(), 7);
        assert!(ctx.deadline().is_none());
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let ctx = RequestContext::background();
        let err = ctx
            .run(async { Err::<(), _>(TransportError::Connection("refused".into())) })
            .await
            .unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(50));
        let err = ctx.run(pending::<Result<()>>()).await.unwrap_err();
        assert!(matches!(err, TransportError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_cancelled_context_never_polls() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::background().with_cancellation(token);
        let polled = Arc::new(AtomicBool::new(false));

        let flag = polled.clone();
        let err = ctx
            .run(async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Cancelled));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_in_flight_call() {
        let token = CancellationToken::new();
        let ctx = RequestContext::background().with_cancellation(token.clone());

        let trigger = async {
            tokio::task::yield_now().await;
            token.cancel();
        };
        let (result, ()) = tokio::join!(ctx.run(pending::<Result<()>>()), trigger);

        assert!(matches!(result, Err(TransportError::Cancelled)));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = RequestContext::background()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(10));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
