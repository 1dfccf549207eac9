//! When and how long to wait before sending a request again.

use std::time::Duration;

use crate::TransportError;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Statuses a cluster answers with while a node is restarting or overloaded.
const RETRYABLE_STATUSES: [u16; 3] = [502, 503, 504];

/// Upper bound for any computed delay.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Retry policy for one transport.
///
/// A request is attempted at most `max_retries + 1` times. Connection-level
/// failures are retried, timeouts only with `retry_on_timeout`, and a
/// response is retried only when its status is listed in `retry_on_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait between attempts.
    pub backoff: Backoff,
    /// Statuses that send the request again.
    pub retry_on_status: Vec<u16>,
    /// Retry requests that timed out.
    pub retry_on_timeout: bool,
    /// Never retry.
    pub disabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::Immediate,
            retry_on_status: RETRYABLE_STATUSES.to_vec(),
            retry_on_timeout: false,
            disabled: false,
        }
    }
}

impl RetryConfig {
    /// Double the wait after every attempt, starting at `base`.
    pub fn exponential(max_retries: u32, base: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential {
                base,
                cap: MAX_DELAY,
            },
            ..Self::default()
        }
    }

    /// Grow the wait by `step` after every attempt.
    pub fn linear(max_retries: u32, step: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Linear {
                step,
                cap: MAX_DELAY,
            },
            ..Self::default()
        }
    }

    /// Wait the same `delay` before every retry.
    pub fn constant(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(delay),
            ..Self::default()
        }
    }

    /// Send every request exactly once.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }

    /// Replace the statuses that send the request again.
    pub fn with_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.retry_on_status = codes;
        self
    }

    /// Also retry requests that timed out.
    pub fn with_retry_on_timeout(mut self) -> Self {
        self.retry_on_timeout = true;
        self
    }

    /// Attempts allowed, the first one included.
    pub fn attempts(&self) -> u32 {
        if self.disabled { 1 } else { self.max_retries.saturating_add(1) }
    }

    /// Wait before retry number `retry`, counting from 1.
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        self.backoff.delay(retry.max(1))
    }

    /// Whether a response with this status is sent again.
    pub fn should_retry_status(&self, status: u16) -> bool {
        !self.disabled && self.retry_on_status.contains(&status)
    }

    /// Whether a request that failed with this error is sent again.
    pub fn should_retry_error(&self, error: &TransportError) -> bool {
        match error {
            _ if self.disabled || !error.is_network() => false,
            _ if error.is_timeout() => self.retry_on_timeout,
            _ => true,
        }
    }
}

/// Wait between two attempts of the same request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry right away.
    Immediate,
    /// Same wait every time.
    Fixed(Duration),
    /// `step`, `2 * step`, `3 * step` and so on, up to `cap`.
    Linear {
        /// Growth per retry.
        step: Duration,
        /// Longest wait.
        cap: Duration,
    },
    /// `base`, `2 * base`, `4 * base` and so on, up to `cap`.
    Exponential {
        /// First wait.
        base: Duration,
        /// Longest wait.
        cap: Duration,
    },
}

impl Backoff {
    /// Wait before retry number `retry`, counting from 1.
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Self::Immediate => Duration::ZERO,
            Self::Fixed(delay) => delay,
            Self::Linear { step, cap } => step.saturating_mul(retry).min(cap),
            Self::Exponential { base, cap } => {
                let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
                base.saturating_mul(factor).min(cap)
            }
        }
    }
}
