//! Consecutive-failure breaker in front of upstream price fetches.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::cache::{Clock, SystemClock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// How long an open circuit refuses requests before one trial.
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed { failures: u32 },
    Open { retry_at: Instant },
    /// A single trial request is out; its outcome decides the next phase.
    Trial,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    phase: Mutex<Phase>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            phase: Mutex::new(Phase::Closed { failures: 0 }),
        }
    }

    fn update<R>(&self, step: impl FnOnce(&mut Phase) -> R) -> R {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        step(&mut phase)
    }

    /// Whether a fetch may go upstream now. Once the open timeout lapses a
    /// single trial is let through; others wait for its outcome.
    pub fn allow_request(&self) -> bool {
        let now = self.clock.now();
        self.update(|phase| match *phase {
            Phase::Closed { .. } => true,
            Phase::Open { retry_at } if now >= retry_at => {
                *phase = Phase::Trial;
                true
            }
            Phase::Open { .. } | Phase::Trial => false,
        })
    }

    pub fn record_success(&self) {
        self.update(|phase| {
            if matches!(phase, Phase::Trial) {
                info!("circuit breaker closed after successful trial");
            }
            *phase = Phase::Closed { failures: 0 };
        });
    }

    pub fn record_failure(&self) {
        let retry_at = self.clock.now() + self.config.open_timeout;
        let threshold = self.config.failure_threshold;
        self.update(|phase| {
            let failures = match *phase {
                Phase::Closed { failures } => failures.saturating_add(1),
                Phase::Open { .. } | Phase::Trial => threshold,
            };
            if failures < threshold {
                *phase = Phase::Closed { failures };
                return;
            }
            if !matches!(phase, Phase::Open { .. }) {
                warn!(failures, "circuit breaker opened");
            }
            *phase = Phase::Open { retry_at };
        });
    }

    pub fn state(&self) -> CircuitState {
        self.update(|phase| match phase {
            Phase::Closed { .. } => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::Trial => CircuitState::HalfOpen,
        })
    }
}
