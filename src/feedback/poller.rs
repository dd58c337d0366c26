use super::result::{classify, Classified, FeedbackResult, FeedbackState, FETCH_FAILED_MESSAGE};
use crate::config::FeedbackConfig;
use crate::error::{CastingFitError, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Where finished-call feedback comes from
#[async_trait::async_trait]
pub trait FeedbackSource: Send + Sync {
    async fn call_feedback(&self, call_id: &str) -> Result<Value>;
}

/// Lets a poll outlive its session without writing into a newer one.
///
/// A guard is current while its owner is alive and no newer session has
/// started since the guard was taken.
#[derive(Debug, Clone)]
pub struct SessionGuard {
    alive: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    expected: u64,
}

impl SessionGuard {
    pub fn new(alive: Arc<AtomicBool>, generation: Arc<AtomicU64>) -> Self {
        let expected = generation.load(Ordering::SeqCst);
        Self {
            alive,
            generation,
            expected,
        }
    }

    /// A guard nothing can invalidate
    pub fn detached() -> Self {
        Self::new(Arc::new(AtomicBool::new(true)), Arc::new(AtomicU64::new(0)))
    }

    pub fn is_current(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == self.expected
    }
}

enum Attempt {
    Settled(FeedbackResult),
    Pending,
    Failed(CastingFitError),
}

/// Polls the feedback source until a result settles or retries run out
pub struct FeedbackPoller {
    source: Arc<dyn FeedbackSource>,
    state: Arc<watch::Sender<FeedbackState>>,
    retry_delay: Duration,
    guard: SessionGuard,
}

impl FeedbackPoller {
    pub fn new(
        source: Arc<dyn FeedbackSource>,
        state: Arc<watch::Sender<FeedbackState>>,
        config: &FeedbackConfig,
    ) -> Self {
        Self {
            source,
            state,
            retry_delay: config.retry_delay(),
            guard: SessionGuard::detached(),
        }
    }

    pub fn with_guard(mut self, guard: SessionGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Retrieve feedback for `identifier`, publishing every state change.
    ///
    /// Empty, still-processing and transiently failed attempts are retried
    /// after the configured delay while `retries_remaining` lasts. A poll whose session
    /// was torn down or replaced stops without publishing.
    pub async fn fetch(&self, identifier: &str, retries_remaining: u32) {
        let mut retries = retries_remaining;
        self.publish(FeedbackState::Loading {
            retries_remaining: retries,
        });

        loop {
            if !self.guard.is_current() {
                debug!("Dropping stale feedback poll for {}", identifier);
                return;
            }

            let attempt = match self.source.call_feedback(identifier).await {
                Ok(value) => match classify(&value) {
                    Classified::Pending => Attempt::Pending,
                    Classified::Settled(result) => Attempt::Settled(result),
                },
                Err(e) => Attempt::Failed(e),
            };

            if !self.guard.is_current() {
                debug!("Session gone while fetching feedback for {}", identifier);
                return;
            }

            let terminal = match attempt {
                Attempt::Settled(result) => {
                    info!("Feedback ready for {}", identifier);
                    self.publish(FeedbackState::Ready { result });
                    return;
                }
                Attempt::Pending => {
                    debug!("Feedback for {} not ready ({} retries left)", identifier, retries);
                    FeedbackResult::Empty
                }
                Attempt::Failed(e) => {
                    warn!("Failed to fetch feedback for {}: {} ({} retries left)", identifier, e, retries);
                    if !e.is_retriable() {
                        self.publish(FeedbackState::Ready {
                            result: FeedbackResult::Error(FETCH_FAILED_MESSAGE.to_string()),
                        });
                        return;
                    }
                    FeedbackResult::Error(FETCH_FAILED_MESSAGE.to_string())
                }
            };

            if retries == 0 {
                info!("Giving up on feedback for {}", identifier);
                self.publish(FeedbackState::Ready { result: terminal });
                return;
            }

            retries -= 1;
            self.publish(FeedbackState::Loading {
                retries_remaining: retries,
            });
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    fn publish(&self, state: FeedbackState) {
        self.state.send_replace(state);
    }
}
