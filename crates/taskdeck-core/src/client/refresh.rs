//! Single-flight session renewal.
//!
//! At most one `POST /auth/refresh` is in flight per coordinator. The first
//! caller to observe an expired session drives the renewal; everyone who
//! arrives while it is running parks on a oneshot channel and receives the
//! same outcome, in the order they arrived.
//!
//! The state check and the start-vs-enqueue decision happen under one
//! `std::sync::Mutex` guard that is never held across an `.await`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;

use super::endpoints::REFRESH_PATH;
use super::error::{ClientError, ClientResult};
use super::navigator::{Navigator, invalidate_session};
use super::transport::{ApiRequest, Transport};

type RefreshOutcome = ClientResult<()>;

/// A caller suspended until the in-flight renewal settles.
struct PendingCaller {
    resume: oneshot::Sender<RefreshOutcome>,
}

/// The waiting queue only exists while a renewal is running.
enum RefreshState {
    Idle,
    Refreshing(VecDeque<PendingCaller>),
}

/// What a call to `ensure_fresh_session` has to do after the state check.
enum Role {
    Leader,
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Coordinates session renewal across all requests of one client.
///
/// Construct one per process and share it (by `Arc`) with every dispatcher
/// that talks to the same session.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    navigator: Arc<dyn Navigator>,
    timeout: Option<Duration>,
}

impl RefreshCoordinator {
    /// Default bound on the renewal call.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            navigator,
            timeout: Some(Self::DEFAULT_TIMEOUT),
        }
    }

    /// Overrides the renewal timeout. `None` waits forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// True while a renewal call is in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock_state(), RefreshState::Refreshing(_))
    }

    /// Number of callers parked behind the in-flight renewal.
    pub fn waiting(&self) -> usize {
        match &*self.lock_state() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing(queue) => queue.len(),
        }
    }

    /// Makes sure the session has been renewed since the caller saw a 401.
    ///
    /// Starts a renewal if none is running, otherwise waits for the running
    /// one. Every caller of the same wave gets the same outcome.
    ///
    /// # Errors
    /// Returns a `RefreshFailed` error if the renewal call fails, times out,
    /// or is abandoned by the task driving it.
    pub async fn ensure_fresh_session<T>(&self, transport: &T) -> ClientResult<()>
    where
        T: Transport,
    {
        let role = {
            let mut state = self.lock_state();
            match &mut *state {
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing(VecDeque::new());
                    Role::Leader
                }
                RefreshState::Refreshing(queue) => {
                    let (resume, wait) = oneshot::channel();
                    queue.push_back(PendingCaller { resume });
                    tracing::debug!(position = queue.len(), "joined in-flight session renewal");
                    Role::Waiter(wait)
                }
            }
        };

        match role {
            Role::Waiter(wait) => wait
                .await
                .unwrap_or_else(|_| Err(ClientError::refresh_abandoned())),
            Role::Leader => {
                let mut guard = SettleGuard {
                    coordinator: self,
                    armed: true,
                };
                let outcome = self.renew(transport).await;
                guard.armed = false;
                self.settle(&outcome, true);
                outcome
            }
        }
    }

    async fn renew<T>(&self, transport: &T) -> RefreshOutcome
    where
        T: Transport,
    {
        tracing::info!("renewing session");
        let request = ApiRequest::post(REFRESH_PATH);
        let call = transport.send(&request);

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(ClientError::transport(format!(
                    "Session renewal timed out after {}s",
                    limit.as_secs_f32()
                ))),
            },
            None => call.await,
        };

        match result {
            Ok(_) => {
                tracing::info!("session renewed");
                Ok(())
            }
            Err(cause) => {
                tracing::warn!(kind = %cause.kind, error = %cause, "session renewal failed");
                Err(ClientError::refresh_failed(&cause))
            }
        }
    }

    /// Returns to `Idle`, then resumes every waiter in FIFO order.
    ///
    /// A failed renewal fires session invalidation once, no matter how many
    /// callers were waiting.
    fn settle(&self, outcome: &RefreshOutcome, invalidate_on_failure: bool) {
        let queue = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing(queue) => queue,
                RefreshState::Idle => VecDeque::new(),
            }
        };

        tracing::debug!(
            waiters = queue.len(),
            ok = outcome.is_ok(),
            "session renewal settled"
        );
        for caller in queue {
            // A waiter whose request was dropped has nobody to resume.
            let _ = caller.resume.send(outcome.clone());
        }

        if outcome.is_err() && invalidate_on_failure {
            invalidate_session(self.navigator.as_ref());
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refreshing", &self.is_refreshing())
            .field("waiting", &self.waiting())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Settles the renewal if the leader's future is dropped mid-flight.
///
/// Cancellation is not a verdict on the session, so waiters fail but the
/// session is not invalidated.
struct SettleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("session renewal cancelled before settling");
            self.coordinator
                .settle(&Err(ClientError::refresh_abandoned()), false);
        }
    }
}
