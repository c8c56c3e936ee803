//! In-flight submit tracking
//!
//! Each submit attempt holds a ticket carrying a fresh token. Only the
//! attempt whose token is current may write into the form or report a
//! result; the [`SubmitPolicy`] decides what a new submit does while
//! another one is running.

use crate::error::FormError;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// What a submit does while another submit is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitPolicy {
    /// Fail the new submit with [`FormError::SubmitInFlight`]
    #[default]
    Reject,
    /// Start the new submit; the older one turns stale
    Supersede,
    /// Wait for the running submit to finish first
    Queue,
}

impl SubmitPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reject => "reject",
            Self::Supersede => "supersede",
            Self::Queue => "queue",
        }
    }
}

type Token = Arc<Mutex<Option<Uuid>>>;

fn lock(token: &Token) -> MutexGuard<'_, Option<Uuid>> {
    token.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Issues submit tickets for one form
#[derive(Debug)]
pub struct SubmitGuard {
    policy: SubmitPolicy,
    current: Token,
    queue: Arc<AsyncMutex<()>>,
}

impl SubmitGuard {
    pub fn new(policy: SubmitPolicy) -> Self {
        Self {
            policy,
            current: Token::default(),
            queue: Arc::new(AsyncMutex::new(())),
        }
    }

    pub fn policy(&self) -> SubmitPolicy {
        self.policy
    }

    /// Start an attempt according to the policy
    pub async fn begin(&self) -> Result<SubmitTicket, FormError> {
        let permit = match self.policy {
            SubmitPolicy::Queue => Some(Arc::clone(&self.queue).lock_owned().await),
            SubmitPolicy::Reject | SubmitPolicy::Supersede => None,
        };

        let id = Uuid::new_v4();
        {
            let mut current = lock(&self.current);
            if let (SubmitPolicy::Reject, Some(running)) = (self.policy, *current) {
                tracing::info!("Rejecting submit while {running} is in flight");
                return Err(FormError::SubmitInFlight);
            }
            if let Some(previous) = current.replace(id) {
                tracing::debug!("Submit {id} supersedes {previous}");
            }
        }

        Ok(SubmitTicket {
            liveness: Liveness {
                current: Arc::clone(&self.current),
                id,
            },
            _permit: permit,
        })
    }

    /// True while some attempt holds the current token
    pub fn in_flight(&self) -> bool {
        lock(&self.current).is_some()
    }

    /// Turn any running attempt stale
    pub fn invalidate(&self) {
        if let Some(previous) = lock(&self.current).take() {
            tracing::debug!("Invalidated submit {previous}");
        }
    }
}

/// Checks whether an attempt still holds the current token
#[derive(Debug, Clone)]
pub struct Liveness {
    current: Token,
    id: Uuid,
}

impl Liveness {
    pub fn is_live(&self) -> bool {
        *lock(&self.current) == Some(self.id)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// A running submit attempt. Dropping it releases the token.
#[derive(Debug)]
pub struct SubmitTicket {
    liveness: Liveness,
    _permit: Option<OwnedMutexGuard<()>>,
}

impl SubmitTicket {
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn is_live(&self) -> bool {
        self.liveness.is_live()
    }
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        let mut current = lock(&self.liveness.current);
        if *current == Some(self.liveness.id) {
            *current = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, assert_ready_ok, task};

    mod reject {
        use super::*;

        #[tokio::test]
        async fn test_second_begin_is_rejected() {
            let guard = SubmitGuard::new(SubmitPolicy::Reject);
            let _first = guard.begin().await.unwrap();

            let second = guard.begin().await;
            assert!(matches!(second, Err(FormError::SubmitInFlight)));
        }

        #[tokio::test]
        async fn test_drop_releases_token() {
            let guard = SubmitGuard::new(SubmitPolicy::Reject);
            let first = guard.begin().await.unwrap();
            assert!(guard.in_flight());

            drop(first);
            assert!(!guard.in_flight());
            assert!(guard.begin().await.is_ok());
        }
    }

    mod supersede {
        use super::*;

        #[tokio::test]
        async fn test_newer_ticket_makes_older_stale() {
            let guard = SubmitGuard::new(SubmitPolicy::Supersede);
            let first = guard.begin().await.unwrap();
            let second = guard.begin().await.unwrap();

            assert!(!first.is_live());
            assert!(second.is_live());
        }

        #[tokio::test]
        async fn test_dropping_stale_ticket_keeps_current() {
            let guard = SubmitGuard::new(SubmitPolicy::Supersede);
            let first = guard.begin().await.unwrap();
            let second = guard.begin().await.unwrap();

            drop(first);
            assert!(second.is_live());
            assert!(guard.in_flight());
        }
    }

    mod queue {
        use super::*;

        #[test]
        fn test_second_begin_waits_for_first() {
            let guard = SubmitGuard::new(SubmitPolicy::Queue);
            let mut first = task::spawn(guard.begin());
            let first = assert_ready_ok!(first.poll());

            let mut second = task::spawn(guard.begin());
            assert_pending!(second.poll());

            drop(first);
            assert!(second.is_woken());
            let second = assert_ready!(second.poll());
            assert!(second.unwrap().is_live());
        }
    }

    #[tokio::test]
    async fn test_invalidate_makes_ticket_stale() {
        let guard = SubmitGuard::new(SubmitPolicy::Reject);
        let ticket = guard.begin().await.unwrap();
        let liveness = ticket.liveness();

        guard.invalidate();
        assert!(!ticket.is_live());
        assert!(!liveness.is_live());
        assert!(!guard.in_flight());
    }

    #[test]
    fn test_policy_deserializes_snake_case() {
        let policy: SubmitPolicy = serde_json::from_str(r#""supersede""#).unwrap();
        assert_eq!(policy, SubmitPolicy::Supersede);
        assert_eq!(SubmitPolicy::default(), SubmitPolicy::Reject);
        assert_eq!(SubmitPolicy::Queue.label(), "queue");
    }
}
