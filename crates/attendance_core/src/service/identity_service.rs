//! Identity store: mock login against the fixed roster plus session state.
//!
//! # Responsibility
//! - Match email/password pairs against the credential roster.
//! - Track and persist the single active session.
//!
//! # Invariants
//! - Failed logins never change session state.
//! - Unknown email and wrong password produce the same error.
//! - The persisted session never contains a password.

use crate::model::user::{Credential, Role, User};
use crate::repo::kv_repo::KvRepository;
use crate::repo::state_repo::{StateError, StateRepository};
use crate::seed;
use crate::service::notify::{SubscriptionId, Subscribers};
use crate::service::PersistenceMode;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug)]
pub enum IdentityError {
    InvalidCredentials,
    NotAuthenticated,
    Forbidden { required: Role, actual: Role },
    /// Session change is applied in memory but could not be written.
    Storage(StateError),
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::NotAuthenticated => write!(f, "no active session"),
            Self::Forbidden { required, actual } => write!(
                f,
                "role `{}` required, session has `{}`",
                required.as_str(),
                actual.as_str()
            ),
            Self::Storage(err) => write!(f, "session not persisted: {err}"),
        }
    }
}

impl Error for IdentityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    SessionStarted(User),
    SessionEnded,
    /// Session writes stopped (`MemoryOnly`) or resumed (`Durable`).
    PersistenceChanged(PersistenceMode),
}

/// Session owner.
///
/// In `MemoryOnly` mode session changes succeed without being written; see
/// [`IdentityStore::persistence_mode`] and `IdentityEvent::PersistenceChanged`.
pub struct IdentityStore<R: KvRepository> {
    state: StateRepository<R>,
    roster: &'static [Credential],
    current: Option<User>,
    mode: PersistenceMode,
    subscribers: Subscribers<IdentityEvent>,
}

impl<R: KvRepository> IdentityStore<R> {
    /// Opens the store with the built-in roster and restores the last session.
    pub fn open(repo: R) -> Self {
        Self::with_roster(repo, seed::CREDENTIALS)
    }

    /// Opens the store with a caller-provided roster.
    ///
    /// A stored session that cannot be read is logged and dropped; startup
    /// continues without a session.
    pub fn with_roster(repo: R, roster: &'static [Credential]) -> Self {
        let state = StateRepository::new(repo);
        let (current, mode) = match state.load_session() {
            Ok(current) => (current, PersistenceMode::Durable),
            Err(StateError::Corrupt { .. }) => {
                warn!("event=session_restore module=identity status=error error_code=session_corrupt");
                (None, PersistenceMode::Durable)
            }
            Err(err) => {
                error!(
                    "event=session_restore module=identity status=error error_code=storage_unavailable error={}",
                    err
                );
                (None, PersistenceMode::MemoryOnly)
            }
        };

        if let Some(user) = &current {
            info!(
                "event=session_restore module=identity status=ok user_id={} role={}",
                user.id,
                user.role.as_str()
            );
        }

        Self {
            state,
            roster,
            current,
            mode,
            subscribers: Subscribers::new(),
        }
    }

    /// Starts a session for a roster match.
    ///
    /// # Errors
    /// - `InvalidCredentials` when no roster entry matches exactly.
    /// - `Storage` when the session could not be persisted; the session is
    ///   still active in memory.
    pub fn authenticate(&mut self, email: &str, password: &str) -> IdentityResult<User> {
        let roster = self.roster;
        let Some(credential) = roster
            .iter()
            .find(|credential| credential.matches(email, password))
        else {
            info!("event=login module=identity status=rejected");
            return Err(IdentityError::InvalidCredentials);
        };

        let user = credential.to_user();
        self.current = Some(user.clone());
        info!(
            "event=login module=identity status=ok user_id={} role={}",
            user.id,
            user.role.as_str()
        );
        self.subscribers
            .notify(&IdentityEvent::SessionStarted(user.clone()));
        self.persist()?;
        Ok(user)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Returns the session user when it has `role`.
    pub fn require_role(&self, role: Role) -> IdentityResult<&User> {
        let user = self.current.as_ref().ok_or(IdentityError::NotAuthenticated)?;
        if user.role != role {
            return Err(IdentityError::Forbidden {
                required: role,
                actual: user.role,
            });
        }
        Ok(user)
    }

    /// Clears the session. Ending an absent session is a no-op.
    pub fn end_session(&mut self) -> IdentityResult<()> {
        let Some(user) = self.current.take() else {
            return Ok(());
        };
        info!("event=logout module=identity status=ok user_id={}", user.id);
        self.subscribers.notify(&IdentityEvent::SessionEnded);
        self.persist()
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        self.mode
    }

    /// Retries the session write and returns to durable mode on success.
    pub fn flush(&mut self) -> IdentityResult<()> {
        self.write_session()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&IdentityEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn persist(&mut self) -> IdentityResult<()> {
        if self.mode == PersistenceMode::MemoryOnly {
            return Ok(());
        }
        self.write_session()
    }

    fn write_session(&mut self) -> IdentityResult<()> {
        if let Err(err) = self.state.save_session(self.current.as_ref()) {
            error!(
                "event=session_persist module=identity status=error error_code=storage_write_failed error={}",
                err
            );
            self.switch_mode(PersistenceMode::MemoryOnly);
            return Err(IdentityError::Storage(err));
        }
        self.switch_mode(PersistenceMode::Durable);
        Ok(())
    }

    fn switch_mode(&mut self, mode: PersistenceMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        info!("event=persistence_mode module=identity status=ok mode={:?}", mode);
        self.subscribers
            .notify(&IdentityEvent::PersistenceChanged(mode));
    }
}

#[cfg(test)]
mod tests {
    use super::{IdentityError, IdentityStore};
    use crate::model::user::Role;
    use crate::repo::kv_repo::MemoryKvRepository;

    #[test]
    fn require_role_distinguishes_missing_and_wrong_role() {
        let kv = MemoryKvRepository::new();
        let mut store = IdentityStore::open(&kv);
        assert!(matches!(
            store.require_role(Role::Admin),
            Err(IdentityError::NotAuthenticated)
        ));

        store
            .authenticate("faculty2@college.edu", "faculty123")
            .unwrap();
        assert!(matches!(
            store.require_role(Role::Admin),
            Err(IdentityError::Forbidden {
                required: Role::Admin,
                actual: Role::Faculty
            })
        ));
        assert_eq!(store.require_role(Role::Faculty).unwrap().id, "f2");
    }
}
