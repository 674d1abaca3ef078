//! Per-rollout session records and the store that owns them.
//!
//! Every tool call is keyed by an opaque instance id. The store is the only
//! owner of session state; callers get cloned snapshots or run a closure
//! under the lock, never a reference that outlives it.

use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// State carried across the tool calls of one rollout.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcSession {
    /// Last submitted expression text, empty until the first call.
    pub expression: String,
    /// Value of the last successful evaluation, `None` until one succeeds.
    pub result: Option<f64>,
    /// Ground-truth answer fixed at creation. Without one, every tiered
    /// score is 0.0.
    pub target: Option<f64>,
    /// Tiered score of the most recent call, overwritten every time.
    pub reward: f64,
}

impl CalcSession {
    fn new(target: Option<f64>) -> Self {
        Self {
            expression: String::new(),
            result: None,
            target,
            reward: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no session with id '{0}'")]
    NotFound(String),
}

/// Keyed store of live sessions.
///
/// A single mutex over the whole map is deliberate: calls within one
/// session must observe each other's writes in order, and calls across
/// sessions only contend for the few instructions a lookup takes.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, CalcSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its id.
    ///
    /// A caller-supplied id is used as-is; otherwise a fresh v4 UUID is
    /// generated. Creating an id that already exists replaces the old
    /// record.
    pub fn create(&self, instance_id: Option<&str>, target: Option<f64>) -> String {
        let id = match instance_id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        self.sessions
            .lock()
            .insert(id.clone(), CalcSession::new(target));
        id
    }

    /// Snapshot of one session's state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id was never created or has
    /// been released.
    pub fn get(&self, instance_id: &str) -> Result<CalcSession, StoreError> {
        self.sessions
            .lock()
            .get(instance_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(instance_id.to_string()))
    }

    /// Run `f` on one session under the store lock.
    ///
    /// This is the mutation primitive: everything `f` reads and writes is
    /// a single atomic step with respect to all other store calls.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id was never created or has
    /// been released; `f` is not run in that case.
    pub fn with_session<T>(
        &self,
        instance_id: &str,
        f: impl FnOnce(&mut CalcSession) -> T,
    ) -> Result<T, StoreError> {
        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(instance_id)
            .ok_or_else(|| StoreError::NotFound(instance_id.to_string()))?;
        Ok(f(session))
    }

    /// Drop a session's state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id was never created or has
    /// already been released.
    pub fn release(&self, instance_id: &str) -> Result<(), StoreError> {
        if self.sessions.lock().remove(instance_id).is_some() {
            Ok(())
        } else {
            Err(StoreError::NotFound(instance_id.to_string()))
        }
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}
