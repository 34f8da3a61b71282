//! Shared server state.

use chrono::Utc;
use scaleplan_interface::CompletionDriver;
use scaleplan_workflow::{Stage, StageHandlers, WorkflowSession};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::debug;
use uuid::Uuid;

/// Driver shared by every handler and session.
pub type SharedDriver = Arc<dyn CompletionDriver>;

/// A backend-held workflow session.
pub(crate) struct SessionEntry {
    /// Locked for the whole of an action, so at most one call is in flight.
    pub(crate) session: Arc<Mutex<WorkflowSession<SharedDriver>>>,
    /// Observes the stage while the session is locked.
    pub(crate) stage_rx: watch::Receiver<Stage>,
    /// Milliseconds since the epoch of the last request naming this session.
    last_active_ms: AtomicI64,
}

impl SessionEntry {
    pub(crate) fn touch(&self) {
        self.last_active_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn idle_for(&self) -> Duration {
        let idle = Utc::now().timestamp_millis() - self.last_active_ms.load(Ordering::Relaxed);
        Duration::from_millis(u64::try_from(idle).unwrap_or(0))
    }
}

/// State handed to every route.
#[derive(Clone)]
pub struct AppState {
    handlers: Arc<StageHandlers<SharedDriver>>,
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionEntry>>>>,
}

impl AppState {
    /// State around one set of stage handlers.
    pub fn new(handlers: StageHandlers<SharedDriver>) -> Self {
        Self {
            handlers: Arc::new(handlers),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// The stage handlers.
    pub fn handlers(&self) -> &StageHandlers<SharedDriver> {
        &self.handlers
    }

    pub(crate) async fn create_session(&self) -> Uuid {
        let (session, stage_rx) = WorkflowSession::new(Arc::clone(&self.handlers));
        let id = Uuid::new_v4();
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(session)),
            stage_rx,
            last_active_ms: AtomicI64::new(Utc::now().timestamp_millis()),
        };
        self.sessions.write().await.insert(id, Arc::new(entry));
        id
    }

    pub(crate) async fn session(&self, id: &Uuid) -> Option<Arc<SessionEntry>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub(crate) async fn remove_session(&self, id: &Uuid) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drops sessions idle for at least `max_idle`. Sessions with an action
    /// in flight are kept. Returns how many were dropped.
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.idle_for() < max_idle || entry.session.try_lock().is_err();
            if !keep {
                debug!(session_id = %id, "Expiring idle session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
