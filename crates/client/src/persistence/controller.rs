use chrono::Utc;
use profitwise_core::{
    classify,
    constants::{BACKUP_FILE_PREFIX, DEFAULT_DEBOUNCE_MS},
    DashboardError, ErrorContext, ExportedFile, PersistenceState, RawFailure, Result,
};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::StateStore;

const COMPONENT: &str = "PersistenceController";

/// Result of a save request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The state was written to the store
    Saved,
    /// The state matched the last queued payload; nothing was written
    Unchanged,
}

/// A debounced save waiting for its timer
struct Pending {
    generation: u64,
    state: PersistenceState,
    timer: JoinHandle<()>,
}

struct Shared<S> {
    store: Arc<S>,
    /// Canonical form of the last payload handed to the store
    last_queued: Mutex<Option<String>>,
    pending: Mutex<Option<Pending>>,
    generation: AtomicU64,
    /// Serializes writes so each save sees the previous save's marker
    in_flight: tokio::sync::Mutex<()>,
}

impl<S: StateStore> Shared<S> {
    async fn save(&self, state: &PersistenceState) -> Result<SaveOutcome> {
        let context = ErrorContext::new(COMPONENT, "saveState");
        let _in_flight = self.in_flight.lock().await;

        let canonical = state
            .canonical_json()
            .map_err(|e| classify(RawFailure::from(e), &context))?;

        {
            let mut last = lock(&self.last_queued);
            if last.as_deref() == Some(canonical.as_str()) {
                trace!("Dashboard state unchanged, skipping save");
                return Ok(SaveOutcome::Unchanged);
            }
            *last = Some(canonical.clone());
        }

        let mut stamped = state.clone();
        stamped.last_updated = Some(Utc::now());

        match self.store.save_state(&stamped).await {
            Ok(()) => {
                debug!(section = %stamped.active_section, "Dashboard state saved");
                Ok(SaveOutcome::Saved)
            }
            Err(error) => {
                let mut last = lock(&self.last_queued);
                if last.as_deref() == Some(canonical.as_str()) {
                    *last = None;
                }
                Err(error)
            }
        }
    }

    /// Timer callback; a superseded generation does nothing
    async fn fire(&self, generation: u64) {
        let state = {
            let mut pending = lock(&self.pending);
            if pending.as_ref().map(|p| p.generation) == Some(generation) {
                pending.take().map(|p| p.state)
            } else {
                None
            }
        };

        if let Some(state) = state {
            if let Err(error) = self.save(&state).await {
                warn!(
                    category = %error.category(),
                    error = %error.message(),
                    "Failed to save dashboard state"
                );
            }
        }
    }

    fn take_pending(&self) -> Option<Pending> {
        lock(&self.pending).take()
    }
}

/// Debounced, deduplicating persistence of [`PersistenceState`].
///
/// Dropping the controller cancels a pending debounced save.
pub struct PersistenceController<S: StateStore> {
    shared: Arc<Shared<S>>,
    debounce: Duration,
}

impl<S: StateStore> PersistenceController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_debounce(store, Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn with_debounce(store: Arc<S>, debounce: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                last_queued: Mutex::new(None),
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
                in_flight: tokio::sync::Mutex::new(()),
            }),
            debounce,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.shared.store
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Whether a debounced save is waiting for its timer
    pub fn is_pending(&self) -> bool {
        lock(&self.shared.pending).is_some()
    }

    /// Schedule a save of `state` after the debounce window. A call while a
    /// save is pending replaces its payload and restarts the timer.
    ///
    /// Must be called from within a Tokio runtime; outside one the request
    /// is dropped with a warning.
    pub fn debounced_save(&self, state: &PersistenceState) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime available, dropping debounced save");
            return;
        };

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pending = lock(&self.shared.pending);
        if let Some(previous) = pending.take() {
            previous.timer.abort();
            trace!(generation = previous.generation, "Debounce timer restarted");
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.debounce;
        let timer = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            shared.fire(generation).await;
        });

        *pending = Some(Pending {
            generation,
            state: state.clone(),
            timer,
        });
    }

    /// Save immediately, unless the payload equals the last queued one
    pub async fn save(&self, state: &PersistenceState) -> Result<SaveOutcome> {
        self.shared.save(state).await
    }

    /// Run a pending debounced save now. `None` when nothing was pending.
    pub async fn flush(&self) -> Result<Option<SaveOutcome>> {
        match self.shared.take_pending() {
            Some(pending) => {
                pending.timer.abort();
                self.shared.save(&pending.state).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Drop a pending debounced save. Returns whether one was pending.
    pub fn cancel_pending(&self) -> bool {
        match self.shared.take_pending() {
            Some(pending) => {
                pending.timer.abort();
                debug!("Pending dashboard state save cancelled");
                true
            }
            None => false,
        }
    }

    /// Saved state, or `None` when nothing is stored or loading failed
    pub async fn load(&self) -> Option<PersistenceState> {
        match self.shared.store.load_state().await {
            Ok(state) => state,
            Err(error) => {
                warn!(
                    category = %error.category(),
                    error = %error.message(),
                    "Failed to load dashboard state"
                );
                None
            }
        }
    }

    /// Backup of the stored state as `profitwise-backup-<date>.json`
    pub async fn export_data(&self) -> Result<ExportedFile> {
        let context = ErrorContext::new(COMPONENT, "exportData");
        let data = self.shared.store.export_state().await?;

        let file = ExportedFile::json(BACKUP_FILE_PREFIX, &data)
            .map_err(|e| classify(RawFailure::from(e), &context))?;
        debug!(filename = %file.filename, bytes = file.contents.len(), "Dashboard data exported");
        Ok(file)
    }

    /// Restore from a backup document and return the imported state, which
    /// replaces whatever the caller currently displays.
    pub async fn import_data(&self, bytes: &[u8]) -> Result<PersistenceState> {
        let context = ErrorContext::new(COMPONENT, "importData");

        let data: Value = serde_json::from_slice(bytes).map_err(|e| {
            DashboardError::validation(
                format!("Backup file is not valid JSON: {e}"),
                Some("file"),
                context.clone(),
            )
        })?;
        if !data.is_object() {
            return Err(DashboardError::validation(
                "Backup file must contain a JSON object",
                Some("file"),
                context,
            ));
        }
        let state: PersistenceState = serde_json::from_value(data.clone()).map_err(|e| {
            DashboardError::validation(
                format!("Backup file does not describe a dashboard state: {e}"),
                Some("file"),
                context.clone(),
            )
        })?;

        self.shared.store.import_state(&data).await?;

        // The store now holds exactly this state
        if let Ok(canonical) = state.canonical_json() {
            *lock(&self.shared.last_queued) = Some(canonical);
        }

        debug!(section = %state.active_section, "Dashboard data imported");
        Ok(state)
    }

    pub async fn import_file(&self, path: impl AsRef<Path>) -> Result<PersistenceState> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DashboardError::validation(
                format!("Could not read {}: {e}", path.display()),
                Some("file"),
                ErrorContext::new(COMPONENT, "importData"),
            )
        })?;
        self.import_data(&bytes).await
    }
}

impl<S: StateStore> Drop for PersistenceController<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
