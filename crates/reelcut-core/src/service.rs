//! Project Service Module
//!
//! The single entry point adapters call. Owns the one in-memory aggregate
//! behind a mutex, so every mutation is a serialized read-modify-save unit:
//! the mutation is applied to a clone, the clone is persisted, and only a
//! successful save commits it to memory. A failed save therefore rolls back
//! automatically, so callers never observe a state that diverges from disk.
//!
//! Exports snapshot the video path and range under the lock, then run the
//! cutter with the lock released, so an edit made mid-export never changes a
//! cut already in flight.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::export::{ExportOrchestrator, ExportReport, ExportRequest, VideoCutter};
use crate::project::{
    HighlightDraft, ProjectState, StateStore, VideoImportReport, VideoInfo,
};
use crate::{CoreError, CoreResult, HighlightId, TimeSec};

/// Adapter-facing façade over the highlight engine.
pub struct ProjectService {
    store: StateStore,
    state: Mutex<ProjectState>,
    orchestrator: ExportOrchestrator,
}

impl ProjectService {
    /// Creates a fresh project and persists its initial snapshot.
    pub fn create(
        name: &str,
        state_path: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
        cutter: Arc<dyn VideoCutter>,
    ) -> CoreResult<Self> {
        let store = StateStore::new(state_path);
        let state = ProjectState::new(name);
        store.save(&state)?;
        info!(project = name, path = %store.path().display(), "created project");
        Ok(Self {
            store,
            state: Mutex::new(state),
            orchestrator: ExportOrchestrator::new(cutter, export_dir),
        })
    }

    /// Loads an existing project from disk.
    pub fn load(
        state_path: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
        cutter: Arc<dyn VideoCutter>,
    ) -> CoreResult<Self> {
        let store = StateStore::new(state_path);
        let state = store.load()?;
        Ok(Self {
            store,
            state: Mutex::new(state),
            orchestrator: ExportOrchestrator::new(cutter, export_dir),
        })
    }

    /// Path of the persisted project file.
    pub fn state_path(&self) -> &std::path::Path {
        self.store.path()
    }

    // A poisoned lock cannot leave the aggregate half-mutated: mutations
    // commit a fully-built clone, so the inner value is always consistent.
    fn lock(&self) -> MutexGuard<'_, ProjectState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a snapshot of the current aggregate.
    pub fn get_state(&self) -> ProjectState {
        self.lock().clone()
    }

    /// Discards the in-memory aggregate and re-reads it from disk.
    pub fn reload(&self) -> CoreResult<()> {
        let fresh = self.store.load()?;
        *self.lock() = fresh;
        Ok(())
    }

    /// Runs one mutation as an atomic read-modify-save unit.
    fn mutate<T>(&self, op: impl FnOnce(&mut ProjectState) -> CoreResult<T>) -> CoreResult<T> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        let out = op(&mut next)?;
        self.store.save(&next)?;
        *guard = next;
        Ok(out)
    }

    // =========================================================================
    // Mutation API
    // =========================================================================

    pub fn import_video(
        &self,
        path: PathBuf,
        duration_sec: TimeSec,
        info: VideoInfo,
    ) -> CoreResult<VideoImportReport> {
        self.mutate(|state| state.import_video(path, duration_sec, info))
    }

    pub fn import_highlights(&self, drafts: &[HighlightDraft]) -> CoreResult<Vec<HighlightId>> {
        self.mutate(|state| state.import_highlights(drafts))
    }

    pub fn add_highlight(
        &self,
        label: &str,
        start_sec: TimeSec,
        end_sec: TimeSec,
        description: Option<String>,
    ) -> CoreResult<HighlightId> {
        self.mutate(|state| state.add_highlight(label, start_sec, end_sec, description))
    }

    pub fn rename_highlight(&self, id: &str, label: &str) -> CoreResult<()> {
        self.mutate(|state| state.rename_highlight(id, label))
    }

    pub fn select(&self, id: &str) -> CoreResult<()> {
        self.mutate(|state| state.select(id))
    }

    pub fn clear_selection(&self) -> CoreResult<()> {
        self.mutate(|state| {
            state.clear_selection();
            Ok(())
        })
    }

    pub fn update_range(&self, id: &str, start_sec: TimeSec, end_sec: TimeSec) -> CoreResult<()> {
        self.mutate(|state| state.update_range(id, start_sec, end_sec))
    }

    pub fn nudge(&self, id: &str, delta_start: TimeSec, delta_end: TimeSec) -> CoreResult<()> {
        self.mutate(|state| state.nudge(id, delta_start, delta_end))
    }

    pub fn remove_highlight(&self, id: &str) -> CoreResult<()> {
        self.mutate(|state| state.remove_highlight(id))
    }

    // =========================================================================
    // Export API
    // =========================================================================

    /// Exports one highlight; returns the output clip path.
    pub async fn export_one(&self, id: &str, overwrite: bool) -> CoreResult<PathBuf> {
        let request = {
            let guard = self.lock();
            let video = guard.video().ok_or(CoreError::NoVideo)?;
            let highlight = guard
                .highlight(id)
                .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
            ExportRequest {
                highlight_id: highlight.id().clone(),
                label: highlight.label().to_string(),
                range: highlight.range(),
                source: video.path.clone(),
            }
        };
        self.orchestrator.export_one(&request, overwrite).await
    }

    /// Exports every highlight in sequence order, reporting per id.
    pub async fn export_all(&self, overwrite: bool) -> CoreResult<Vec<ExportReport>> {
        let requests = {
            let guard = self.lock();
            let video = guard.video().ok_or(CoreError::NoVideo)?;
            guard
                .highlights()
                .iter()
                .map(|h| ExportRequest {
                    highlight_id: h.id().clone(),
                    label: h.label().to_string(),
                    range: h.range(),
                    source: video.path.clone(),
                })
                .collect::<Vec<_>>()
        };
        Ok(self.orchestrator.export_all(&requests, overwrite).await)
    }
}

// =============================================================================
// Tests
// =============================================================================
