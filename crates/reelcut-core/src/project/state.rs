//! Project State Module
//!
//! The single-writer aggregate: source video reference, ordered highlight
//! collection, and current selection. All mutations preserve the aggregate
//! invariants:
//! - no two highlights share an id
//! - the selection is null or references an existing highlight
//! - every highlight range is valid against the current video duration

use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::project::{Highlight, HighlightDraft, SourceVideo, VideoInfo};
use crate::{BatchIssue, CoreError, CoreResult, HighlightId, TimeRange, TimeSec};

// =============================================================================
// Mutation Reports
// =============================================================================

/// Per-id outcome of re-importing a video whose duration no longer covers
/// existing highlights. Nothing is discarded silently.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoImportReport {
    /// Highlights whose end was clamped to the new duration
    pub clamped: Vec<HighlightId>,
    /// Highlights dropped because clamping collapsed their range
    pub dropped: Vec<HighlightId>,
}

impl VideoImportReport {
    /// True when no highlight was touched by the import.
    pub fn is_clean(&self) -> bool {
        self.clamped.is_empty() && self.dropped.is_empty()
    }
}

// =============================================================================
// Project State
// =============================================================================

/// In-memory project aggregate. Exactly one instance exists per running
/// process; it is loaded at start, saved after each successful mutation, and
/// entirely replaced on explicit reload.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectState {
    name: String,
    video: Option<SourceVideo>,
    highlights: Vec<Highlight>,
    selected_id: Option<HighlightId>,
}

impl ProjectState {
    /// Creates a new empty project state
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            video: None,
            highlights: Vec::new(),
            selected_id: None,
        }
    }

    /// Reassembles an aggregate from persisted parts. Only the state store
    /// calls this, after validating the document invariants.
    pub(crate) fn from_parts(
        name: String,
        video: Option<SourceVideo>,
        highlights: Vec<Highlight>,
        selected_id: Option<HighlightId>,
    ) -> Self {
        Self {
            name,
            video,
            highlights,
            selected_id,
        }
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn video(&self) -> Option<&SourceVideo> {
        self.video.as_ref()
    }

    /// Highlights in insertion order, which is the display and export order.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn selected_id(&self) -> Option<&HighlightId> {
        self.selected_id.as_ref()
    }

    /// Gets a highlight by id
    pub fn highlight(&self, id: &str) -> Option<&Highlight> {
        self.highlights.iter().find(|h| h.id() == id)
    }

    /// Gets the currently selected highlight
    pub fn selected_highlight(&self) -> Option<&Highlight> {
        self.selected_id
            .as_ref()
            .and_then(|id| self.highlight(id))
    }

    /// Upper bound for highlight ranges. Unbounded until a video is known;
    /// `import_video` clamps existing ranges against the real duration.
    pub fn duration_bound(&self) -> TimeSec {
        self.video
            .as_ref()
            .map(|v| v.duration_sec)
            .unwrap_or(f64::INFINITY)
    }

    fn highlight_mut(&mut self, id: &str) -> CoreResult<&mut Highlight> {
        self.highlights
            .iter_mut()
            .find(|h| h.id() == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replaces the video reference. Existing highlights that no longer fit
    /// the new duration are clamped, or dropped when clamping collapses them;
    /// every affected id is reported.
    pub fn import_video(
        &mut self,
        path: PathBuf,
        duration_sec: TimeSec,
        info: VideoInfo,
    ) -> CoreResult<VideoImportReport> {
        if !duration_sec.is_finite() || duration_sec <= 0.0 {
            return Err(CoreError::InvalidRange {
                start: 0.0,
                end: duration_sec,
                bound: duration_sec,
            });
        }

        let mut report = VideoImportReport::default();
        let mut kept = Vec::with_capacity(self.highlights.len());
        for mut highlight in self.highlights.drain(..) {
            if highlight.range().end_sec() <= duration_sec {
                kept.push(highlight);
                continue;
            }
            match highlight.range().clamped_to(duration_sec) {
                Some(clamped) => {
                    highlight.apply_range(clamped);
                    report.clamped.push(highlight.id().clone());
                    kept.push(highlight);
                }
                None => {
                    warn!(
                        id = %highlight.id(),
                        label = %highlight.label(),
                        "dropping highlight collapsed by shorter video duration"
                    );
                    report.dropped.push(highlight.id().clone());
                }
            }
        }
        self.highlights = kept;

        if let Some(selected) = &self.selected_id {
            if report.dropped.contains(selected) {
                self.selected_id = None;
            }
        }

        self.video = Some(SourceVideo {
            path,
            duration_sec,
            info,
        });
        Ok(report)
    }

    /// Bulk-adds highlights. The whole batch is validated up front; any
    /// offending entry rejects the import atomically, listed by index.
    pub fn import_highlights(&mut self, drafts: &[HighlightDraft]) -> CoreResult<Vec<HighlightId>> {
        let bound = self.duration_bound();

        let mut issues = Vec::new();
        for (index, draft) in drafts.iter().enumerate() {
            if draft.label.trim().is_empty() {
                issues.push(BatchIssue {
                    index,
                    detail: CoreError::EmptyLabel.to_string(),
                });
                continue;
            }
            if let Err(err) = TimeRange::new(draft.start_sec, draft.end_sec, bound) {
                issues.push(BatchIssue {
                    index,
                    detail: err.to_string(),
                });
            }
        }
        if !issues.is_empty() {
            return Err(CoreError::BatchValidation(issues));
        }

        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let range = TimeRange::new(draft.start_sec, draft.end_sec, bound)?;
            let highlight = Highlight::new(&draft.label, range, draft.description.clone())?;
            ids.push(highlight.id().clone());
            self.highlights.push(highlight);
        }
        Ok(ids)
    }

    /// Appends a new highlight with a fresh id at the end of the sequence.
    pub fn add_highlight(
        &mut self,
        label: &str,
        start_sec: TimeSec,
        end_sec: TimeSec,
        description: Option<String>,
    ) -> CoreResult<HighlightId> {
        let range = TimeRange::new(start_sec, end_sec, self.duration_bound())?;
        let highlight = Highlight::new(label, range, description)?;
        let id = highlight.id().clone();
        self.highlights.push(highlight);
        Ok(id)
    }

    /// Renames a highlight
    pub fn rename_highlight(&mut self, id: &str, label: &str) -> CoreResult<()> {
        self.highlight_mut(id)?.rename(label)
    }

    /// Selects a highlight for editing
    pub fn select(&mut self, id: &str) -> CoreResult<()> {
        if self.highlight(id).is_none() {
            return Err(CoreError::NotFound(id.to_string()));
        }
        self.selected_id = Some(id.to_string());
        Ok(())
    }

    /// Clears the selection
    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    /// Replaces a highlight's range with a validated new one.
    pub fn update_range(&mut self, id: &str, start_sec: TimeSec, end_sec: TimeSec) -> CoreResult<()> {
        let bound = self.duration_bound();
        let highlight = self.highlight_mut(id)?;
        let range = highlight.range().resize(start_sec, end_sec, bound)?;
        highlight.apply_range(range);
        Ok(())
    }

    /// Shifts a highlight's bounds independently, clamped to the video.
    pub fn nudge(
        &mut self,
        id: &str,
        delta_start: TimeSec,
        delta_end: TimeSec,
    ) -> CoreResult<()> {
        let bound = self.duration_bound();
        let highlight = self.highlight_mut(id)?;
        let range = highlight.range().nudge(delta_start, delta_end, bound)?;
        highlight.apply_range(range);
        Ok(())
    }

    /// Removes a highlight. Removing the selected one clears the selection;
    /// sibling ids are untouched.
    pub fn remove_highlight(&mut self, id: &str) -> CoreResult<()> {
        let pos = self
            .highlights
            .iter()
            .position(|h| h.id() == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        self.highlights.remove(pos);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
