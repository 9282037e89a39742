//! Project Model Definitions
//!
//! Defines the source video reference and the Highlight record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, HighlightId, TimeRange, TimeSec};

// =============================================================================
// Source Video
// =============================================================================

/// Video stream metadata. Opaque to the engine: carried for adapters and
/// never interpreted by any invariant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    /// Frame rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f64>,
    /// Width in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// The single source video a project cuts highlights from.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceVideo {
    /// Path to the media file
    pub path: PathBuf,
    /// Duration in seconds
    pub duration_sec: TimeSec,
    /// Stream metadata
    pub info: VideoInfo,
}

// =============================================================================
// Highlight Record
// =============================================================================

/// A named, described sub-interval of the source video.
///
/// The range field is private on purpose: every range change goes through
/// `apply_range` so the Time Range invariant is enforced at a single choke
/// point, and every label change goes through `rename`.
#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    id: HighlightId,
    label: String,
    description: Option<String>,
    range: TimeRange,
    created_at: String,
}

impl Highlight {
    /// Creates a new highlight with a fresh ULID and the current timestamp.
    pub fn new(label: &str, range: TimeRange, description: Option<String>) -> CoreResult<Self> {
        let label = normalized_label(label)?;
        Ok(Self {
            id: ulid::Ulid::new().to_string(),
            label,
            description,
            range,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Reassembles a highlight from persisted parts. Only the state store
    /// calls this; validation happens during document loading.
    pub(crate) fn from_parts(
        id: HighlightId,
        label: String,
        description: Option<String>,
        range: TimeRange,
        created_at: String,
    ) -> Self {
        Self {
            id,
            label,
            description,
            range,
            created_at,
        }
    }

    pub fn id(&self) -> &HighlightId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Derived duration in seconds.
    pub fn duration(&self) -> TimeSec {
        self.range.duration()
    }

    /// Replaces the label. Fails when the label is empty after trimming.
    pub fn rename(&mut self, label: &str) -> CoreResult<()> {
        self.label = normalized_label(label)?;
        Ok(())
    }

    /// Replaces the Time Range wholesale; the range is already validated.
    pub fn apply_range(&mut self, range: TimeRange) {
        self.range = range;
    }
}

fn normalized_label(label: &str) -> CoreResult<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyLabel);
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// Highlight Draft (bulk import input)
// =============================================================================

/// One entry of a bulk highlight import. Drafts never carry ids; the engine
/// allocates them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HighlightDraft {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: TimeSec, end: TimeSec) -> TimeRange {
        TimeRange::new(start, end, 120.0).unwrap()
    }

    #[test]
    fn test_highlight_new() {
        let hl = Highlight::new("Combo", range(30.0, 45.5), Some("desc".to_string())).unwrap();

        assert!(!hl.id().is_empty());
        assert_eq!(hl.label(), "Combo");
        assert_eq!(hl.description(), Some("desc"));
        assert_eq!(hl.duration(), 15.5);
        assert!(!hl.created_at().is_empty());
    }

    #[test]
    fn test_highlight_new_trims_label() {
        let hl = Highlight::new("  Knockdown  ", range(0.0, 5.0), None).unwrap();
        assert_eq!(hl.label(), "Knockdown");
    }

    #[test]
    fn test_highlight_new_rejects_blank_label() {
        let err = Highlight::new("   ", range(0.0, 5.0), None).unwrap_err();
        assert_eq!(err.kind(), "empty_label");
    }

    #[test]
    fn test_rename() {
        let mut hl = Highlight::new("Combo", range(0.0, 5.0), None).unwrap();
        hl.rename("Uppercut").unwrap();
        assert_eq!(hl.label(), "Uppercut");

        assert!(hl.rename("").is_err());
        assert_eq!(hl.label(), "Uppercut");
    }

    #[test]
    fn test_apply_range_replaces_wholesale() {
        let mut hl = Highlight::new("Combo", range(0.0, 5.0), None).unwrap();
        hl.apply_range(range(10.0, 20.0));
        assert_eq!(hl.range().start_sec(), 10.0);
        assert_eq!(hl.range().end_sec(), 20.0);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Highlight::new("A", range(0.0, 1.0), None).unwrap();
        let b = Highlight::new("B", range(0.0, 1.0), None).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_draft_rejects_unknown_fields() {
        let raw = r#"{ "label": "A", "startSec": 0.0, "endSec": 1.0, "bogus": true }"#;
        assert!(serde_json::from_str::<HighlightDraft>(raw).is_err());
    }

    #[test]
    fn test_draft_parses_without_description() {
        let raw = r#"{ "label": "A", "startSec": 0.0, "endSec": 1.0 }"#;
        let draft: HighlightDraft = serde_json::from_str(raw).unwrap();
        assert!(draft.description.is_none());
    }
}
