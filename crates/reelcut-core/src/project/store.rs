//! State Store Module
//!
//! Durable JSON persistence for the project aggregate.
//!
//! The on-disk document has an explicit, fixed schema: unknown fields,
//! missing fields, duplicate ids, dangling selections, and out-of-bounds
//! ranges are all corruption and fail the load with a persistence error
//! rather than being silently defaulted. Writes go through the atomic
//! replace in `crate::fs`, so a crash mid-save never destroys the previous
//! valid snapshot.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::project::{Highlight, ProjectState, SourceVideo, VideoInfo};
use crate::{fs, CoreError, CoreResult, TimeRange, TimeSec};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Persisted Document Schema
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProjectDoc {
    schema_version: u32,
    name: String,
    video: Option<VideoDoc>,
    highlights: Vec<HighlightDoc>,
    selected_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct VideoDoc {
    path: PathBuf,
    duration_sec: TimeSec,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct HighlightDoc {
    id: String,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start_sec: TimeSec,
    end_sec: TimeSec,
    created_at: String,
}

// =============================================================================
// State Store
// =============================================================================

/// Persists the project aggregate to a single JSON file.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Saves a snapshot of the aggregate with an atomic replace.
    pub fn save(&self, state: &ProjectState) -> CoreResult<()> {
        let doc = to_doc(state);
        fs::atomic_write_json_pretty(&self.path, &doc)
    }

    /// Loads and validates the aggregate from disk.
    pub fn load(&self) -> CoreResult<ProjectState> {
        if !self.path.exists() {
            return Err(CoreError::Persistence(format!(
                "project file not found: {}",
                self.path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let doc: ProjectDoc = serde_json::from_str(&raw)?;
        from_doc(doc)
    }
}

fn to_doc(state: &ProjectState) -> ProjectDoc {
    ProjectDoc {
        schema_version: CURRENT_SCHEMA_VERSION,
        name: state.name().to_string(),
        video: state.video().map(|v| VideoDoc {
            path: v.path.clone(),
            duration_sec: v.duration_sec,
            fps: v.info.fps,
            width: v.info.width,
            height: v.info.height,
        }),
        highlights: state
            .highlights()
            .iter()
            .map(|h| HighlightDoc {
                id: h.id().clone(),
                label: h.label().to_string(),
                description: h.description().map(|d| d.to_string()),
                start_sec: h.range().start_sec(),
                end_sec: h.range().end_sec(),
                created_at: h.created_at().to_string(),
            })
            .collect(),
        selected_id: state.selected_id().cloned(),
    }
}

fn from_doc(doc: ProjectDoc) -> CoreResult<ProjectState> {
    if doc.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::Persistence(format!(
            "schema version {} is newer than supported {}",
            doc.schema_version, CURRENT_SCHEMA_VERSION
        )));
    }

    let video = doc.video.map(|v| SourceVideo {
        path: v.path,
        duration_sec: v.duration_sec,
        info: VideoInfo {
            fps: v.fps,
            width: v.width,
            height: v.height,
        },
    });
    if let Some(v) = &video {
        if !v.duration_sec.is_finite() || v.duration_sec <= 0.0 {
            return Err(CoreError::Persistence(format!(
                "invalid video duration: {}",
                v.duration_sec
            )));
        }
    }

    let bound = video.as_ref().map(|v| v.duration_sec).unwrap_or(f64::INFINITY);

    let mut seen = HashSet::new();
    let mut highlights = Vec::with_capacity(doc.highlights.len());
    for entry in doc.highlights {
        if !seen.insert(entry.id.clone()) {
            return Err(CoreError::Persistence(format!(
                "duplicate highlight id: {}",
                entry.id
            )));
        }
        if entry.label.trim().is_empty() {
            return Err(CoreError::Persistence(format!(
                "highlight {} has an empty label",
                entry.id
            )));
        }
        let range = TimeRange::new(entry.start_sec, entry.end_sec, bound).map_err(|_| {
            CoreError::Persistence(format!(
                "highlight {} has an invalid range {}~{}",
                entry.id, entry.start_sec, entry.end_sec
            ))
        })?;
        highlights.push(Highlight::from_parts(
            entry.id,
            entry.label,
            entry.description,
            range,
            entry.created_at,
        ));
    }

    if let Some(selected) = &doc.selected_id {
        if !seen.contains(selected) {
            return Err(CoreError::Persistence(format!(
                "selected id references a missing highlight: {selected}"
            )));
        }
    }

    Ok(ProjectState::from_parts(
        doc.name,
        video,
        highlights,
        doc.selected_id,
    ))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> ProjectState {
        let mut state = ProjectState::new("Fight Night");
        state
            .import_video(
                PathBuf::from("/media/fight.mp4"),
                120.0,
                VideoInfo {
                    fps: Some(29.97),
                    width: Some(1920),
                    height: Some(1080),
                },
            )
            .unwrap();
        state
            .add_highlight("Combo", 30.0, 45.5, Some("jab cross".to_string()))
            .unwrap();
        state.add_highlight("Knockdown", 60.0, 75.0, None).unwrap();
        let id = state.highlights()[0].id().clone();
        state.select(&id).unwrap();
        state
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("project.json"));

        let state = sample_state();
        store.save(&state).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_resave_is_byte_stable() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("project.json"));

        let state = sample_state();
        store.save(&state).unwrap();
        let first = std::fs::read(store.path()).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();
        let second = std::fs::read(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("missing.json"));
        let err = store.load().unwrap_err();
        assert_eq!(err.kind(), "persistence");
    }

    #[test]
    fn test_load_rejects_future_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        let content = serde_json::json!({
            "schemaVersion": CURRENT_SCHEMA_VERSION + 1,
            "name": "Future",
            "video": null,
            "highlights": [],
            "selectedId": null
        });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let err = StateStore::new(path).load().unwrap_err();
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        let content = serde_json::json!({
            "schemaVersion": 1,
            "name": "Fight Night",
            "video": null,
            "highlights": [],
            "selectedId": null,
            "surprise": true
        });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let err = StateStore::new(path).load().unwrap_err();
        assert_eq!(err.kind(), "persistence");
    }

    #[test]
    fn test_load_rejects_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        let content = serde_json::json!({
            "schemaVersion": 1,
            "name": "Fight Night"
        });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let err = StateStore::new(path).load().unwrap_err();
        assert_eq!(err.kind(), "persistence");
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        let highlight = serde_json::json!({
            "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
            "label": "Combo",
            "startSec": 0.0,
            "endSec": 5.0,
            "createdAt": "2024-01-01T00:00:00+00:00"
        });
        let content = serde_json::json!({
            "schemaVersion": 1,
            "name": "Fight Night",
            "video": null,
            "highlights": [highlight, highlight],
            "selectedId": null
        });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let err = StateStore::new(path).load().unwrap_err();
        assert!(err.to_string().contains("duplicate highlight id"));
    }

    #[test]
    fn test_load_rejects_dangling_selection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        let content = serde_json::json!({
            "schemaVersion": 1,
            "name": "Fight Night",
            "video": null,
            "highlights": [],
            "selectedId": "01ARZ3NDEKTSV4RRFFQ69G5FAV"
        });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let err = StateStore::new(path).load().unwrap_err();
        assert!(err.to_string().contains("missing highlight"));
    }

    #[test]
    fn test_load_rejects_range_past_video_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.json");
        let content = serde_json::json!({
            "schemaVersion": 1,
            "name": "Fight Night",
            "video": {
                "path": "/media/fight.mp4",
                "durationSec": 60.0
            },
            "highlights": [{
                "id": "01ARZ3NDEKTSV4RRFFQ69G5FAV",
                "label": "Combo",
                "startSec": 50.0,
                "endSec": 90.0,
                "createdAt": "2024-01-01T00:00:00+00:00"
            }],
            "selectedId": null
        });
        std::fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let err = StateStore::new(path).load().unwrap_err();
        assert!(err.to_string().contains("invalid range"));
    }

    #[test]
    fn test_document_layout_uses_camel_case() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("project.json"));
        store.save(&sample_state()).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"schemaVersion\""));
        assert!(raw.contains("\"durationSec\""));
        assert!(raw.contains("\"selectedId\""));
        assert!(raw.contains("\"createdAt\""));
    }
}
