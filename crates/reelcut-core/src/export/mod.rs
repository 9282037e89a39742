//! Export Orchestrator Module
//!
//! Turns highlight records into standalone clip files by invoking an
//! injected video-cutting capability. The orchestrator never mutates project
//! state: it works from immutable request snapshots taken when the export was
//! requested, so a concurrent edit cannot change a cut already in flight.
//!
//! Output discipline: the cutter writes to a hidden temporary sibling which
//! is renamed into place only on success and deleted on failure, so a failed
//! export leaves no partial file behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::{CoreError, CoreResult, HighlightId, TimeRange, TimeSec};

// =============================================================================
// Video Cutter Capability
// =============================================================================

/// Failure reported by a video cutter, with a diagnostic reason.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CutError(pub String);

/// The single-method capability the orchestrator depends on. The engine
/// treats cutting as opaque: binary success/failure plus a reason. Tests
/// inject a fake; production injects the FFmpeg-backed implementation.
#[async_trait]
pub trait VideoCutter: Send + Sync {
    async fn cut(
        &self,
        source: &Path,
        start_sec: TimeSec,
        end_sec: TimeSec,
        output: &Path,
    ) -> Result<(), CutError>;
}

// =============================================================================
// Export Job State Machine
// =============================================================================

/// Lifecycle of one export request. Terminal states are final; a re-invoked
/// export is a fresh job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl ExportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportStatus::Pending => "pending",
            ExportStatus::Running => "running",
            ExportStatus::Done => "done",
            ExportStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExportStatus::Done | ExportStatus::Failed)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid export transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: ExportStatus,
    pub to: ExportStatus,
}

/// Guarded `Pending -> Running -> {Done, Failed}` machine.
#[derive(Clone, Debug)]
pub struct ExportJob {
    status: ExportStatus,
}

impl ExportJob {
    pub fn new() -> Self {
        Self {
            status: ExportStatus::Pending,
        }
    }

    pub fn status(&self) -> ExportStatus {
        self.status
    }

    pub fn start(&mut self) -> Result<(), InvalidTransition> {
        if self.status != ExportStatus::Pending {
            return Err(InvalidTransition {
                from: self.status,
                to: ExportStatus::Running,
            });
        }
        self.status = ExportStatus::Running;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), InvalidTransition> {
        if self.status != ExportStatus::Running {
            return Err(InvalidTransition {
                from: self.status,
                to: ExportStatus::Done,
            });
        }
        self.status = ExportStatus::Done;
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), InvalidTransition> {
        if self.status.is_terminal() {
            return Err(InvalidTransition {
                from: self.status,
                to: ExportStatus::Failed,
            });
        }
        self.status = ExportStatus::Failed;
        Ok(())
    }
}

impl Default for ExportJob {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Requests and Reports
// =============================================================================

/// Immutable snapshot of everything an export needs, taken under the state
/// lock at request start. Holds no reference back into project state.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub highlight_id: HighlightId,
    pub label: String,
    pub range: TimeRange,
    pub source: PathBuf,
}

/// Per-highlight outcome of a batch export.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub highlight_id: HighlightId,
    pub status: ExportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// =============================================================================
// Export Orchestrator
// =============================================================================

/// Drives exports of highlight snapshots through the injected cutter.
pub struct ExportOrchestrator {
    cutter: Arc<dyn VideoCutter>,
    export_dir: PathBuf,
}

impl ExportOrchestrator {
    pub fn new(cutter: Arc<dyn VideoCutter>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            cutter,
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Exports a single highlight snapshot. Returns the output path on
    /// success; on cutter failure the temporary file is removed and the
    /// failure carries the underlying reason.
    pub async fn export_one(
        &self,
        request: &ExportRequest,
        overwrite: bool,
    ) -> CoreResult<PathBuf> {
        let fail = |reason: String| CoreError::ExportFailed {
            id: request.highlight_id.clone(),
            reason,
        };

        std::fs::create_dir_all(&self.export_dir).map_err(|e| fail(e.to_string()))?;
        let output = resolve_output_path(
            &self.export_dir,
            &request.label,
            &request.highlight_id,
            overwrite,
        );
        let tmp = tmp_output_path(&output);

        let mut job = ExportJob::new();
        job.start().map_err(|e| fail(e.to_string()))?;
        info!(
            id = %request.highlight_id,
            output = %output.display(),
            "exporting highlight clip"
        );

        match self
            .cutter
            .cut(
                &request.source,
                request.range.start_sec(),
                request.range.end_sec(),
                &tmp,
            )
            .await
        {
            Ok(()) => {
                if let Err(e) = std::fs::rename(&tmp, &output) {
                    let _ = std::fs::remove_file(&tmp);
                    job.fail().ok();
                    return Err(fail(format!("failed to move clip into place: {e}")));
                }
                job.complete().map_err(|e| fail(e.to_string()))?;
                Ok(output)
            }
            Err(cut_err) => {
                // No partial output may survive a failed cut.
                let _ = std::fs::remove_file(&tmp);
                job.fail().ok();
                warn!(
                    id = %request.highlight_id,
                    reason = %cut_err,
                    "highlight export failed"
                );
                Err(fail(cut_err.to_string()))
            }
        }
    }

    /// Exports every snapshot in sequence order. One failure never aborts the
    /// rest; the outcome is reported per id.
    pub async fn export_all(
        &self,
        requests: &[ExportRequest],
        overwrite: bool,
    ) -> Vec<ExportReport> {
        let mut reports = Vec::with_capacity(requests.len());
        for request in requests {
            let report = match self.export_one(request, overwrite).await {
                Ok(path) => ExportReport {
                    highlight_id: request.highlight_id.clone(),
                    status: ExportStatus::Done,
                    output_path: Some(path),
                    error: None,
                },
                Err(err) => ExportReport {
                    highlight_id: request.highlight_id.clone(),
                    status: ExportStatus::Failed,
                    output_path: None,
                    error: Some(err.to_string()),
                },
            };
            reports.push(report);
        }
        reports
    }
}

// =============================================================================
// Output Naming
// =============================================================================

/// Reduces a label to a filesystem-safe slug.
fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut last_dash = true;
    for ch in label.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "highlight".to_string()
    } else {
        slug
    }
}

fn short_id(id: &str) -> String {
    let lower = id.to_ascii_lowercase();
    let len = lower.chars().count();
    lower.chars().skip(len.saturating_sub(8)).collect()
}

/// Deterministic output path: `<slug>-<short-id>.mp4`, with a numeric suffix
/// when the name is taken and the caller did not request overwrite.
fn resolve_output_path(dir: &Path, label: &str, id: &str, overwrite: bool) -> PathBuf {
    let stem = format!("{}-{}", slugify(label), short_id(id));
    let base = dir.join(format!("{stem}.mp4"));
    if overwrite || !base.exists() {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}-{n}.mp4"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Hidden sibling the cutter writes into. Keeps the `.mp4` extension so the
/// muxer is inferred correctly from the temporary name.
fn tmp_output_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string());
    output.with_file_name(format!(".{stem}.tmp.mp4"))
}

// =============================================================================
// Tests
// =============================================================================
