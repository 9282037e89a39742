//! Reelcut CLI
//!
//! Thin adapter over the highlight engine: each subcommand maps onto one
//! service call, renders the result, and turns the engine's error kind into
//! an exit code. No editing logic lives here.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reelcut_core::ffmpeg::{probe_media, FfmpegCutter};
use reelcut_core::project::HighlightDraft;
use reelcut_core::service::ProjectService;
use reelcut_core::CoreError;

#[derive(Parser)]
#[command(name = "reelcut", version, about = "Local video highlight cutter")]
struct Cli {
    /// Project state file
    #[arg(long, global = true, default_value = "project.json")]
    state: PathBuf,

    /// Directory exported clips are written into
    #[arg(long, global = true, default_value = "exports")]
    exports: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new project
    Init {
        /// Project name
        name: String,
    },
    /// Show project status
    Status,
    /// List all highlights
    Highlights,
    /// Print the persisted project state as JSON
    State,
    /// Probe a video file and import it as the project source
    ImportVideo {
        /// Path to the video file
        path: PathBuf,
    },
    /// Bulk-import highlights from a JSON file of drafts
    ImportHighlights {
        /// Path to a JSON array of {label, description?, startSec, endSec}
        path: PathBuf,
    },
    /// Add a new highlight
    Add {
        label: String,
        /// Start time in seconds
        start: f64,
        /// End time in seconds
        end: f64,
        /// Optional description
        #[arg(long)]
        desc: Option<String>,
    },
    /// Rename a highlight
    Rename { id: String, label: String },
    /// Select a highlight for editing
    Select { id: String },
    /// Clear the current selection
    Deselect,
    /// Replace a highlight's time range
    UpdateRange { id: String, start: f64, end: f64 },
    /// Shift a highlight's bounds by relative deltas
    Nudge {
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta_start: f64,
        #[arg(allow_negative_numbers = true)]
        delta_end: f64,
    },
    /// Remove a highlight
    Remove { id: String },
    /// Export one highlight as a clip file
    Export {
        id: String,
        /// Overwrite an existing clip instead of suffixing
        #[arg(long)]
        overwrite: bool,
    },
    /// Export every highlight, reporting per id
    ExportAll {
        #[arg(long)]
        overwrite: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reelcut=info,warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            exit_code_for(&err)
        }
    }
}

fn report_error(err: &anyhow::Error) {
    if let Some(core) = err.downcast_ref::<CoreError>() {
        eprintln!("error ({}): {core}", core.kind());
        if let CoreError::BatchValidation(issues) = core {
            for issue in issues {
                eprintln!("  entry {}: {}", issue.index, issue.detail);
            }
        }
    } else {
        eprintln!("error: {err:#}");
    }
}

/// Stable exit codes per engine error kind, for scripting.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let Some(core) = err.downcast_ref::<CoreError>() else {
        return ExitCode::FAILURE;
    };
    let code: u8 = match core.kind() {
        "invalid_range" | "empty_label" | "batch_validation" => 2,
        "not_found" => 3,
        "no_video" => 4,
        "persistence" => 5,
        "export_failed" => 6,
        _ => 1,
    };
    ExitCode::from(code)
}

async fn run(cli: Cli) -> Result<()> {
    let cutter = Arc::new(FfmpegCutter::new());

    if let Command::Init { name } = &cli.command {
        if cli.state.exists() {
            bail!("project file already exists: {}", cli.state.display());
        }
        let service = ProjectService::create(name, &cli.state, &cli.exports, cutter)?;
        println!("initialized project \"{name}\" at {}", service.state_path().display());
        return Ok(());
    }

    let service = ProjectService::load(&cli.state, &cli.exports, cutter)
        .with_context(|| format!("failed to open project at {}", cli.state.display()))?;

    match cli.command {
        Command::Init { .. } => unreachable!("handled above"),

        Command::Status => {
            let state = service.get_state();
            println!("project:    {}", state.name());
            match state.video() {
                Some(video) => {
                    println!("video:      {}", video.path.display());
                    println!("duration:   {:.1}s", video.duration_sec);
                }
                None => println!("video:      (none)"),
            }
            println!("highlights: {}", state.highlights().len());
            if let Some(selected) = state.selected_highlight() {
                println!("selected:   {} ({})", selected.label(), selected.id());
            }
        }

        Command::Highlights => {
            let state = service.get_state();
            if state.highlights().is_empty() {
                println!("no highlights");
                return Ok(());
            }
            for highlight in state.highlights() {
                let marker = if state.selected_id() == Some(highlight.id()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {}  {:>8.1}s ~ {:>8.1}s  ({:.1}s)  {}",
                    highlight.id(),
                    highlight.range().start_sec(),
                    highlight.range().end_sec(),
                    highlight.duration(),
                    highlight.label(),
                );
            }
        }

        Command::State => {
            let raw = std::fs::read_to_string(service.state_path())?;
            println!("{raw}");
        }

        Command::ImportVideo { path } => {
            if !path.exists() {
                bail!("video file not found: {}", path.display());
            }
            let media = probe_media(&path)
                .await
                .with_context(|| format!("failed to probe {}", path.display()))?;
            let report =
                service.import_video(path.clone(), media.duration_sec, media.to_video_info())?;
            println!(
                "imported {} ({:.1}s)",
                path.display(),
                media.duration_sec
            );
            for id in &report.clamped {
                println!("clamped highlight {id} to the new duration");
            }
            for id in &report.dropped {
                println!("dropped highlight {id}: collapsed by the new duration");
            }
        }

        Command::ImportHighlights { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let drafts: Vec<HighlightDraft> = serde_json::from_str(&raw)
                .with_context(|| format!("invalid highlight drafts in {}", path.display()))?;
            let ids = service.import_highlights(&drafts)?;
            println!("imported {} highlights", ids.len());
        }

        Command::Add {
            label,
            start,
            end,
            desc,
        } => {
            let id = service.add_highlight(&label, start, end, desc)?;
            println!("added highlight {id}: {label} ({start}s ~ {end}s)");
        }

        Command::Rename { id, label } => {
            service.rename_highlight(&id, &label)?;
            println!("renamed {id} to \"{label}\"");
        }

        Command::Select { id } => {
            service.select(&id)?;
            println!("selected {id}");
        }

        Command::Deselect => {
            service.clear_selection()?;
            println!("selection cleared");
        }

        Command::UpdateRange { id, start, end } => {
            service.update_range(&id, start, end)?;
            println!("updated {id} to {start}s ~ {end}s");
        }

        Command::Nudge {
            id,
            delta_start,
            delta_end,
        } => {
            service.nudge(&id, delta_start, delta_end)?;
            let state = service.get_state();
            if let Some(highlight) = state.highlight(&id) {
                println!(
                    "nudged {id} to {:.3}s ~ {:.3}s",
                    highlight.range().start_sec(),
                    highlight.range().end_sec()
                );
            }
        }

        Command::Remove { id } => {
            service.remove_highlight(&id)?;
            println!("removed {id}");
        }

        Command::Export { id, overwrite } => {
            let path = service.export_one(&id, overwrite).await?;
            println!("exported {id} -> {}", path.display());
        }

        Command::ExportAll { overwrite } => {
            let reports = service.export_all(overwrite).await?;
            let mut failed = 0usize;
            for report in &reports {
                match &report.output_path {
                    Some(path) => {
                        println!("{}  {}  {}", report.highlight_id, report.status.as_str(), path.display())
                    }
                    None => {
                        failed += 1;
                        println!(
                            "{}  {}  {}",
                            report.highlight_id,
                            report.status.as_str(),
                            report.error.as_deref().unwrap_or("unknown failure")
                        );
                    }
                }
            }
            println!("exported {}/{} highlights", reports.len() - failed, reports.len());
        }
    }

    Ok(())
}
