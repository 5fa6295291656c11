//! Pipeline orchestrator: classifies staged documents, fetches checkpoints,
//! injects resume positions, and writes documents back.

use async_trait::async_trait;
use tqlshift_types::{
    AppName, CheckpointReport, Disposition, PositionDescriptor, ReaderType, UnchangedReason,
};

use crate::classify::detect_reader;
use crate::error::StageError;
use crate::extract::extract_latest;
use crate::patch::patch;
use crate::result::{PipelineReport, PipelineStatus, RunReport};
use crate::stage::{Stage, StagedDocument};

/// Provider of checkpoint history for a pipeline.
#[async_trait]
pub trait CheckpointSource: Send + Sync {
    /// Fetch the checkpoint history of `app`, most recent entry first.
    ///
    /// # Errors
    ///
    /// Any error is confined to this one pipeline.
    async fn checkpoint_report(&self, app: &AppName) -> anyhow::Result<CheckpointReport>;
}

/// Outcome of the core for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub reader: Option<ReaderType>,
    pub position: Option<PositionDescriptor>,
    pub disposition: Disposition,
}

/// Classify, extract and patch one document.
///
/// Pure: `report` is only consulted when the document is classified.
#[must_use]
pub fn resolve(document: &str, report: Option<&CheckpointReport>) -> PipelineOutcome {
    match detect_reader(document) {
        None => PipelineOutcome {
            reader: None,
            position: None,
            disposition: Disposition::Unclassified,
        },
        Some(reader) => apply(document, reader, report),
    }
}

fn apply(document: &str, reader: ReaderType, report: Option<&CheckpointReport>) -> PipelineOutcome {
    let position = report.and_then(extract_latest);
    let disposition = match &position {
        None => Disposition::Unchanged(UnchangedReason::NoCheckpointData),
        Some(position) => patch(document, reader.family(), position).into(),
    };
    PipelineOutcome {
        reader: Some(reader),
        position,
        disposition,
    }
}

/// Options for [`update_stage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Compute every outcome but leave documents on disk untouched.
    pub dry_run: bool,
}

/// Inject resume positions into every document of a stage directory.
///
/// Documents are processed one at a time in file-name order. A failure
/// to read, fetch or write one document is recorded in its report and
/// never stops the run.
///
/// # Errors
///
/// Returns [`StageError`] only when the stage directory cannot be listed.
pub async fn update_stage(
    stage: &Stage,
    source: &dyn CheckpointSource,
    options: UpdateOptions,
) -> Result<RunReport, StageError> {
    let documents = stage.documents()?;
    tracing::info!(
        stage = %stage.dir().display(),
        documents = documents.len(),
        dry_run = options.dry_run,
        "Processing staged documents"
    );

    let mut run = RunReport::default();
    for document in &documents {
        let report = update_document(stage, document, source, options).await;
        log_report(&report);
        run.push(report);
    }

    tracing::info!(
        total = run.summary.total,
        updated = run.summary.updated,
        unchanged = run.summary.unchanged,
        unclassified = run.summary.unclassified,
        failed = run.summary.failed,
        "Stage processing complete"
    );
    Ok(run)
}

async fn update_document(
    stage: &Stage,
    document: &StagedDocument,
    source: &dyn CheckpointSource,
    options: UpdateOptions,
) -> PipelineReport {
    let app = document.app.clone();
    let failed = |reader, message: String| PipelineReport {
        app: document.app.clone(),
        reader,
        position: None,
        status: PipelineStatus::Failed(message),
    };

    let text = match stage.read(document) {
        Ok(text) => text,
        Err(e) => return failed(None, e.to_string()),
    };

    let Some(reader) = detect_reader(&text) else {
        return PipelineReport {
            app,
            reader: None,
            position: None,
            status: PipelineStatus::Unclassified,
        };
    };

    let report = match source.checkpoint_report(&app).await {
        Ok(report) => report,
        Err(e) => return failed(Some(reader), format!("checkpoint fetch failed: {e:#}")),
    };

    let outcome = apply(&text, reader, Some(&report));
    let status = match outcome.disposition {
        Disposition::Updated {
            text: updated,
            field,
            edit,
        } => {
            if !options.dry_run {
                if let Err(e) = stage.write(document, &updated) {
                    return PipelineReport {
                        position: outcome.position,
                        ..failed(Some(reader), e.to_string())
                    };
                }
            }
            PipelineStatus::Updated {
                field,
                edit,
                persisted: !options.dry_run,
            }
        }
        Disposition::Unchanged(reason) => PipelineStatus::Unchanged(reason),
        Disposition::Unclassified => PipelineStatus::Unclassified,
    };

    PipelineReport {
        app,
        reader: Some(reader),
        position: outcome.position,
        status,
    }
}

fn log_report(report: &PipelineReport) {
    let app = report.app.as_str();
    let reader = report.reader.map(|r| r.token()).unwrap_or_default();
    match &report.status {
        PipelineStatus::Updated { field, edit, persisted } => tracing::info!(
            app,
            reader,
            field,
            edit = ?edit,
            persisted,
            position = %report.position.as_ref().map(ToString::to_string).unwrap_or_default(),
            "Start position updated"
        ),
        PipelineStatus::Unchanged(reason) if reason.needs_operator() => {
            tracing::warn!(app, reader, %reason, "Document left unchanged; needs manual edit");
        }
        PipelineStatus::Unchanged(reason) => {
            tracing::info!(app, reader, %reason, "Document left unchanged");
        }
        PipelineStatus::Unclassified => {
            tracing::info!(app, "Skipping: no recognized source reader declared");
        }
        PipelineStatus::Failed(message) => {
            tracing::warn!(app, reader, error = %message, "Pipeline processing failed");
        }
    }
}
