use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use tqlshift_client::StriimClient;
use tqlshift_engine::config::Target;
use tqlshift_engine::{update_stage, CheckpointSource, RunReport, Stage, UpdateOptions};
use tqlshift_types::{AppName, CheckpointReport};

use super::{directory_or, Context, ServerArgs};

/// Checkpoint history served by a live installation.
struct ServerCheckpoints<'a>(&'a StriimClient);

#[async_trait]
impl<'a> CheckpointSource for ServerCheckpoints<'a> {
    async fn checkpoint_report(&self, app: &AppName) -> anyhow::Result<CheckpointReport> {
        Ok(self.0.checkpoint_history(app).await?)
    }
}

/// Execute the `update` command: write each staged pipeline's last
/// committed position into its definition.
pub async fn execute(
    ctx: &Context,
    server: &ServerArgs,
    stage_dir: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    let stage = Stage::existing(directory_or(
        stage_dir,
        &ctx.config.processing.stage_directory,
    ))?;
    if stage.documents()?.is_empty() {
        anyhow::bail!(
            "No .tql documents in {}; extract the export archive there first",
            stage.dir().display()
        );
    }

    let client = ctx.connect(Target::Export, server).await?;
    let run = update_stage(&stage, &ServerCheckpoints(&client), UpdateOptions { dry_run }).await?;

    print_summary(&run, dry_run);
    Ok(())
}

fn print_summary(run: &RunReport, dry_run: bool) {
    let s = &run.summary;
    println!();
    if dry_run {
        println!("Checkpoint update summary (dry run, nothing written):");
    } else {
        println!("Checkpoint update summary:");
    }
    println!("  Documents:            {}", s.total);
    println!("  MySQL:                {}", s.mysql);
    println!("  SQL Server:           {}", s.sqlserver);
    println!("  MongoDB:              {}", s.mongodb);
    println!("  Oracle:               {}", s.oracle);
    println!("  With checkpoint data: {}", s.with_checkpoint);
    println!("  Updated:              {}", s.updated);
    println!("  Unchanged:            {}", s.unchanged);
    println!("  Unclassified:         {}", s.unclassified);
    println!("  Failed:               {}", s.failed);

    let manual: Vec<_> = run.needs_operator().collect();
    if !manual.is_empty() {
        println!();
        println!("Needs manual edit:");
        for pipeline in manual {
            println!("  {}: {}", pipeline.app, status_line(&pipeline.status));
        }
    }
}

fn status_line(status: &tqlshift_engine::PipelineStatus) -> String {
    use tqlshift_engine::PipelineStatus;
    match status {
        PipelineStatus::Updated { field, .. } => format!("{field} updated"),
        PipelineStatus::Unchanged(reason) => reason.to_string(),
        PipelineStatus::Unclassified => "no recognized source reader".to_string(),
        PipelineStatus::Failed(message) => message.clone(),
    }
}
