use std::path::Path;

use anyhow::Result;
use tqlshift_client::{response, StriimClient};
use tqlshift_engine::config::Target;
use tqlshift_engine::import::{application_name, qualified_name};
use tqlshift_engine::{Stage, StagedDocument};

use super::{directory_or, Context, ServerArgs};

#[derive(Debug, Default)]
struct ImportSummary {
    total: usize,
    imported: usize,
    deployed: usize,
    deploy_failed: usize,
    failed: usize,
}

/// Execute the `import` command: import every `.tql` file of a directory,
/// in file-name order.
pub async fn execute(
    ctx: &Context,
    server: &ServerArgs,
    import_dir: Option<&Path>,
    deploy: bool,
    force: bool,
) -> Result<()> {
    let dir = Stage::existing(directory_or(
        import_dir,
        &ctx.config.processing.import_directory,
    ))?;
    let documents = dir.documents()?;
    if documents.is_empty() {
        anyhow::bail!("No .tql files found in {}", dir.dir().display());
    }
    println!("Found {} TQL file(s) in {}", documents.len(), dir.dir().display());

    let client = ctx.connect(Target::Import, server).await?;

    let mut summary = ImportSummary {
        total: documents.len(),
        ..ImportSummary::default()
    };
    for document in &documents {
        match import_one(&client, &dir, document, deploy, force).await {
            Ok(deployed) => {
                summary.imported += 1;
                match deployed {
                    Some(true) => summary.deployed += 1,
                    Some(false) => summary.deploy_failed += 1,
                    None => {}
                }
            }
            Err(e) => {
                tracing::warn!(file = %document.path.display(), error = %format!("{e:#}"), "Import failed");
                summary.failed += 1;
            }
        }
    }

    println!();
    println!("Import summary:");
    println!("  TQL files:  {}", summary.total);
    println!("  Imported:   {}", summary.imported);
    if deploy {
        println!("  Deployed:   {}", summary.deployed);
        println!("  Not deployed: {}", summary.deploy_failed);
    }
    println!("  Failed:     {}", summary.failed);
    Ok(())
}

/// Import one document. Returns whether deployment succeeded, or `None`
/// when no deployment was attempted.
async fn import_one(
    client: &StriimClient,
    dir: &Stage,
    document: &StagedDocument,
    deploy: bool,
    force: bool,
) -> Result<Option<bool>> {
    let text = dir.read(document)?;
    let app = application_name(&text).map(|declared| qualified_name(&document.path, &declared));
    if app.is_none() {
        tracing::warn!(file = %document.path.display(), "No CREATE APPLICATION statement found");
    }

    if force {
        if let Some(app) = &app {
            tracing::info!(app = app.as_str(), "Removing existing application");
            client.stop(app).await;
            client.undeploy(app).await;
            client.drop_application(app).await;
        }
    }

    let results = client.import_document(&text).await?;
    if let Some(failed) = response::first_failure(&results) {
        anyhow::bail!("{}", failed.failure());
    }
    tracing::info!(file = %document.path.display(), "Imported");

    let Some(app) = app.filter(|_| deploy) else {
        return Ok(None);
    };
    match client.deploy(&app).await {
        Ok(()) => {
            tracing::info!(app = app.as_str(), "Deployed");
            Ok(Some(true))
        }
        Err(e) => {
            tracing::warn!(app = app.as_str(), error = %e, "Deploy failed");
            Ok(Some(false))
        }
    }
}
