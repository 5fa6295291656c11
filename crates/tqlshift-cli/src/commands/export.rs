use std::path::Path;

use anyhow::Result;
use tqlshift_engine::config::Target;
use tqlshift_engine::Stage;

use super::{directory_or, Context, ServerArgs};

/// Execute the `export` command: save every application into the stage
/// directory as a single archive.
pub async fn execute(
    ctx: &Context,
    server: &ServerArgs,
    stage_dir: Option<&Path>,
    drop_types: Option<&[String]>,
) -> Result<()> {
    let stage = Stage::open(directory_or(
        stage_dir,
        &ctx.config.processing.stage_directory,
    ))?;
    let client = ctx.connect(Target::Export, server).await?;

    if let Some([namespace, component]) = drop_types {
        let dropped = client.drop_types_with_prefix(namespace, component).await?;
        println!(
            "Dropped {} of {} type(s) matching {namespace}.{component}_",
            dropped.matched.len() - dropped.failed.len(),
            dropped.matched.len()
        );
        for name in &dropped.failed {
            println!("  Failed to drop: {name}");
        }
    }

    let apps = client.list_applications().await?;
    if apps.is_empty() {
        anyhow::bail!("No applications found on {}", client.profile().base_url());
    }
    println!("Found {} application(s):", apps.len());
    for app in &apps {
        println!("  {app}");
    }

    let archive = client.export_all(&client.profile().passphrase).await?;
    let path = stage.write_file(
        &ctx.config.advanced.export_archive_name,
        &archive,
        ctx.config.processing.overwrite_existing,
    )?;
    tracing::info!(path = %path.display(), bytes = archive.len(), "Export archive saved");

    println!("Export archive saved: {} ({} bytes)", path.display(), archive.len());
    println!(
        "Extract it into {} (one <namespace>.<app>.tql per application), then run `tqlshift update`.",
        stage.dir().display()
    );
    Ok(())
}
