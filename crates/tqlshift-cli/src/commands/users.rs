use std::path::Path;

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use tqlshift_engine::access::{self, RoleDetail, UserDetail, ROLES_FILE, USERS_FILE};
use tqlshift_engine::config::Target;
use tqlshift_engine::Stage;

use super::{directory_or, Context, ServerArgs};

/// Execute the `users` command: write `CREATE USER` statements, and
/// optionally the custom roles they depend on.
pub async fn execute(
    ctx: &Context,
    server: &ServerArgs,
    users_dir: Option<&Path>,
    include_roles: bool,
) -> Result<()> {
    let out = Stage::open(directory_or(
        users_dir,
        &ctx.config.processing.users_directory,
    ))?;
    let overwrite = ctx.config.processing.overwrite_existing;
    let client = ctx.connect(Target::Export, server).await?;

    let usernames = client.list_users().await?;
    if usernames.is_empty() {
        anyhow::bail!("No users found on {}", client.profile().base_url());
    }
    println!("Found {} user(s)", usernames.len());

    let mut statements = Vec::new();
    for username in usernames.iter().filter(|u| !access::is_system_user(u)) {
        match client.describe_user(username).await {
            Ok(roles) => {
                let user = UserDetail {
                    username: username.clone(),
                    roles,
                };
                if let Some(statement) = access::create_user_statement(&user) {
                    statements.push(statement);
                }
            }
            Err(e) => tracing::warn!(user = %username, error = %e, "Failed to describe user"),
        }
    }

    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut with_roles = false;
    if include_roles {
        let roles = client.list_roles().await?;
        let mut details = Vec::new();
        for name in access::exportable_roles(&roles, &usernames) {
            match client.describe_role(name).await {
                Ok(permissions) => details.push(RoleDetail {
                    name: name.to_string(),
                    permissions,
                }),
                Err(e) => tracing::warn!(role = name, error = %e, "Failed to describe role"),
            }
        }
        if details.is_empty() {
            println!("No custom roles to export");
        } else {
            let path = out.write_file(
                ROLES_FILE,
                access::render_roles_file(&details, &generated_at),
                overwrite,
            )?;
            println!("Exported {} role(s) to {}", details.len(), path.display());
            with_roles = true;
        }
    }

    let path = out.write_file(
        USERS_FILE,
        access::render_users_file(&statements, &generated_at, with_roles),
        overwrite,
    )?;
    println!("Exported {} user(s) to {}", statements.len(), path.display());
    println!("Replace the 'password' placeholders before importing.");
    Ok(())
}
