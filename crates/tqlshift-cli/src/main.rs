mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{Context, ServerArgs};

#[derive(Parser)]
#[command(
    name = "tqlshift",
    version,
    about = "Migrate pipeline definitions between installations, resuming each at its last checkpoint"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Config file (default: ./tqlshift.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named environment from the config file
    #[arg(long, global = true)]
    environment: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every application into the stage directory as one archive
    Export {
        #[command(flatten)]
        server: ServerArgs,
        /// Stage directory (default: processing.stage_directory)
        #[arg(long)]
        stage_dir: Option<PathBuf>,
        /// Drop types named <NAMESPACE>.<COMPONENT>_* before exporting
        #[arg(long, num_args = 2, value_names = ["NAMESPACE", "COMPONENT"])]
        drop_types: Option<Vec<String>>,
    },
    /// Write each pipeline's last checkpoint into its staged definition
    Update {
        #[command(flatten)]
        server: ServerArgs,
        /// Stage directory (default: processing.stage_directory)
        #[arg(long)]
        stage_dir: Option<PathBuf>,
        /// Report what would change without writing any document
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply a saved checkpoint report to one definition, offline
    Patch {
        /// Definition document (.tql)
        document: PathBuf,
        /// Checkpoint report: summary text or the JSON entry list
        #[arg(long)]
        report: PathBuf,
        /// Print the updated document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Import every definition of a directory into the target installation
    Import {
        #[command(flatten)]
        server: ServerArgs,
        /// Directory of .tql files (default: processing.import_directory)
        #[arg(long)]
        import_dir: Option<PathBuf>,
        /// Deploy each application after a successful import
        #[arg(long)]
        deploy: bool,
        /// Stop, undeploy and drop existing applications before importing
        #[arg(long)]
        force: bool,
    },
    /// Export users (and optionally custom roles) as TQL statements
    Users {
        #[command(flatten)]
        server: ServerArgs,
        /// Output directory (default: processing.users_directory)
        #[arg(long)]
        users_dir: Option<PathBuf>,
        /// Also export custom roles to roles.tql
        #[arg(long)]
        include_roles: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    let ctx = Context {
        config: tqlshift_engine::config::load(cli.config.as_deref())?,
        environment: cli.environment,
    };

    match cli.command {
        Commands::Export {
            server,
            stage_dir,
            drop_types,
        } => {
            commands::export::execute(&ctx, &server, stage_dir.as_deref(), drop_types.as_deref())
                .await
        }
        Commands::Update {
            server,
            stage_dir,
            dry_run,
        } => commands::update::execute(&ctx, &server, stage_dir.as_deref(), dry_run).await,
        Commands::Patch {
            document,
            report,
            dry_run,
        } => commands::patch::execute(&document, &report, dry_run),
        Commands::Import {
            server,
            import_dir,
            deploy,
            force,
        } => commands::import::execute(&ctx, &server, import_dir.as_deref(), deploy, force).await,
        Commands::Users {
            server,
            users_dir,
            include_roles,
        } => commands::users::execute(&ctx, &server, users_dir.as_deref(), include_roles).await,
    }
}
