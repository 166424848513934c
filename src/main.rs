//! gitcms - Git-backed content publishing
//!
//! CLI binary for publishing content edits as pull requests.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gitcms::types::Platform;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "gitcms")]
#[command(about = "Git-backed content publishing - edits land as pull requests")]
#[command(version)]
struct Cli {
    /// Path to a gitcms.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log remote calls to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish a content unit to the work branch and open a PR
    Publish {
        /// Content slug (e.g. "home")
        slug: String,

        /// JSON file with the full content record ("-" for stdin)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Set a field on top of the current content (field=value)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        sets: Vec<String>,

        /// Dry run - show what would be written without touching the host
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show a content unit
    Show {
        /// Content slug
        slug: String,

        /// Branch to read from (defaults to work branch, then base)
        #[arg(long)]
        branch: Option<String>,

        /// Print raw JSON instead of the field listing
        #[arg(long)]
        json: bool,
    },

    /// List content units
    List {
        /// Branch to list (defaults to base branch)
        #[arg(long)]
        branch: Option<String>,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        platform: AuthPlatform,
    },
}

#[derive(Subcommand)]
enum AuthPlatform {
    /// GitHub authentication
    Github {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// GitLab authentication
    Gitlab {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("gitcms=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Publish {
            slug,
            file,
            sets,
            dry_run,
            yes,
        } => {
            let options = cli::PublishArgs {
                slug,
                file,
                sets,
                dry_run,
                yes,
            };
            cli::run_publish(cli.config.as_deref(), options).await?;
        }
        Commands::Show { slug, branch, json } => {
            cli::run_show(cli.config.as_deref(), &slug, branch.as_deref(), json).await?;
        }
        Commands::List { branch } => {
            cli::run_list(cli.config.as_deref(), branch.as_deref()).await?;
        }
        Commands::Auth { platform } => {
            let (platform, action) = match platform {
                AuthPlatform::Github { action } => (Platform::GitHub, action),
                AuthPlatform::Gitlab { action } => (Platform::GitLab, action),
            };
            match action {
                AuthAction::Test => cli::run_auth_test(cli.config.as_deref(), platform).await?,
                AuthAction::Setup => cli::run_auth_setup(platform),
            }
        }
    }

    Ok(())
}
