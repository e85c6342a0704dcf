use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docsync::config::{self, ConfigUpdate, SyncConfig};
use docsync::handlers;
use docsync::logger;
use docsync::prompt::{AssumeYes, Confirm, InquireConfirm};
use docsync::report::ListFilter;
use docsync::session::SyncSession;
use docsync::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "docsync")]
#[command(about = "Reconcile a local source tree with a remote project document store", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to scan (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Manifest file (default: from config, relative to the root)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure docsync settings
    Config {
        /// Remote base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Remote organization id
        #[arg(long)]
        organization: Option<String>,

        /// Remote project id
        #[arg(long)]
        project: Option<String>,

        /// File extensions to scan (comma-separated)
        #[arg(long)]
        extensions: Option<String>,

        /// Directory names to skip (comma-separated)
        #[arg(long)]
        exclude_dirs: Option<String>,

        /// Default manifest path, relative to the root
        #[arg(long)]
        manifest_path: Option<PathBuf>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },

    #[command(flatten)]
    Session(SessionCommand),
}

/// Commands that work on a fetched session
#[derive(Subcommand)]
enum SessionCommand {
    /// Fetch both sides and show how many files are in each status
    Status,

    /// List tracked files
    List {
        /// Hide files that are identical on both sides
        #[arg(long)]
        hide_synced: bool,

        /// Hide files that only exist locally
        #[arg(long)]
        hide_local_only: bool,

        /// Hide files that only exist remotely
        #[arg(long)]
        hide_remote_only: bool,
    },

    /// Show local and remote files paired only by file name
    Matches,

    /// Show differences between paired files
    Diff {
        /// Only this file
        path: Option<String>,
    },

    /// Upload local files that have no remote copy yet (use overwrite to replace one)
    Upload {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Delete remote copies
    Delete {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Replace remote copies with the local files
    Overwrite {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show local directories with no remote counterpart
    Dirs,

    /// Manage the manifest file
    Manifest {
        #[command(subcommand)]
        action: ManifestAction,
    },

    /// Manage directory rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Interactive menu (default)
    Menu,
}

#[derive(Subcommand)]
enum ManifestAction {
    /// Print rules and the saved snapshot
    Show,
    /// Fetch and save the manifest with a fresh snapshot
    Save,
    /// Save the manifest and upload it to the remote store
    Upload,
}

#[derive(Subcommand)]
enum RulesAction {
    /// List directory rules
    List,
    /// Map a local directory onto a remote one
    Add { source: String, target: String },
    /// Remove the rule at this index
    Remove { index: usize },
}

fn main() -> Result<()> {
    if let Err(e) = logger::init_logger() {
        eprintln!("Warning: Failed to initialize logger: {e}");
    }

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            base_url,
            organization,
            project,
            extensions,
            exclude_dirs,
            manifest_path,
            show,
        }) => {
            if show {
                config::show_config()
            } else {
                config::update_config(ConfigUpdate {
                    base_url,
                    organization,
                    project,
                    extensions,
                    exclude_dirs,
                    manifest_path,
                })
            }
        }
        Some(Commands::Session(command)) => run(cli.root, cli.manifest, cli.yes, command),
        None => run(cli.root, cli.manifest, cli.yes, SessionCommand::Menu),
    }
}

fn run(
    root: Option<PathBuf>,
    manifest: Option<PathBuf>,
    yes: bool,
    command: SessionCommand,
) -> Result<()> {
    let settings = SyncConfig::load().context("Failed to load configuration")?;
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let manifest_path = manifest.unwrap_or_else(|| settings.manifest_path_in(&root));

    let transport = HttpTransport::new(&settings.remote)
        .context("Remote is not configured; run `docsync config --organization .. --project ..`")?;
    let confirm: Box<dyn Confirm> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(InquireConfirm)
    };

    let mut session = SyncSession::new(root, settings.scan, manifest_path, transport, confirm)
        .context("Failed to open sync session")?;

    match command {
        SessionCommand::Status => handlers::handle_status(&mut session),
        SessionCommand::List {
            hide_synced,
            hide_local_only,
            hide_remote_only,
        } => {
            let filter = ListFilter {
                hide_synced,
                hide_local_only,
                hide_remote_only,
            };
            handlers::handle_list(&mut session, &filter)
        }
        SessionCommand::Matches => handlers::handle_matches(&mut session),
        SessionCommand::Diff { path } => handlers::handle_diff(&mut session, path.as_deref()),
        SessionCommand::Upload { paths } => handlers::handle_upload(&mut session, &paths),
        SessionCommand::Delete { paths } => handlers::handle_delete(&mut session, &paths),
        SessionCommand::Overwrite { paths } => handlers::handle_overwrite(&mut session, &paths),
        SessionCommand::Dirs => handlers::handle_dirs(&mut session),
        SessionCommand::Manifest { action } => match action {
            ManifestAction::Show => handlers::handle_manifest_show(&session),
            ManifestAction::Save => handlers::handle_manifest_save(&mut session),
            ManifestAction::Upload => handlers::handle_manifest_upload(&mut session),
        },
        SessionCommand::Rules { action } => match action {
            RulesAction::List => handlers::handle_rules_list(&session),
            RulesAction::Add { source, target } => {
                handlers::handle_rules_add(&mut session, &source, &target)
            }
            RulesAction::Remove { index } => handlers::handle_rules_remove(&mut session, index),
        },
        SessionCommand::Menu => handlers::run_menu(&mut session),
    }
}
