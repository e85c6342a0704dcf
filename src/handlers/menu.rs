//! Interactive menu
//!
//! A thin loop over `inquire::Select` that dispatches to the same handlers as
//! the subcommands. The options on offer depend on whether a fetch has run.

use anyhow::{Context, Result};
use colored::Colorize;
use inquire::{InquireError, MultiSelect, Select, Text};
use std::fmt;

use super::{actions, manifest};
use crate::config;
use crate::model::FileEntry;
use crate::report::ListFilter;
use crate::session::SyncSession;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Fetch,
    Status,
    List,
    PartialMatches,
    Diff,
    Upload,
    Delete,
    Overwrite,
    AdditionalDirectories,
    ShowManifest,
    SaveManifest,
    UploadManifest,
    AddRule,
    RemoveRule,
    ShowConfig,
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::Fetch => "Fetch and compare",
            MenuAction::Status => "Show status",
            MenuAction::List => "List files",
            MenuAction::PartialMatches => "Show partial matches",
            MenuAction::Diff => "Show differences",
            MenuAction::Upload => "Upload files",
            MenuAction::Delete => "Delete remote files",
            MenuAction::Overwrite => "Overwrite remote files",
            MenuAction::AdditionalDirectories => "Show additional local directories",
            MenuAction::ShowManifest => "Show manifest",
            MenuAction::SaveManifest => "Save manifest",
            MenuAction::UploadManifest => "Upload manifest",
            MenuAction::AddRule => "Add directory rule",
            MenuAction::RemoveRule => "Remove directory rule",
            MenuAction::ShowConfig => "Show configuration",
            MenuAction::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Options offered for the current session state
///
/// Everything that reads or changes files needs a fetched state first.
pub fn menu_options(fetched: bool) -> Vec<MenuAction> {
    if !fetched {
        return vec![
            MenuAction::Fetch,
            MenuAction::ShowManifest,
            MenuAction::AddRule,
            MenuAction::RemoveRule,
            MenuAction::ShowConfig,
            MenuAction::Quit,
        ];
    }

    vec![
        MenuAction::Fetch,
        MenuAction::Status,
        MenuAction::List,
        MenuAction::PartialMatches,
        MenuAction::Diff,
        MenuAction::Upload,
        MenuAction::Delete,
        MenuAction::Overwrite,
        MenuAction::AdditionalDirectories,
        MenuAction::ShowManifest,
        MenuAction::SaveManifest,
        MenuAction::UploadManifest,
        MenuAction::AddRule,
        MenuAction::RemoveRule,
        MenuAction::ShowConfig,
        MenuAction::Quit,
    ]
}

/// Files each remote action can apply to, by display path
fn candidates<T: Transport>(
    session: &SyncSession<T>,
    keep: impl Fn(&FileEntry) -> bool,
) -> Vec<String> {
    session
        .state()
        .files()
        .filter(|f| keep(*f))
        .map(|f| f.display_path().to_string())
        .collect()
}

fn pick_files(prompt: &str, options: Vec<String>) -> Result<Vec<String>> {
    if options.is_empty() {
        println!("{}", "No files to choose from.".yellow());
        return Ok(Vec::new());
    }

    MultiSelect::new(prompt, options)
        .with_help_message("Space to select, Enter to confirm")
        .prompt()
        .context("Failed to get file selection")
}

fn dispatch<T: Transport>(session: &mut SyncSession<T>, action: MenuAction) -> Result<()> {
    match action {
        MenuAction::Fetch => {
            session
                .fetch()
                .context("Failed to fetch local and remote files")?;
            actions::handle_status(session)
        }
        MenuAction::Status => actions::handle_status(session),
        MenuAction::List => actions::handle_list(session, &ListFilter::default()),
        MenuAction::PartialMatches => actions::handle_matches(session),
        MenuAction::Diff => actions::handle_diff(session, None),
        MenuAction::Upload => {
            let options = candidates(session, |f| f.has_local_path() && !f.remote_present());
            let paths = pick_files("Files to upload:", options)?;
            if paths.is_empty() {
                return Ok(());
            }
            actions::handle_upload(session, &paths)
        }
        MenuAction::Delete => {
            let options = candidates(session, |f| f.remote_present());
            let paths = pick_files("Remote files to delete:", options)?;
            if paths.is_empty() {
                return Ok(());
            }
            actions::handle_delete(session, &paths)
        }
        MenuAction::Overwrite => {
            let options = candidates(session, |f| {
                f.has_local_path() && f.remote_present() && !f.is_fully_synced()
            });
            let paths = pick_files("Remote files to replace with the local copy:", options)?;
            if paths.is_empty() {
                return Ok(());
            }
            actions::handle_overwrite(session, &paths)
        }
        MenuAction::AdditionalDirectories => actions::handle_dirs(session),
        MenuAction::ShowManifest => manifest::handle_manifest_show(session),
        MenuAction::SaveManifest => manifest::handle_manifest_save(session),
        MenuAction::UploadManifest => manifest::handle_manifest_upload(session),
        MenuAction::AddRule => {
            let source = Text::new("Local directory:").prompt()?;
            let target = Text::new("Remote directory:")
                .with_help_message("Leave empty to map onto the remote root")
                .prompt()?;
            manifest::handle_rules_add(session, &source, &target)
        }
        MenuAction::RemoveRule => {
            let rules: Vec<String> = session
                .manifest()
                .rules
                .iter()
                .enumerate()
                .map(|(idx, rule)| format!("{idx}. {rule}"))
                .collect();
            if rules.is_empty() {
                println!("{}", "No rules defined.".yellow());
                return Ok(());
            }
            let choice = Select::new("Rule to remove:", rules).raw_prompt()?;
            manifest::handle_rules_remove(session, choice.index)
        }
        MenuAction::ShowConfig => config::show_config(),
        MenuAction::Quit => Ok(()),
    }
}

/// Run the interactive menu until the user quits
pub fn run_menu<T: Transport>(session: &mut SyncSession<T>) -> Result<()> {
    println!("{}", "docsync".cyan().bold());
    println!("{} {}", "Root:".dimmed(), session.root().display());
    println!();

    loop {
        let options = menu_options(session.state().fetched());
        let action = match Select::new("What would you like to do?", options)
            .with_page_size(16)
            .prompt()
        {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read menu selection"),
        };

        if action == MenuAction::Quit {
            break;
        }

        // A failed action is reported and the menu keeps running
        if let Err(e) = dispatch(session, action) {
            println!("{} {:#}", "Error:".red().bold(), e);
        }
        println!();
    }

    Ok(())
}
