//! Status, listing and remote action handlers

use anyhow::{Context, Result};
use colored::Colorize;

use super::{audit, ensure_fetched, resolve_key};
use crate::error::SyncError;
use crate::model::FileKey;
use crate::report::{self, ListFilter};
use crate::session::{ActionOutcome, SyncSession};
use crate::transport::Transport;

/// Handle status command
pub fn handle_status<T: Transport>(session: &mut SyncSession<T>) -> Result<()> {
    ensure_fetched(session)?;
    report::print_status_summary(session.state());
    Ok(())
}

/// Handle list command
pub fn handle_list<T: Transport>(session: &mut SyncSession<T>, filter: &ListFilter) -> Result<()> {
    ensure_fetched(session)?;
    report::print_file_list(session.state(), filter);
    Ok(())
}

/// Handle matches command
pub fn handle_matches<T: Transport>(session: &mut SyncSession<T>) -> Result<()> {
    ensure_fetched(session)?;
    report::print_partial_matches(session.state());
    Ok(())
}

/// Handle dirs command
pub fn handle_dirs<T: Transport>(session: &mut SyncSession<T>) -> Result<()> {
    ensure_fetched(session)?;
    let dirs = session
        .state()
        .additional_local_directories(&session.manifest().rules);
    report::print_additional_directories(&dirs);
    Ok(())
}

/// Handle diff command
///
/// Remote contents missing from the listing are fetched first so the diff
/// covers every out-of-sync pair.
pub fn handle_diff<T: Transport>(session: &mut SyncSession<T>, path: Option<&str>) -> Result<()> {
    ensure_fetched(session)?;

    let keys: Vec<FileKey> = match path {
        Some(path) => vec![resolve_key(session, path)?],
        None => session
            .state()
            .unsynced()
            .into_iter()
            .filter(|f| f.has_local_path() && f.remote_present())
            .map(|f| f.key())
            .collect(),
    };

    for key in &keys {
        let needs_contents = session
            .state()
            .get(key)
            .is_some_and(|f| f.remote_present() && f.remote_contents.is_none());
        if needs_contents {
            session
                .load_remote_contents(key)
                .with_context(|| format!("Failed to fetch remote contents of {key}"))?;
        }
    }

    let state = session.state();
    report::print_diffs(keys.iter().filter_map(|key| state.get(key)));
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Upload,
    Delete,
    Overwrite,
}

impl Action {
    fn past_tense(&self) -> &'static str {
        match self {
            Action::Upload => "Uploaded",
            Action::Delete => "Deleted remote copy of",
            Action::Overwrite => "Overwrote remote copy of",
        }
    }
}

fn run_action<T: Transport>(
    session: &mut SyncSession<T>,
    action: Action,
    paths: &[String],
) -> Result<()> {
    ensure_fetched(session)?;

    let mut failures = 0;
    for path in paths {
        let key = match resolve_key(session, path) {
            Ok(key) => key,
            Err(e) => {
                println!("  {} {e}", "✗".red());
                failures += 1;
                continue;
            }
        };

        let result = match action {
            Action::Upload => session.upload(&key),
            Action::Delete => session.delete(&key),
            Action::Overwrite => session.overwrite_remote(&key),
        };

        match result {
            Ok(ActionOutcome::Completed) => {
                let message = format!("{} {}", action.past_tense(), key);
                audit(&message);
                println!("  {} {}", "✓".green(), message);
            }
            Ok(ActionOutcome::Cancelled) => {
                println!("  {} Skipped {}", "-".yellow(), key);
            }
            Err(e @ SyncError::PartialCompletion { .. }) => {
                audit(&format!("INCOMPLETE: {e}"));
                println!("  {} {}", "✗".red().bold(), e.to_string().red());
                failures += 1;
            }
            Err(e) => {
                log::debug!("{action:?} of {key} failed: {e:?}");
                println!("  {} {}", "✗".red(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files failed", failures, paths.len());
    }
    Ok(())
}

/// Handle upload command
pub fn handle_upload<T: Transport>(session: &mut SyncSession<T>, paths: &[String]) -> Result<()> {
    run_action(session, Action::Upload, paths)
}

/// Handle delete command
pub fn handle_delete<T: Transport>(session: &mut SyncSession<T>, paths: &[String]) -> Result<()> {
    run_action(session, Action::Delete, paths)
}

/// Handle overwrite command
pub fn handle_overwrite<T: Transport>(
    session: &mut SyncSession<T>,
    paths: &[String],
) -> Result<()> {
    run_action(session, Action::Overwrite, paths)
}
