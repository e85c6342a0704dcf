//! Command handler modules
//!
//! The binary and the interactive menu dispatch to the same functions here,
//! organized by functionality area.

pub mod actions;
pub mod manifest;
pub mod menu;

pub use actions::{
    handle_delete, handle_diff, handle_dirs, handle_list, handle_matches, handle_overwrite,
    handle_status, handle_upload,
};
pub use manifest::{
    handle_manifest_save, handle_manifest_show, handle_manifest_upload, handle_rules_add,
    handle_rules_list, handle_rules_remove,
};
pub use menu::run_menu;

use anyhow::{Context, Result};

use crate::logger;
use crate::model::FileKey;
use crate::session::SyncSession;
use crate::transport::Transport;

/// Run a fetch unless this session already has a state
pub(crate) fn ensure_fetched<T: Transport>(session: &mut SyncSession<T>) -> Result<()> {
    if !session.state().fetched() {
        session
            .fetch()
            .context("Failed to fetch local and remote files")?;
    }
    Ok(())
}

/// Map a path typed by the user to the file it names
pub(crate) fn resolve_key<T: Transport>(session: &SyncSession<T>, path: &str) -> Result<FileKey> {
    let path = path.trim_start_matches("./");
    session
        .state()
        .find(path)
        .ok_or_else(|| anyhow::anyhow!("No tracked file at '{path}'"))
}

/// Record a remote mutation in the audit log
///
/// The action already happened, so a failing log write only warns.
pub(crate) fn audit(message: &str) {
    if let Err(e) = logger::log_to_file(message) {
        log::warn!("Failed to write audit log: {e:#}");
    }
}
