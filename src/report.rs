use colored::{ColoredString, Colorize};
use similar::TextDiff;

use crate::manifest::Manifest;
use crate::model::{FileEntry, FileStatus};
use crate::reconcile::SyncState;

/// Which statuses the file list leaves out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    pub hide_synced: bool,
    pub hide_local_only: bool,
    pub hide_remote_only: bool,
}

impl ListFilter {
    pub fn shows(&self, entry: &FileEntry) -> bool {
        match entry.status {
            FileStatus::Synced => !self.hide_synced,
            FileStatus::LocalOnly => !self.hide_local_only,
            FileStatus::RemoteOnly => !self.hide_remote_only,
            FileStatus::Removed => false,
            FileStatus::OutOfSync | FileStatus::PartialMatch => true,
        }
    }
}

fn status_label(status: FileStatus) -> ColoredString {
    let label = format!("{:<13}", status.as_str());
    match status {
        FileStatus::Synced => label.green(),
        FileStatus::OutOfSync => label.yellow(),
        FileStatus::PartialMatch => label.magenta(),
        FileStatus::LocalOnly => label.cyan(),
        FileStatus::RemoteOnly => label.blue(),
        FileStatus::Removed => label.dimmed(),
    }
}

/// Print the number of files in each status
pub fn print_status_summary(state: &SyncState) {
    let counts = state.counts();

    println!("{}", "Sync Status".cyan().bold());
    println!("{}", "=".repeat(80).cyan());
    println!("  {} {}", status_label(FileStatus::Synced), counts.synced);
    println!("  {} {}", status_label(FileStatus::OutOfSync), counts.out_of_sync);
    println!("  {} {}", status_label(FileStatus::PartialMatch), counts.partial_match);
    println!("  {} {}", status_label(FileStatus::LocalOnly), counts.local_only);
    println!("  {} {}", status_label(FileStatus::RemoteOnly), counts.remote_only);
    if counts.removed > 0 {
        println!("  {} {}", status_label(FileStatus::Removed), counts.removed);
    }
    println!("  {:<13} {}", "total".bold(), counts.total());

    let duplicates = state.duplicate_remote_paths();
    if !duplicates.is_empty() {
        println!();
        println!(
            "{} {} remote paths appear more than once; only the first copy is tracked:",
            "Warning:".yellow().bold(),
            duplicates.len()
        );
        for path in duplicates {
            println!("  {}", path);
        }
    }
}

/// Print one line per file that passes `filter`
pub fn print_file_list(state: &SyncState, filter: &ListFilter) {
    let shown: Vec<&FileEntry> = state.files().filter(|f| filter.shows(f)).collect();

    if shown.is_empty() {
        println!("{}", "No files to show.".yellow());
        return;
    }

    println!(
        "{} {:<40} {}",
        format!("{:<13}", "STATUS").bold(),
        "LOCAL".bold(),
        "REMOTE".bold()
    );
    for entry in &shown {
        println!(
            "{} {:<40} {}",
            status_label(entry.status),
            or_dash(&entry.local_path),
            or_dash(&entry.remote_path)
        );
    }
    println!("\n{} of {} files shown", shown.len(), state.len());
}

fn or_dash(path: &str) -> &str {
    if path.is_empty() {
        "-"
    } else {
        path
    }
}

/// Print local/remote pairs that only share a file name
pub fn print_partial_matches(state: &SyncState) {
    let pairs = state.partial_matches();
    let unpaired = state.unpaired_partial_matches();
    if pairs.is_empty() && unpaired.is_empty() {
        println!("{}", "No partial matches.".green());
        return;
    }

    println!("{}", "Partial Matches".cyan().bold());
    println!("{}", "=".repeat(80).cyan());
    for (local, remote) in pairs {
        println!(
            "  {} {} {}",
            local.local_path,
            "<->".magenta(),
            remote.remote_path
        );
    }
    for entry in &unpaired {
        println!(
            "  {} {} {}",
            entry.display_path(),
            "<->".magenta(),
            "(counterpart changed, fetch again)".dimmed()
        );
    }
    println!(
        "\n{} add a directory rule to pair these files exactly",
        "Hint:".dimmed()
    );
}

/// Unified diff from the remote copy to the local copy
///
/// `None` when the entry is not paired, either side's contents are not
/// loaded, or both sides are identical.
pub fn render_diff(entry: &FileEntry) -> Option<String> {
    if !entry.has_local_path() || !entry.remote_present() {
        return None;
    }
    let local = entry.local_contents.as_deref()?;
    let remote = entry.remote_contents.as_deref()?;
    if local == remote {
        return None;
    }

    let diff = TextDiff::from_lines(remote, local);
    Some(
        diff.unified_diff()
            .context_radius(3)
            .header(
                &format!("{} (remote)", entry.remote_path),
                &format!("{} (local)", entry.local_path),
            )
            .to_string(),
    )
}

/// Print diffs for paired files that differ, optionally for a single path
pub fn print_diffs<'a>(entries: impl IntoIterator<Item = &'a FileEntry>) {
    let mut printed = 0;
    let mut unloaded = Vec::new();

    for entry in entries {
        if entry.status != FileStatus::OutOfSync {
            continue;
        }
        match render_diff(entry) {
            Some(diff) => {
                print_colored_diff(&diff);
                printed += 1;
            }
            None if entry.remote_contents.is_none() || entry.local_contents.is_none() => {
                unloaded.push(entry.display_path());
            }
            None => {}
        }
    }

    if printed == 0 && unloaded.is_empty() {
        println!("{}", "No differences.".green());
    }
    for path in unloaded {
        println!(
            "{} contents not loaded for {}",
            "Note:".yellow(),
            path
        );
    }
}

fn print_colored_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{}", line);
        }
    }
}

/// Print local directories with no remote counterpart
pub fn print_additional_directories(dirs: &[String]) {
    if dirs.is_empty() {
        println!("{}", "Every local directory is known remotely.".green());
        return;
    }

    println!("{}", "Additional Local Directories".cyan().bold());
    for dir in dirs {
        println!("  {}", dir);
    }
}

/// Print rules and the last saved snapshot
pub fn print_manifest(manifest: &Manifest) {
    println!("{}", "Rules".cyan().bold());
    if manifest.rules.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for (idx, rule) in manifest.rules.iter().enumerate() {
        println!("  {}. {}", idx, rule);
    }

    println!();
    println!("{}", "Snapshot".cyan().bold());
    if manifest.files.is_empty() {
        println!("  {}", "Empty (save the manifest after a fetch)".dimmed());
    }
    for file in &manifest.files {
        println!("  {} {}", status_label(file.status), file.path);
    }

    if !manifest.additional_local_directories.is_empty() {
        println!();
        print_additional_directories(&manifest.additional_local_directories);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired(local: &str, remote: &str) -> FileEntry {
        let mut entry = FileEntry::local("src/a.py", Some(local.to_string()));
        entry.remote_path = "src/a.py".to_string();
        entry.remote_id = Some("id-1".to_string());
        entry.remote_contents = Some(remote.to_string());
        entry.recompute_status();
        entry
    }

    #[test]
    fn test_filter_hides_selected_statuses() {
        let filter = ListFilter {
            hide_synced: true,
            hide_local_only: false,
            hide_remote_only: true,
        };

        assert!(!filter.shows(&paired("x", "x")));
        assert!(filter.shows(&paired("x", "y")));
        assert!(filter.shows(&FileEntry::local("a.py", None)));
        assert!(!filter.shows(&FileEntry::remote("b.py", "id", None)));
    }

    #[test]
    fn test_render_diff_goes_from_remote_to_local() {
        let diff = render_diff(&paired("a\nB\nc\n", "a\nb\nc\n")).unwrap();

        assert!(diff.contains("--- src/a.py (remote)"));
        assert!(diff.contains("+++ src/a.py (local)"));
        assert!(diff.contains("-b\n"));
        assert!(diff.contains("+B\n"));
    }

    #[test]
    fn test_render_diff_skips_identical_and_unpaired() {
        assert!(render_diff(&paired("same\n", "same\n")).is_none());
        assert!(render_diff(&FileEntry::local("a.py", Some("x".to_string()))).is_none());

        let mut unloaded = paired("x", "y");
        unloaded.remote_contents = None;
        assert!(render_diff(&unloaded).is_none());
    }
}
