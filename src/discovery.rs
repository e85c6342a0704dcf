use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;
use crate::error::{Result, SyncError};
use crate::reconcile::LocalRecord;

fn is_excluded_dir(entry: &DirEntry, scan: &ScanConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| scan.exclude_dirs.iter().any(|d| d == name))
}

fn is_candidate(name: &str, scan: &ScanConfig) -> bool {
    scan.include_files.iter().any(|f| f == name)
        || scan.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// Relative path with `/` separators regardless of platform
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.iter().map(|part| part.to_str()).collect();
    Some(parts?.join("/"))
}

/// Enumerate candidate files under `root`
///
/// Excluded directories are pruned wherever they appear in the tree. Paths
/// that are not valid UTF-8 are skipped with a warning.
pub fn list_candidate_files(root: &Path, scan: &ScanConfig) -> Result<BTreeSet<String>> {
    if !root.is_dir() {
        return Err(SyncError::io(
            root,
            io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut files = BTreeSet::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded_dir(e, scan))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(name) = entry.file_name().to_str() else {
            log::warn!("Skipping non UTF-8 file name: {}", entry.path().display());
            continue;
        };
        if !is_candidate(name, scan) {
            continue;
        }

        match relative_path(root, entry.path()) {
            Some(relative) => {
                files.insert(relative);
            }
            None => log::warn!("Skipping non UTF-8 path: {}", entry.path().display()),
        }
    }

    log::debug!("Found {} candidate files under {}", files.len(), root.display());
    Ok(files)
}

/// Read the contents of each listed file
///
/// A file that cannot be read as UTF-8 text is kept with no contents, which
/// leaves it unpaired on content comparison instead of aborting the scan.
pub fn load_local_records(root: &Path, paths: &BTreeSet<String>) -> Vec<LocalRecord> {
    paths
        .iter()
        .map(|path| LocalRecord {
            path: path.clone(),
            contents: match read_local_file(root, path) {
                Ok(contents) => Some(contents),
                Err(e) => {
                    log::warn!("{e}");
                    None
                }
            },
        })
        .collect()
}

/// Read one file under `root` by its relative path
pub fn read_local_file(root: &Path, relative: &str) -> Result<String> {
    let path = root.join(relative);
    fs::read_to_string(&path).map_err(|e| SyncError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_lists_by_extension_and_skips_excluded_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/app.ts", "x");
        write(root, "src/components/Header.tsx", "x");
        write(root, "gcf/main.py", "x");
        write(root, "README.md", "x");
        write(root, "manifest.json", "{}");
        write(root, "package.json", "{}");
        write(root, "node_modules/lib/index.js", "x");
        write(root, "web/build/bundle.js", "x");

        let files = list_candidate_files(root, &ScanConfig::default()).unwrap();
        let files: Vec<&str> = files.iter().map(String::as_str).collect();

        assert_eq!(
            files,
            vec!["gcf/main.py", "manifest.json", "src/app.ts", "src/components/Header.tsx"]
        );
    }

    #[test]
    fn test_excluded_name_only_matches_whole_directory() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "builder/make.py", "x");

        let files = list_candidate_files(temp.path(), &ScanConfig::default()).unwrap();
        assert!(files.contains("builder/make.py"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(list_candidate_files(&temp.path().join("nope"), &ScanConfig::default()).is_err());
    }

    #[test]
    fn test_load_local_records_keeps_unreadable_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.py", "print(1)");
        fs::write(temp.path().join("b.py"), [0xff, 0xfe, 0x00]).unwrap();

        let paths: BTreeSet<String> = ["a.py", "b.py"].map(String::from).into();
        let records = load_local_records(temp.path(), &paths);

        assert_eq!(records[0], LocalRecord::new("a.py", "print(1)"));
        assert_eq!(records[1].path, "b.py");
        assert!(records[1].contents.is_none());
    }
}
