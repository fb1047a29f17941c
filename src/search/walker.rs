//! File discovery.
//!
//! A single walker thread feeds candidate paths into a bounded channel,
//! honoring .gitignore and .ignore rules, hidden-file conventions, the
//! extension allowlist and location excludes. Everything content-related
//! (binary, minified, size) is the reader pool's problem.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use ignore::WalkBuilder;
use tracing::debug;

use crate::config::SearchOptions;

/// A discovered file, before any content checks.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub location: PathBuf,
    pub filename: String,
}

/// Walk upwards from `path` looking for a .git or .hg directory and
/// return the directory containing it, or the original path when no
/// repository root is found.
pub fn find_repository_root(path: &Path) -> PathBuf {
    let start = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let mut current = start.clone();
    loop {
        if current.join(".git").exists() || current.join(".hg").exists() {
            return current;
        }
        if !current.pop() {
            return start;
        }
    }
}

/// Spawn the walker thread. The returned handle finishes once every
/// candidate has been sent, the receiver hung up, or `cancel` was set.
pub fn spawn_walker(
    options: Arc<SearchOptions>,
    output: Sender<FileEntry>,
    cancel: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let root = if options.find_root {
            find_repository_root(&options.dir)
        } else {
            options.dir.clone()
        };

        let mut builder = WalkBuilder::new(&root);
        builder
            .hidden(!options.include_hidden)
            .git_ignore(!options.ignore_gitignore)
            .git_global(!options.ignore_gitignore)
            .git_exclude(!options.ignore_gitignore)
            .ignore(!options.ignore_ignorefile)
            .parents(!options.ignore_gitignore)
            .follow_links(false);

        let denylist = options.path_denylist.clone();
        builder.filter_entry(move |entry| {
            !denylist
                .iter()
                .any(|deny| entry.file_name() == deny.as_str())
        });

        for result in builder.build() {
            if cancel.load(Ordering::Relaxed) {
                break;
            }

            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "walk error so moving on");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let location = entry.into_path();
            if !allowed_extension(&location, &options.allow_list_extensions) {
                continue;
            }

            let location_str = location.to_string_lossy();
            if options
                .location_exclude_patterns
                .iter()
                .any(|pattern| location_str.contains(pattern.as_str()))
            {
                continue;
            }

            let filename = location
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            if output.send(FileEntry { location, filename }).is_err() {
                break;
            }
        }
    })
}

fn allowed_extension(path: &Path, allow_list: &[String]) -> bool {
    if allow_list.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allow_list.iter().any(|allowed| allowed == ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::fs;
    use tempfile::TempDir;

    fn walk(options: SearchOptions) -> Vec<String> {
        let (tx, rx) = unbounded();
        let handle = spawn_walker(Arc::new(options), tx, Arc::new(AtomicBool::new(false)));
        let mut names: Vec<String> = rx.iter().map(|e| e.filename).collect();
        handle.join().unwrap();
        names.sort();
        names
    }

    #[test]
    fn test_walker_finds_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("b.rs"), "beta").unwrap();

        let names = walk(SearchOptions {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        assert_eq!(names, vec!["a.txt".to_string(), "b.rs".to_string()]);
    }

    #[test]
    fn test_walker_extension_allowlist() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::write(dir.path().join("b.rs"), "beta").unwrap();

        let names = walk(SearchOptions {
            dir: dir.path().to_path_buf(),
            allow_list_extensions: vec!["rs".to_string()],
            ..Default::default()
        });
        assert_eq!(names, vec!["b.rs".to_string()]);
    }

    #[test]
    fn test_walker_skips_hidden_by_default() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".hidden"), "boo").unwrap();
        fs::write(dir.path().join("seen.txt"), "yes").unwrap();

        let names = walk(SearchOptions {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        assert_eq!(names, vec!["seen.txt".to_string()]);

        let names = walk(SearchOptions {
            dir: dir.path().to_path_buf(),
            include_hidden: true,
            ..Default::default()
        });
        assert_eq!(names, vec![".hidden".to_string(), "seen.txt".to_string()]);
    }

    #[test]
    fn test_walker_denylist_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("vendor")).unwrap();
        fs::write(dir.path().join("vendor/dep.rs"), "dep").unwrap();
        fs::write(dir.path().join("main.rs"), "main").unwrap();

        let names = walk(SearchOptions {
            dir: dir.path().to_path_buf(),
            path_denylist: vec!["vendor".to_string()],
            ..Default::default()
        });
        assert_eq!(names, vec!["main.rs".to_string()]);
    }

    #[test]
    fn test_walker_location_exclude_pattern() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo_test.go"), "x").unwrap();
        fs::write(dir.path().join("foo.go"), "x").unwrap();

        let names = walk(SearchOptions {
            dir: dir.path().to_path_buf(),
            location_exclude_patterns: vec!["_test.go".to_string()],
            ..Default::default()
        });
        assert_eq!(names, vec!["foo.go".to_string()]);
    }

    #[test]
    fn test_find_repository_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();

        let root = find_repository_root(&dir.path().join("src/deep"));
        assert_eq!(root, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_find_repository_root_absent_is_ancestor_or_self() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("plain");
        fs::create_dir(&nested).unwrap();
        // With no repository marker the result is the starting path, or
        // an ancestor if some outer directory happens to carry one
        let root = find_repository_root(&nested);
        let canonical = nested.canonicalize().unwrap();
        assert!(canonical.starts_with(&root));
    }
}
