//! Document discovery by filesystem walking.
//!
//! Each given path is a root: a Markdown file becomes a single document named
//! relative to its own directory, a directory is walked recursively with
//! relative paths taken from the directory itself. A subdirectory's
//! `index.md` is that directory's content rather than a page of its own.
//! Directories without one are not emitted; the orchestrator synthesizes them
//! when a child needs a parent page.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::document::{Document, DocumentSet};

const INDEX_FILE: &str = "index.md";

/// Discover documents under `paths`, in walk order.
///
/// Missing paths and non-Markdown files given directly are logged and
/// skipped. Hidden files and directories are ignored.
pub fn discover<P: AsRef<Path>>(paths: &[P]) -> DocumentSet {
    let mut documents = DocumentSet::new();
    for path in paths {
        let path = absolute(path.as_ref());
        if path.is_dir() {
            scan_directory(&path, "", &mut documents);
        } else if path.is_file() {
            if is_markdown(&path) {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                documents.push(Document::file(path, &name));
            } else {
                warn!("Not a Markdown file, ignoring: {}", path.display());
            }
        } else {
            warn!("Path does not exist, ignoring: {}", path.display());
        }
    }
    debug!("Discovered {} documents", documents.len());
    documents
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "md")
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}

fn scan_directory(dir_path: &Path, prefix: &str, documents: &mut DocumentSet) {
    let entries = match fs::read_dir(dir_path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read directory {}: {}", dir_path.display(), e);
            return;
        }
    };

    // Sorted for a stable processing order across runs
    let mut entries: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|e| {
            let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
            let name = e.file_name().to_string_lossy().into_owned();
            (e.path(), is_dir, name)
        })
        .filter(|(_, _, name)| !name.starts_with('.'))
        .collect();
    entries.sort_by(|a, b| a.2.cmp(&b.2));

    // The directory document goes first so logs read top-down.
    if !prefix.is_empty() {
        let index = entries
            .iter()
            .find(|(_, is_dir, name)| !is_dir && name == INDEX_FILE)
            .map(|(path, _, _)| path.clone());
        if let Some(index) = index {
            documents.push(Document::directory(dir_path, prefix, Some(index)));
        }
    }

    for (path, is_dir, name) in entries {
        if is_dir {
            scan_directory(&path, &join_relative(prefix, &name), documents);
        } else if is_markdown(&path) && !(name == INDEX_FILE && !prefix.is_empty()) {
            documents.push(Document::file(path, &join_relative(prefix, &name)));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# Test").unwrap();
    }

    fn paths(documents: &DocumentSet) -> Vec<(&str, bool, bool)> {
        documents
            .iter()
            .map(|d| (d.relative_path.as_str(), d.is_directory, d.has_content()))
            .collect()
    }

    #[test]
    fn test_discover_tree() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "intro.md");
        write(temp.path(), "guide/index.md");
        write(temp.path(), "guide/setup.md");
        write(temp.path(), "api/v1/endpoints.md");
        write(temp.path(), "notes.txt");

        let documents = discover(&[temp.path()]);

        assert_eq!(
            paths(&documents),
            vec![
                ("api/v1/endpoints.md", false, true),
                ("guide", true, true),
                ("guide/setup.md", false, true),
                ("intro.md", false, true),
            ]
        );
        let guide = documents.get(documents.find("guide").unwrap());
        assert_eq!(
            guide.content_path,
            Some(temp.path().join("guide/index.md"))
        );
    }

    #[test]
    fn test_root_index_is_a_regular_page() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "index.md");

        let documents = discover(&[temp.path()]);
        assert_eq!(paths(&documents), vec![("index.md", false, true)]);
    }

    #[test]
    fn test_hidden_entries_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), ".hidden.md");
        write(temp.path(), ".git/HEAD.md");
        write(temp.path(), "visible.md");

        let documents = discover(&[temp.path()]);
        assert_eq!(paths(&documents), vec![("visible.md", false, true)]);
    }

    #[test]
    fn test_single_file_is_relative_to_its_directory() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "deep/nested/page.md");

        let documents = discover(&[temp.path().join("deep/nested/page.md")]);
        assert_eq!(paths(&documents), vec![("page.md", false, true)]);
    }

    #[test]
    fn test_missing_and_non_markdown_paths_are_ignored() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "notes.txt");

        let documents = discover(&[temp.path().join("missing"), temp.path().join("notes.txt")]);
        assert!(documents.is_empty());
    }

    #[test]
    fn test_duplicate_relative_paths_keep_first_root() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), "readme.md");
        write(second.path(), "readme.md");

        let documents = discover(&[first.path(), second.path()]);
        assert_eq!(documents.len(), 1);
        assert_eq!(
            documents.get(0).absolute_path,
            first.path().join("readme.md")
        );
    }
}
