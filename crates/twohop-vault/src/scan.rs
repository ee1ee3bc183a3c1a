//! Directory scanning.

use std::path::{Component, Path};
use twohop_core::{Error, Result};
use walkdir::{DirEntry, WalkDir};

/// A file found under the vault root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Vault-relative path with `/` separators
    pub path: String,
    pub markdown: bool,
}

/// Walk `root` and list every file, skipping dot-directories and dot-files.
///
/// Entries that cannot be read (dangling symlinks, loops, unreadable
/// directories) and names that are not valid UTF-8 are skipped with a
/// warning. Only an unreadable root is an error.
pub fn scan_vault(root: &Path) -> Result<Vec<ScannedFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(Error::other(format!("Failed to scan vault: {}", e)));
            }
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(path) = vault_relative(root, entry.path()) else {
            log::warn!("Skipping non UTF-8 path: {}", entry.path().display());
            continue;
        };
        let markdown = is_markdown(&path);
        files.push(ScannedFile { path, markdown });
    }

    Ok(files)
}

/// Convert an absolute path below `root` to a `/`-separated vault path.
pub fn vault_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => segments.push(name.to_str()?),
            _ => return None,
        }
    }
    (!segments.is_empty()).then(|| segments.join("/"))
}

/// Whether a vault path names a markdown note
pub fn is_markdown(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_skips_hidden_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("notes/deep")).unwrap();
        std::fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        std::fs::write(dir.path().join("index.md"), "# Index").unwrap();
        std::fs::write(dir.path().join("notes/deep/a.MD"), "").unwrap();
        std::fs::write(dir.path().join("notes/pic.png"), [0u8; 4]).unwrap();
        std::fs::write(dir.path().join(".obsidian/app.json"), "{}").unwrap();
        std::fs::write(dir.path().join(".hidden.md"), "").unwrap();

        let files = scan_vault(dir.path()).unwrap();
        let paths: Vec<(&str, bool)> = files.iter().map(|f| (f.path.as_str(), f.markdown)).collect();
        assert_eq!(
            paths,
            vec![
                ("index.md", true),
                ("notes/deep/a.MD", true),
                ("notes/pic.png", false),
            ]
        );
    }

    #[test]
    fn test_vault_relative() {
        let root = Path::new("/vault");
        assert_eq!(
            vault_relative(root, Path::new("/vault/a/b.md")).as_deref(),
            Some("a/b.md")
        );
        assert_eq!(vault_relative(root, Path::new("/elsewhere/b.md")), None);
        assert_eq!(vault_relative(root, root), None);
    }
}
