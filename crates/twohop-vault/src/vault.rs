//! Filesystem-backed [`VaultHost`].

use crate::scan::{is_markdown, scan_vault};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::instrument;
use twohop_core::prelude::*;
use twohop_parser::parse_metadata;
use url::Url;

/// A vault directory scanned into memory.
///
/// Metadata and the link graph are computed once by [`FsVault::open`] and
/// updated per file by [`FsVault::refresh`]. Stats and reads always hit
/// the disk.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    /// Every file; markdown notes carry parsed metadata
    documents: BTreeMap<String, Option<CachedMetadata>>,
    resolver: LinkResolver,
    graph: LinkGraphSnapshot,
}

impl FsVault {
    /// Scan `root` and parse every markdown note.
    ///
    /// Notes that cannot be read are kept without metadata so links to them
    /// still resolve.
    #[instrument(skip_all, fields(root = %root.as_ref().display()), name = "vault_open")]
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !tokio::fs::metadata(&root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(Error::invalid_path(format!(
                "Vault root is not a directory: {}",
                root.display()
            )));
        }

        let files = scan_vault(&root)?;
        log::info!("Found {} files in {}", files.len(), root.display());

        let mut documents = BTreeMap::new();
        for file in files {
            let metadata = if file.markdown {
                match tokio::fs::read_to_string(root.join(&file.path)).await {
                    Ok(content) => Some(parse_metadata(&content)),
                    Err(e) => {
                        log::warn!("Failed to read {}: {}", file.path, e);
                        None
                    }
                }
            } else {
                None
            };
            documents.insert(file.path, metadata);
        }

        let mut vault = Self {
            root,
            documents,
            resolver: LinkResolver::new(),
            graph: LinkGraphSnapshot::new(),
        };
        vault.rebuild();

        log::info!(
            "Vault loaded: {} files, {} links",
            vault.documents.len(),
            vault.graph.edge_count()
        );
        Ok(vault)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files, notes and attachments alike
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }

    /// Re-read one file after it changed on disk.
    ///
    /// A file that no longer exists is forgotten. Returns `true` when the
    /// set of known files or the file's metadata changed.
    #[instrument(skip(self), name = "vault_refresh")]
    pub async fn refresh(&mut self, path: &str) -> Result<bool> {
        let absolute = self.absolute(path)?;
        let read = if is_markdown(path) {
            tokio::fs::read_to_string(&absolute)
                .await
                .map(|content| Some(parse_metadata(&content)))
        } else {
            tokio::fs::metadata(&absolute).await.map(|_| None)
        };
        let metadata = match read {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let removed = self.documents.remove(path).is_some();
                if removed {
                    log::debug!("Removed {}", path);
                    self.rebuild();
                }
                return Ok(removed);
            }
            Err(e) => return Err(Error::io(e)),
        };

        let changed = self.documents.get(path) != Some(&metadata);
        if changed {
            self.documents.insert(path.to_string(), metadata);
            self.rebuild();
        }
        Ok(changed)
    }

    fn rebuild(&mut self) {
        let resolver = LinkResolver::index(
            self.documents
                .iter()
                .map(|(path, metadata)| (path.as_str(), metadata.as_ref())),
        );
        self.graph = build_link_graph(
            self.documents
                .iter()
                .filter_map(|(path, metadata)| metadata.as_ref().map(|m| (path.as_str(), m))),
            &resolver,
        );
        self.resolver = resolver;
    }

    /// Absolute path of a vault path. Paths escaping the root are rejected.
    fn absolute(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::invalid_path(format!(
                "Path escapes the vault: {}",
                path
            )));
        }
        Ok(self.root.join(relative))
    }
}

fn not_found_or_io(path: &str, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::file_not_found(path)
    } else {
        Error::io(err)
    }
}

fn millis(time: io::Result<SystemTime>) -> Option<i64> {
    let duration = time.ok()?.duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(duration.as_millis()).ok()
}

#[async_trait]
impl VaultHost for FsVault {
    fn link_graph(&self) -> &LinkGraphSnapshot {
        &self.graph
    }

    fn cached_metadata(&self, path: &str) -> Option<CachedMetadata> {
        self.documents.get(path).cloned().flatten()
    }

    fn markdown_files(&self) -> Vec<String> {
        self.documents
            .keys()
            .filter(|path| is_markdown(path))
            .cloned()
            .collect()
    }

    fn resolve_link(&self, link_text: &str, source_path: &str) -> Option<String> {
        self.resolver.resolve(link_text, source_path)
    }

    async fn stat(&self, path: &str) -> Result<DocumentStat> {
        let metadata = tokio::fs::metadata(self.absolute(path)?)
            .await
            .map_err(|e| not_found_or_io(path, e))?;
        if !metadata.is_file() {
            return Err(Error::invalid_path(format!("Not a file: {}", path)));
        }

        let mtime = millis(metadata.modified()).unwrap_or(0);
        // Birth time is unavailable on some filesystems
        let ctime = millis(metadata.created()).unwrap_or(mtime);
        Ok(DocumentStat {
            size: metadata.len(),
            mtime,
            ctime,
        })
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        tokio::fs::read_to_string(self.absolute(path)?)
            .await
            .map_err(|e| not_found_or_io(path, e))
    }

    fn resource_url(&self, path: &str) -> String {
        let absolute = self.root.join(path);
        match Url::from_file_path(&absolute) {
            Ok(url) => url.to_string(),
            Err(()) => format!("file://{}", absolute.display()),
        }
    }
}
