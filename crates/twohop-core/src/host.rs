//! The host collaborator: link graph, metadata cache, resolution and file access.

use crate::error::Result;
use crate::models::{CachedMetadata, DocumentStat, LinkGraphSnapshot};
use async_trait::async_trait;

/// Read-only view of a vault supplied by the host application.
///
/// Synchronous methods are expected to answer from in-memory caches.
/// `stat` and `read_text` may touch storage and can fail per document.
#[async_trait]
pub trait VaultHost: Send + Sync {
    /// Snapshot of the whole vault's link graph
    fn link_graph(&self) -> &LinkGraphSnapshot;

    /// Parsed metadata for `path`, or `None` if the document has none cached
    fn cached_metadata(&self, path: &str) -> Option<CachedMetadata>;

    /// Every markdown document in the vault
    fn markdown_files(&self) -> Vec<String>;

    /// Resolve `link_text` as written in `source_path` to a document path
    fn resolve_link(&self, link_text: &str, source_path: &str) -> Option<String>;

    /// File-system facts for `path`
    async fn stat(&self, path: &str) -> Result<DocumentStat>;

    /// Full text content of `path`
    async fn read_text(&self, path: &str) -> Result<String>;

    /// URL the presentation layer can load `path` from
    fn resource_url(&self, path: &str) -> String;
}
