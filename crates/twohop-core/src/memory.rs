//! In-memory [`VaultHost`] for embedding and testing.
//!
//! Documents are registered with their cached metadata and content; the link
//! graph is rebuilt after every change.

use crate::error::{Error, Result};
use crate::host::VaultHost;
use crate::models::{CachedMetadata, DocumentStat, LinkGraphSnapshot};
use crate::resolver::{LinkResolver, build_link_graph};
use async_trait::async_trait;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct MemoryDocument {
    metadata: Option<CachedMetadata>,
    content: String,
    /// `None` makes `stat` fail
    stat: Option<DocumentStat>,
    markdown: bool,
}

/// A vault held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    documents: BTreeMap<String, MemoryDocument>,
    resolver: LinkResolver,
    graph: LinkGraphSnapshot,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a markdown note with its metadata and content
    pub fn with_note(
        mut self,
        path: &str,
        metadata: CachedMetadata,
        content: impl Into<String>,
    ) -> Self {
        self.insert_note(path, Some(metadata), content.into());
        self
    }

    /// Add a non-markdown file (image, pdf, ...)
    pub fn with_attachment(mut self, path: &str, size: u64) -> Self {
        self.documents.insert(
            path.to_string(),
            MemoryDocument {
                metadata: None,
                content: String::new(),
                stat: Some(DocumentStat {
                    size,
                    ..Default::default()
                }),
                markdown: false,
            },
        );
        self.rebuild();
        self
    }

    /// Override the stat of an existing document
    pub fn with_stat(mut self, path: &str, stat: DocumentStat) -> Self {
        if let Some(doc) = self.documents.get_mut(path) {
            doc.stat = Some(stat);
        }
        self
    }

    /// Make `stat` fail for an existing document
    pub fn with_failing_stat(mut self, path: &str) -> Self {
        if let Some(doc) = self.documents.get_mut(path) {
            doc.stat = None;
        }
        self
    }

    /// Insert or replace a note
    pub fn insert_note(&mut self, path: &str, metadata: Option<CachedMetadata>, content: String) {
        let size = content.len() as u64;
        self.documents.insert(
            path.to_string(),
            MemoryDocument {
                metadata,
                content,
                stat: Some(DocumentStat {
                    size,
                    ..Default::default()
                }),
                markdown: true,
            },
        );
        self.rebuild();
    }

    pub fn remove(&mut self, path: &str) {
        if self.documents.remove(path).is_some() {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        let resolver = LinkResolver::index(
            self.documents
                .iter()
                .map(|(path, doc)| (path.as_str(), doc.metadata.as_ref())),
        );
        self.graph = build_link_graph(
            self.documents
                .iter()
                .filter_map(|(path, doc)| doc.metadata.as_ref().map(|m| (path.as_str(), m))),
            &resolver,
        );
        self.resolver = resolver;
    }
}

#[async_trait]
impl VaultHost for MemoryVault {
    fn link_graph(&self) -> &LinkGraphSnapshot {
        &self.graph
    }

    fn cached_metadata(&self, path: &str) -> Option<CachedMetadata> {
        self.documents.get(path).and_then(|doc| doc.metadata.clone())
    }

    fn markdown_files(&self) -> Vec<String> {
        self.documents
            .iter()
            .filter(|(_, doc)| doc.markdown)
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn resolve_link(&self, link_text: &str, source_path: &str) -> Option<String> {
        self.resolver.resolve(link_text, source_path)
    }

    async fn stat(&self, path: &str) -> Result<DocumentStat> {
        self.documents
            .get(path)
            .and_then(|doc| doc.stat)
            .ok_or_else(|| Error::file_not_found(path))
    }

    async fn read_text(&self, path: &str) -> Result<String> {
        self.documents
            .get(path)
            .map(|doc| doc.content.clone())
            .ok_or_else(|| Error::file_not_found(path))
    }

    fn resource_url(&self, path: &str) -> String {
        format!("app://local/{}", path)
    }
}
