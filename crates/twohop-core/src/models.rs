//! Core data models shared by the aggregation engine, the preview extractor
//! and vault hosts.
//!
//! These types are designed to be:
//! - **Serializable**: result types derive Serialize/Deserialize for the CLI and tests
//! - **Immutable**: references and groups are built once per aggregation pass
//! - **Deterministic**: adjacency maps are ordered so repeated passes agree

use crate::utils::remove_block_reference;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Directed adjacency: `map[source][destination] = occurrence count`.
///
/// A source is present iff it has at least one outgoing link of this class.
pub type AdjacencyMap = BTreeMap<String, BTreeMap<String, u32>>;

/// Read-only snapshot of the vault-wide link graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraphSnapshot {
    /// Links whose destination is an existing document path
    pub resolved: AdjacencyMap,
    /// Links whose destination text does not resolve to any document
    pub unresolved: AdjacencyMap,
}

impl LinkGraphSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one resolved link occurrence from `source` to `dest`
    pub fn add_resolved(&mut self, source: impl Into<String>, dest: impl Into<String>) {
        *self
            .resolved
            .entry(source.into())
            .or_default()
            .entry(dest.into())
            .or_insert(0) += 1;
    }

    /// Record one unresolved link occurrence from `source` to `dest`
    pub fn add_unresolved(&mut self, source: impl Into<String>, dest: impl Into<String>) {
        *self
            .unresolved
            .entry(source.into())
            .or_default()
            .entry(dest.into())
            .or_insert(0) += 1;
    }

    /// Total number of distinct edges across both classes
    pub fn edge_count(&self) -> usize {
        self.resolved.values().map(BTreeMap::len).sum::<usize>()
            + self.unresolved.values().map(BTreeMap::len).sum::<usize>()
    }
}

/// A link from some document to a target, as presented to the user.
///
/// `source_path` disambiguates relative resolution of `link_text`. The link
/// text may carry a block reference (`#^id`), which is kept for display and
/// navigation but ignored for identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileReference {
    pub source_path: String,
    pub link_text: String,
}

impl FileReference {
    /// Create a new reference
    pub fn new(source_path: impl Into<String>, link_text: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            link_text: link_text.into(),
        }
    }

    /// Identity key: `source_path::link_text` without the block reference
    pub fn key(&self) -> String {
        format!("{}::{}", self.source_path, self.link_path())
    }

    /// Link text with any `#^block` suffix removed
    pub fn link_path(&self) -> &str {
        remove_block_reference(&self.link_text)
    }
}

/// One intermediate document and the sibling documents reachable through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoHopGroup {
    pub link: FileReference,
    pub members: Vec<FileReference>,
}

impl TwoHopGroup {
    pub fn new(link: FileReference, members: Vec<FileReference>) -> Self {
        Self { link, members }
    }
}

/// Documents other than the active one that share `tag` with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    pub tag: String,
    pub members: Vec<FileReference>,
}

impl TagGroup {
    pub fn new(tag: impl Into<String>, members: Vec<FileReference>) -> Self {
        Self {
            tag: tag.into(),
            members,
        }
    }
}

/// File-system facts about a document. Times are milliseconds since the epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStat {
    pub size: u64,
    pub mtime: i64,
    pub ctime: i64,
}

/// An outgoing link as written in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCache {
    pub link: String,
}

impl LinkCache {
    pub fn new(link: impl Into<String>) -> Self {
        Self { link: link.into() }
    }
}

/// An inline tag, always stored with its leading `#`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCache {
    pub tag: String,
}

impl TagCache {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// A front-matter field that may be written as a scalar or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    /// Flatten into individual values; scalars are split on commas and whitespace
    pub fn values(&self) -> Vec<String> {
        match self {
            Self::One(s) => s
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
            Self::Many(items) => items
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Like [`StringOrList::values`] but scalars are only split on commas.
    /// Aliases routinely contain spaces.
    pub fn values_preserving_spaces(&self) -> Vec<String> {
        match self {
            Self::One(s) => s
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
            Self::Many(_) => self.values(),
        }
    }
}

/// The subset of YAML front-matter this crate cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub tags: Option<StringOrList>,
    #[serde(default)]
    pub aliases: Option<StringOrList>,
}

impl Frontmatter {
    /// Tags normalised with a leading `#`
    pub fn tags(&self) -> Vec<String> {
        self.tags
            .as_ref()
            .map(|t| t.values().into_iter().map(normalize_tag).collect())
            .unwrap_or_default()
    }

    pub fn aliases(&self) -> Vec<String> {
        self.aliases
            .as_ref()
            .map(StringOrList::values_preserving_spaces)
            .unwrap_or_default()
    }
}

/// Per-document metadata supplied by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMetadata {
    pub links: Vec<LinkCache>,
    pub embeds: Vec<LinkCache>,
    pub tags: Vec<TagCache>,
    pub frontmatter: Option<Frontmatter>,
}

impl CachedMetadata {
    /// Inline tags followed by front-matter tags, first occurrence wins
    pub fn all_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let frontmatter_tags = self
            .frontmatter
            .as_ref()
            .map(Frontmatter::tags)
            .unwrap_or_default();

        self.tags
            .iter()
            .map(|t| t.tag.clone())
            .chain(frontmatter_tags)
            .filter(|tag| seen.insert(tag.clone()))
            .collect()
    }

    /// Link targets as written, in document order
    pub fn link_texts(&self) -> Vec<&str> {
        self.links.iter().map(|l| l.link.as_str()).collect()
    }
}

fn normalize_tag(tag: String) -> String {
    if tag.starts_with('#') {
        tag
    } else {
        format!("#{}", tag)
    }
}
