//! Best-effort link resolution and link graph construction.
//!
//! Resolution mirrors how Obsidian picks the destination of a link:
//! relative paths first, then exact vault paths, then the closest document
//! whose trailing path segments match, then front-matter aliases. Matching
//! is case-insensitive and a missing `.md` extension is implied.

use crate::models::{CachedMetadata, LinkGraphSnapshot};
use crate::utils::{path_segments, path_to_link_text, strip_subpath};
use std::collections::{BTreeSet, HashMap};

/// Index of vault paths used to resolve link text.
#[derive(Debug, Clone, Default)]
pub struct LinkResolver {
    paths: BTreeSet<String>,
    /// Lowercase path -> actual path
    lower_paths: HashMap<String, String>,
    /// Lowercase final link-text segment -> paths
    by_name: HashMap<String, Vec<String>>,
    /// Lowercase alias -> path
    aliases: HashMap<String, String>,
}

impl LinkResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every path plus the front-matter aliases of documents that have metadata
    pub fn index<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Option<&'a CachedMetadata>)>,
    {
        let mut resolver = Self::new();
        for (path, metadata) in documents {
            resolver.insert(path);
            if let Some(fm) = metadata.and_then(|m| m.frontmatter.as_ref()) {
                for alias in fm.aliases() {
                    resolver.insert_alias(&alias, path);
                }
            }
        }
        resolver
    }

    /// Register a document or attachment path
    pub fn insert(&mut self, path: &str) {
        if !self.paths.insert(path.to_string()) {
            return;
        }
        self.lower_paths.insert(path.to_lowercase(), path.to_string());
        self.by_name
            .entry(name_key(path))
            .or_default()
            .push(path.to_string());
    }

    /// Register an alias for a document
    pub fn insert_alias(&mut self, alias: &str, path: &str) {
        let alias = alias.trim();
        if !alias.is_empty() {
            self.aliases.insert(alias.to_lowercase(), path.to_string());
        }
    }

    /// Forget a path and every alias pointing at it
    pub fn remove(&mut self, path: &str) {
        if !self.paths.remove(path) {
            return;
        }
        self.lower_paths.remove(&path.to_lowercase());
        if let Some(paths) = self.by_name.get_mut(&name_key(path)) {
            paths.retain(|p| p != path);
        }
        self.aliases.retain(|_, target| target != path);
    }

    /// Resolve `link_text` written in `source_path` to a vault path.
    pub fn resolve(&self, link_text: &str, source_path: &str) -> Option<String> {
        let target = strip_subpath(link_text).trim();
        let target = target.strip_prefix('/').unwrap_or(target);
        if target.is_empty() {
            return None;
        }

        // Explicit relative links: ./x, ../x
        if target.starts_with("./") || target.starts_with("../") {
            let joined = join_relative(parent_dir(source_path), target)?;
            return self.lookup_exact(&joined);
        }

        if let Some(found) = self.lookup_exact(target) {
            return Some(found);
        }

        let dir = parent_dir(source_path);
        if !dir.is_empty()
            && let Some(found) = self.lookup_exact(&format!("{}/{}", dir, target))
        {
            return Some(found);
        }

        if let Some(found) = self.lookup_by_name(target, dir) {
            return Some(found);
        }

        self.aliases.get(&target.to_lowercase()).cloned()
    }

    fn lookup_exact(&self, path: &str) -> Option<String> {
        let lower = path.to_lowercase();
        self.lower_paths
            .get(&lower)
            .or_else(|| self.lower_paths.get(&format!("{}.md", lower)))
            .cloned()
    }

    /// Closest path whose trailing segments equal the target's segments.
    fn lookup_by_name(&self, target: &str, source_dir: &str) -> Option<String> {
        let wanted = path_to_link_text(target).to_lowercase();
        let wanted_segments = path_segments(&wanted);
        let candidates = self.by_name.get(&name_key(target))?;

        candidates
            .iter()
            .filter(|path| {
                let lower = path_to_link_text(path).to_lowercase();
                let segments = path_segments(&lower);
                segments.len() >= wanted_segments.len()
                    && segments[segments.len() - wanted_segments.len()..] == wanted_segments[..]
            })
            .min_by_key(|path| {
                let same_dir = parent_dir(path) == source_dir;
                (!same_dir, path_segments(path).len(), (*path).clone())
            })
            .cloned()
    }
}

/// Build the resolved/unresolved adjacency maps for a set of documents.
///
/// Both links and embeds produce edges. Unresolved edges are keyed by the
/// link path with any heading or block subpath removed.
pub fn build_link_graph<'a, I>(documents: I, resolver: &LinkResolver) -> LinkGraphSnapshot
where
    I: IntoIterator<Item = (&'a str, &'a CachedMetadata)>,
{
    let mut graph = LinkGraphSnapshot::new();

    for (source, metadata) in documents {
        for link in metadata.links.iter().chain(metadata.embeds.iter()) {
            match resolver.resolve(&link.link, source) {
                Some(dest) => graph.add_resolved(source, dest),
                None => {
                    let text = strip_subpath(&link.link).trim();
                    if !text.is_empty() {
                        graph.add_unresolved(source, text);
                    }
                }
            }
        }
    }

    graph
}

fn name_key(path: &str) -> String {
    let text = path_to_link_text(path);
    text.rsplit('/').next().unwrap_or(text).to_lowercase()
}

fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn join_relative(dir: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = path_segments(dir);
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}
