//! Two-hop inversion over an explicit adjacency map.
//!
//! For an active document `A` linking to destinations `D1..Dn`, every other
//! document `S` that links to some `Di` is a two-hop neighbour of `A`
//! through `Di`. The whole map is scanned once per query, which is fine at
//! personal-vault scale.

use std::collections::{BTreeMap, HashSet};
use twohop_core::{AdjacencyMap, FileReference, PathFilter, path_to_link_text};

/// Map each destination of `active_path` to the other sources linking to it.
///
/// Destinations iterate in map order and contributors in source order, so
/// the result is deterministic. Documents linking to themselves are not
/// their own siblings.
pub fn invert_two_hop(active_path: &str, links: &AdjacencyMap) -> BTreeMap<String, Vec<String>> {
    let mut result: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let Some(active_links) = links.get(active_path) else {
        return result;
    };

    for (src, dests) in links {
        if src == active_path {
            continue;
        }
        for dest in dests.keys() {
            if dest != src && active_links.contains_key(dest) {
                result.entry(dest.clone()).or_default().push(src.clone());
            }
        }
    }
    result
}

/// A two-hop group before stat annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCandidate {
    /// Intermediate document as presented
    pub link: FileReference,
    /// Intermediate path; `None` when it is an unresolved link
    pub path: Option<String>,
    /// Sibling reference and its document path
    pub members: Vec<(FileReference, String)>,
}

/// Duplicate-removal state shared by every group of one aggregation pass.
#[derive(Debug, Clone, Default)]
pub struct DedupState {
    enabled: bool,
    forward_keys: HashSet<String>,
    emitted: HashSet<String>,
}

impl DedupState {
    pub fn new(enabled: bool, forward_keys: HashSet<String>) -> Self {
        Self {
            enabled,
            forward_keys,
            emitted: HashSet::new(),
        }
    }

    /// Record `key` and report whether it may be emitted.
    fn admit(&mut self, key: String) -> bool {
        if self.enabled && (self.forward_keys.contains(&key) || self.emitted.contains(&key)) {
            return false;
        }
        self.emitted.insert(key);
        true
    }
}

/// Build filtered, deduplicated two-hop groups for one link class.
///
/// `resolved` says whether destinations in `links` are document paths.
/// Groups with no surviving members are dropped.
pub fn collect_groups(
    active_path: &str,
    links: &AdjacencyMap,
    resolved: bool,
    filter: &PathFilter,
    dedup: &mut DedupState,
) -> Vec<GroupCandidate> {
    invert_two_hop(active_path, links)
        .into_iter()
        .filter(|(dest, _)| !filter.is_excluded(dest))
        .filter_map(|(dest, contributors)| {
            let members: Vec<(FileReference, String)> = contributors
                .into_iter()
                .filter(|src| !filter.is_excluded(src))
                .filter_map(|src| {
                    let reference = FileReference::new(active_path, path_to_link_text(&src));
                    dedup.admit(reference.key()).then_some((reference, src))
                })
                .collect();

            if members.is_empty() {
                return None;
            }

            let (link, path) = if resolved {
                (
                    FileReference::new(active_path, path_to_link_text(&dest)),
                    Some(dest),
                )
            } else {
                (FileReference::new(active_path, dest.as_str()), None)
            };
            Some(GroupCandidate {
                link,
                path,
                members,
            })
        })
        .collect()
}
