//! Link aggregation for the active document.

use crate::sort::{Annotated, SortKey, sort_annotated};
use crate::two_hop::{DedupState, GroupCandidate, collect_groups};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use twohop_core::{
    CachedMetadata, FileReference, PathFilter, SortOrder, TagGroup, TwoHopGroup, TwohopSettings,
    VaultHost, path_to_link_text, remove_block_reference,
};

/// Everything shown for one active document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkBundle {
    /// Outgoing links to existing documents, sorted
    pub forward: Vec<FileReference>,
    /// Outgoing links that do not resolve yet, in document order
    pub new_links: Vec<FileReference>,
    /// Inbound links that are not mutual, sorted
    pub backward: Vec<FileReference>,
    /// Two-hop groups reached through unresolved links
    pub unresolved_two_hop: Vec<TwoHopGroup>,
    /// Two-hop groups reached through existing documents
    pub resolved_two_hop: Vec<TwoHopGroup>,
    /// Tag groups in the order the active document declares its tags
    pub tags: Vec<TagGroup>,
}

impl LinkBundle {
    /// Unresolved groups followed by resolved groups
    pub fn two_hop(&self) -> impl Iterator<Item = &TwoHopGroup> {
        self.unresolved_two_hop
            .iter()
            .chain(self.resolved_two_hop.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
            && self.new_links.is_empty()
            && self.backward.is_empty()
            && self.unresolved_two_hop.is_empty()
            && self.resolved_two_hop.is_empty()
            && self.tags.is_empty()
    }

    /// Number of distinct entities across every list and group
    pub fn entity_count(&self) -> usize {
        self.forward.len()
            + self.new_links.len()
            + self.backward.len()
            + self.two_hop().map(|g| g.members.len() + 1).sum::<usize>()
            + self.tags.iter().map(|g| g.members.len()).sum::<usize>()
    }
}

/// A reference waiting for its stat, with the document path to stat.
#[derive(Debug, Clone)]
struct Candidate {
    reference: FileReference,
    path: String,
}

impl SortKey for Candidate {
    fn sort_name(&self) -> &str {
        &self.reference.link_text
    }
}

/// Computes [`LinkBundle`]s against a [`VaultHost`].
///
/// The aggregator never fails: unresolvable links are classified as new
/// links and stat failures drop only the affected entity.
#[derive(Debug, Clone, Default)]
pub struct LinkAggregator {
    filter: PathFilter,
    sort_order: SortOrder,
    dedup: bool,
}

impl LinkAggregator {
    pub fn new(filter: PathFilter, sort_order: SortOrder, dedup: bool) -> Self {
        Self {
            filter,
            sort_order,
            dedup,
        }
    }

    pub fn from_settings(settings: &TwohopSettings) -> Self {
        Self::new(
            PathFilter::new(settings.exclude_paths.as_slice()),
            settings.sort_order,
            settings.enable_duplicate_removal,
        )
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Aggregate every link class for `active_path`.
    ///
    /// A document without cached metadata still gets backward links.
    #[tracing::instrument(skip(self, host), fields(sort = %self.sort_order, dedup = self.dedup))]
    pub async fn aggregate<H>(&self, host: &H, active_path: &str) -> LinkBundle
    where
        H: VaultHost + ?Sized,
    {
        let metadata = host.cached_metadata(active_path).unwrap_or_default();

        let (forward, new_links) = self.forward_links(host, active_path, &metadata);
        let forward_keys: HashSet<String> = forward
            .iter()
            .map(|c| canonical_reference(active_path, &c.path).key())
            .collect();

        let backward = self.backward_links(host, active_path, &forward_keys);

        let graph = host.link_graph();
        let mut dedup = DedupState::new(self.dedup, forward_keys);
        let unresolved_groups = collect_groups(
            active_path,
            &graph.unresolved,
            false,
            &self.filter,
            &mut dedup,
        );
        let resolved_groups =
            collect_groups(active_path, &graph.resolved, true, &self.filter, &mut dedup);

        let tag_groups = self.tag_candidates(host, active_path, &metadata);

        let forward = self.annotate_and_sort(host, forward).await;
        let backward = self.annotate_and_sort(host, backward).await;
        let unresolved_two_hop = self.finish_groups(host, unresolved_groups).await;
        let resolved_two_hop = self.finish_groups(host, resolved_groups).await;
        let tags = self.finish_tags(host, tag_groups).await;

        log::debug!(
            "Aggregated {}: {} forward, {} new, {} backward, {} two-hop groups, {} tag groups",
            active_path,
            forward.len(),
            new_links.len(),
            backward.len(),
            unresolved_two_hop.len() + resolved_two_hop.len(),
            tags.len()
        );

        LinkBundle {
            forward,
            new_links,
            backward,
            unresolved_two_hop,
            resolved_two_hop,
            tags,
        }
    }

    /// Split the active document's links into resolved candidates and new links.
    fn forward_links<H>(
        &self,
        host: &H,
        active_path: &str,
        metadata: &CachedMetadata,
    ) -> (Vec<Candidate>, Vec<FileReference>)
    where
        H: VaultHost + ?Sized,
    {
        let mut seen_keys = HashSet::new();
        let mut seen_paths = HashSet::new();
        let mut resolved = Vec::new();
        let mut new_links = Vec::new();

        for link in metadata.link_texts() {
            let key = remove_block_reference(link);
            if !seen_keys.insert(key.to_string()) {
                continue;
            }

            match host.resolve_link(key, active_path) {
                Some(path) if self.filter.is_excluded(&path) => {}
                Some(path) => {
                    // Different spellings of one document collapse to the first
                    if seen_paths.insert(path.clone()) {
                        resolved.push(Candidate {
                            reference: FileReference::new(active_path, link),
                            path,
                        });
                    }
                }
                None => new_links.push(FileReference::new(active_path, link)),
            }
        }

        (resolved, new_links)
    }

    fn backward_links<H>(
        &self,
        host: &H,
        active_path: &str,
        forward_keys: &HashSet<String>,
    ) -> Vec<Candidate>
    where
        H: VaultHost + ?Sized,
    {
        host.link_graph()
            .resolved
            .iter()
            .filter(|(src, dests)| {
                src.as_str() != active_path
                    && dests.contains_key(active_path)
                    && !self.filter.is_excluded(src)
            })
            .map(|(src, _)| Candidate {
                reference: canonical_reference(active_path, src),
                path: src.clone(),
            })
            .filter(|c| !forward_keys.contains(&c.reference.key()))
            .collect()
    }

    /// Candidate members per active tag, in the active document's tag order.
    fn tag_candidates<H>(
        &self,
        host: &H,
        active_path: &str,
        metadata: &CachedMetadata,
    ) -> Vec<(String, Vec<Candidate>)>
    where
        H: VaultHost + ?Sized,
    {
        let active_tags = metadata.all_tags();
        if active_tags.is_empty() {
            return Vec::new();
        }

        let mut groups: Vec<(String, Vec<Candidate>)> = active_tags
            .iter()
            .map(|tag| (tag.clone(), Vec::new()))
            .collect();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for path in host.markdown_files() {
            if path == active_path || self.filter.is_excluded(&path) {
                continue;
            }
            let Some(other) = host.cached_metadata(&path) else {
                continue;
            };
            for tag in other.all_tags() {
                let Some((_, members)) = groups.iter_mut().find(|(t, _)| *t == tag) else {
                    continue;
                };
                if seen.insert((tag, path.clone())) {
                    members.push(Candidate {
                        reference: canonical_reference(active_path, &path),
                        path: path.clone(),
                    });
                }
            }
        }

        groups
    }

    async fn annotate_and_sort<H>(&self, host: &H, candidates: Vec<Candidate>) -> Vec<FileReference>
    where
        H: VaultHost + ?Sized,
    {
        let mut annotated = annotate(host, candidates).await;
        sort_annotated(&mut annotated, self.sort_order);
        annotated.into_iter().map(|a| a.item.reference).collect()
    }

    async fn finish_groups<H>(&self, host: &H, groups: Vec<GroupCandidate>) -> Vec<TwoHopGroup>
    where
        H: VaultHost + ?Sized,
    {
        let built = join_all(groups.into_iter().map(|group| async move {
            let members: Vec<Candidate> = group
                .members
                .into_iter()
                .map(|(reference, path)| Candidate { reference, path })
                .collect();
            let members = self.annotate_and_sort(host, members).await;
            if members.is_empty() {
                return None;
            }

            // Unresolved intermediates have nothing to stat
            let stat = match &group.path {
                Some(path) => match host.stat(path).await {
                    Ok(stat) => Some(stat),
                    Err(e) => {
                        log::debug!("Dropping two-hop group {}: {}", path, e);
                        return None;
                    }
                },
                None => None,
            };
            Some(Annotated::new(TwoHopGroup::new(group.link, members), stat))
        }))
        .await;

        let mut groups: Vec<Annotated<TwoHopGroup>> = built.into_iter().flatten().collect();
        sort_annotated(&mut groups, self.sort_order);
        groups.into_iter().map(|a| a.item).collect()
    }

    async fn finish_tags<H>(&self, host: &H, groups: Vec<(String, Vec<Candidate>)>) -> Vec<TagGroup>
    where
        H: VaultHost + ?Sized,
    {
        let built = join_all(groups.into_iter().map(|(tag, members)| async move {
            let members = self.annotate_and_sort(host, members).await;
            (!members.is_empty()).then(|| TagGroup::new(tag, members))
        }))
        .await;
        built.into_iter().flatten().collect()
    }
}

/// Reference to document `path` as seen from the active document.
///
/// Backward, two-hop and tag entities all use this form so their identity
/// keys are comparable with forward links.
pub fn canonical_reference(active_path: &str, path: &str) -> FileReference {
    FileReference::new(active_path, path_to_link_text(path))
}

/// Stat every candidate concurrently, dropping the ones that fail.
async fn annotate<H>(host: &H, candidates: Vec<Candidate>) -> Vec<Annotated<Candidate>>
where
    H: VaultHost + ?Sized,
{
    let stats = join_all(candidates.iter().map(|c| host.stat(&c.path))).await;
    candidates
        .into_iter()
        .zip(stats)
        .filter_map(|(candidate, stat)| match stat {
            Ok(stat) => Some(Annotated::new(candidate, Some(stat))),
            Err(e) => {
                log::debug!("Dropping {}: {}", candidate.path, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use twohop_core::{DocumentStat, LinkCache, MemoryVault, TagCache};

    fn note(links: &[&str], tags: &[&str]) -> CachedMetadata {
        CachedMetadata {
            links: links.iter().map(|l| LinkCache::new(*l)).collect(),
            tags: tags.iter().map(|t| TagCache::new(*t)).collect(),
            ..Default::default()
        }
    }

    fn stat(mtime: i64) -> DocumentStat {
        DocumentStat {
            size: 10,
            mtime,
            ctime: mtime,
        }
    }

    fn texts(refs: &[FileReference]) -> Vec<&str> {
        refs.iter().map(|r| r.link_text.as_str()).collect()
    }

    fn group_summary(groups: &[TwoHopGroup]) -> Vec<(String, Vec<String>)> {
        groups
            .iter()
            .map(|g| {
                (
                    g.link.link_text.clone(),
                    g.members.iter().map(|m| m.link_text.clone()).collect(),
                )
            })
            .collect()
    }

    fn two_hop_vault() -> MemoryVault {
        MemoryVault::new()
            .with_note("A.md", note(&["T1", "T2"], &[]), "")
            .with_note("T1.md", note(&[], &[]), "")
            .with_note("T2.md", note(&[], &[]), "")
            .with_note("S1.md", note(&["T1"], &[]), "")
            .with_note("S2.md", note(&["T2"], &[]), "")
            .with_note("S3.md", note(&["T1", "T2"], &[]), "")
    }

    fn aggregator(dedup: bool) -> LinkAggregator {
        LinkAggregator::new(PathFilter::default(), SortOrder::FilenameAsc, dedup)
    }

    #[tokio::test]
    async fn test_two_hop_without_dedup() {
        let bundle = aggregator(false).aggregate(&two_hop_vault(), "A.md").await;

        assert_eq!(texts(&bundle.forward), vec!["T1", "T2"]);
        assert_eq!(
            group_summary(&bundle.resolved_two_hop),
            vec![
                ("T1".to_string(), vec!["S1".to_string(), "S3".to_string()]),
                ("T2".to_string(), vec!["S2".to_string(), "S3".to_string()]),
            ]
        );
        assert!(bundle.unresolved_two_hop.is_empty());
    }

    #[tokio::test]
    async fn test_two_hop_with_dedup() {
        let bundle = aggregator(true).aggregate(&two_hop_vault(), "A.md").await;

        assert_eq!(
            group_summary(&bundle.resolved_two_hop),
            vec![
                ("T1".to_string(), vec!["S1".to_string(), "S3".to_string()]),
                ("T2".to_string(), vec!["S2".to_string()]),
            ]
        );
    }

    #[tokio::test]
    async fn test_forward_and_new_links() {
        let vault = MemoryVault::new()
            .with_note(
                "A.md",
                note(&["B#^blk", "B", "Ghost", "Ghost#^x", "Other"], &[]),
                "",
            )
            .with_note("B.md", note(&[], &[]), "")
            .with_note("Other.md", note(&[], &[]), "");

        let bundle = aggregator(true).aggregate(&vault, "A.md").await;
        assert_eq!(texts(&bundle.forward), vec!["B#^blk", "Other"]);
        assert_eq!(texts(&bundle.new_links), vec!["Ghost"]);
        assert!(bundle.forward.iter().all(|r| r.source_path == "A.md"));
    }

    #[tokio::test]
    async fn test_mutual_links_only_in_forward() {
        let vault = MemoryVault::new()
            .with_note("X.md", note(&["Y"], &[]), "")
            .with_note("Y.md", note(&["X"], &[]), "")
            .with_note("Z.md", note(&["Y"], &[]), "");

        let bundle = aggregator(true).aggregate(&vault, "Y.md").await;
        assert_eq!(texts(&bundle.forward), vec!["X"]);
        assert_eq!(texts(&bundle.backward), vec!["Z"]);
    }

    #[tokio::test]
    async fn test_exclusion_applies_everywhere() {
        let vault = MemoryVault::new()
            .with_note("A.md", note(&["T", "private/Secret"], &["#x"]), "")
            .with_note("T.md", note(&[], &[]), "")
            .with_note("private/Secret.md", note(&["A"], &["#x"]), "")
            .with_note("private/Other.md", note(&["T", "A"], &["#x"]), "")
            .with_note("S.md", note(&["T"], &["#x"]), "");
        let agg = LinkAggregator::new(PathFilter::new(&["private/"]), SortOrder::FilenameAsc, true);

        let bundle = agg.aggregate(&vault, "A.md").await;
        assert_eq!(texts(&bundle.forward), vec!["T"]);
        assert!(bundle.new_links.is_empty());
        assert!(bundle.backward.is_empty());
        assert_eq!(
            group_summary(&bundle.resolved_two_hop),
            vec![("T".to_string(), vec!["S".to_string()])]
        );
        assert_eq!(bundle.tags.len(), 1);
        assert_eq!(texts(&bundle.tags[0].members), vec!["S"]);
    }

    #[tokio::test]
    async fn test_tag_groups() {
        let vault = MemoryVault::new()
            .with_note("A.md", note(&[], &["#x", "#y"]), "")
            .with_note("B.md", note(&[], &["#x"]), "")
            .with_note("C.md", note(&[], &["#x", "#y"]), "")
            .with_note("D.md", note(&[], &["#z"]), "");

        let bundle = aggregator(true).aggregate(&vault, "A.md").await;
        assert_eq!(bundle.tags.len(), 2);
        assert_eq!(bundle.tags[0].tag, "#x");
        assert_eq!(texts(&bundle.tags[0].members), vec!["B", "C"]);
        assert_eq!(bundle.tags[1].tag, "#y");
        assert_eq!(texts(&bundle.tags[1].members), vec!["C"]);
    }

    #[tokio::test]
    async fn test_unresolved_two_hop_groups_come_first() {
        let vault = MemoryVault::new()
            .with_note("A.md", note(&["Idea", "T"], &[]), "")
            .with_note("T.md", note(&[], &[]), "")
            .with_note("B.md", note(&["Idea", "T"], &[]), "")
            .with_note("C.md", note(&["T"], &[]), "");

        let bundle = aggregator(true).aggregate(&vault, "A.md").await;
        assert_eq!(
            group_summary(&bundle.unresolved_two_hop),
            vec![("Idea".to_string(), vec!["B".to_string()])]
        );
        assert_eq!(
            group_summary(&bundle.resolved_two_hop),
            vec![("T".to_string(), vec!["C".to_string()])]
        );
        let order: Vec<&str> = bundle.two_hop().map(|g| g.link.link_text.as_str()).collect();
        assert_eq!(order, vec!["Idea", "T"]);
    }

    #[tokio::test]
    async fn test_modified_desc_ordering() {
        let vault = MemoryVault::new()
            .with_note("A.md", note(&["P", "Q", "R"], &[]), "")
            .with_note("P.md", note(&[], &[]), "")
            .with_note("Q.md", note(&[], &[]), "")
            .with_note("R.md", note(&[], &[]), "")
            .with_stat("P.md", stat(200))
            .with_stat("Q.md", stat(300))
            .with_stat("R.md", stat(100));
        let agg = LinkAggregator::new(PathFilter::default(), SortOrder::ModifiedDesc, true);

        let bundle = agg.aggregate(&vault, "A.md").await;
        assert_eq!(texts(&bundle.forward), vec!["Q", "P", "R"]);
    }

    #[tokio::test]
    async fn test_stat_failure_drops_only_that_entity() {
        let vault = two_hop_vault().with_failing_stat("S1.md").with_failing_stat("T2.md");

        let bundle = aggregator(false).aggregate(&vault, "A.md").await;
        assert_eq!(texts(&bundle.forward), vec!["T1"]);
        assert_eq!(
            group_summary(&bundle.resolved_two_hop),
            vec![("T1".to_string(), vec!["S3".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_aggregate_is_idempotent() {
        let vault = two_hop_vault();
        let agg = aggregator(true);
        let first = agg.aggregate(&vault, "A.md").await;
        let second = agg.aggregate(&vault, "A.md").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_document_without_metadata() {
        let vault = MemoryVault::new().with_note("B.md", note(&["missing"], &[]), "");
        let bundle = aggregator(true).aggregate(&vault, "missing.md").await;
        assert!(bundle.is_empty());
    }

    #[tokio::test]
    async fn test_dedup_keys_are_unique_across_groups() {
        let bundle = aggregator(true).aggregate(&two_hop_vault(), "A.md").await;
        let forward: HashSet<String> = bundle.forward.iter().map(FileReference::key).collect();
        let mut seen = HashSet::new();
        for member in bundle.two_hop().flat_map(|g| g.members.iter()) {
            assert!(!forward.contains(&member.key()));
            assert!(seen.insert(member.key()));
        }
    }
}
