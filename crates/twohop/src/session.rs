//! Event-driven session around one vault.
//!
//! The session owns everything that outlives a single aggregation pass: the
//! settings, the enabled flag, the last seen links and tags of the active
//! document, and the generation used to discard stale previews.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;
use twohop_core::{CachedMetadata, FileReference, TwohopSettings, VaultHost};
use twohop_graph::{LinkAggregator, LinkBundle};
use twohop_preview::PreviewExtractor;

/// Identifies the render a preview request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Shared generation counter.
///
/// Clones observe the same counter, so a presentation layer can hold one
/// and check tokens without borrowing the session.
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter(Arc<AtomicU64>);

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> GenerationToken {
        GenerationToken(self.0.load(Ordering::Acquire))
    }

    /// Invalidate every outstanding token and return the new one
    pub fn bump(&self) -> GenerationToken {
        GenerationToken(self.0.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.current() == token
    }
}

/// Last observed links and tags of the active document.
///
/// Sets are compared by value, so reordering links is not a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    last: Option<Snapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    path: String,
    links: BTreeSet<String>,
    tags: BTreeSet<String>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state of `path`; returns `true` if it differs from
    /// the previous observation.
    pub fn observe(&mut self, path: &str, metadata: Option<&CachedMetadata>) -> bool {
        let snapshot = Snapshot {
            path: path.to_string(),
            links: metadata
                .map(|m| m.links.iter().map(|l| l.link.clone()).collect())
                .unwrap_or_default(),
            tags: metadata
                .map(|m| m.all_tags().into_iter().collect())
                .unwrap_or_default(),
        };

        if self.last.as_ref() == Some(&snapshot) {
            return false;
        }
        self.last = Some(snapshot);
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// The links computed for one render of the active document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLinks {
    pub path: String,
    pub generation: GenerationToken,
    pub links: LinkBundle,
}

/// Where a clicked entity leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    /// An existing document; `link_text` keeps any block reference for navigation
    Existing { path: String, link_text: String },
    /// The link does not resolve; opening it creates a new note
    Create { link_text: String },
}

/// Two-hop links for whatever document is active in a vault.
pub struct TwohopSession<H> {
    host: H,
    settings: TwohopSettings,
    aggregator: LinkAggregator,
    previews: PreviewExtractor,
    enabled: bool,
    active: Option<String>,
    tracker: ChangeTracker,
    generation: GenerationCounter,
}

impl<H: VaultHost> TwohopSession<H> {
    /// Create an enabled session
    pub fn new(host: H, settings: TwohopSettings) -> Self {
        Self {
            aggregator: LinkAggregator::from_settings(&settings),
            previews: PreviewExtractor::from_settings(&settings),
            host,
            settings,
            enabled: true,
            active: None,
            tracker: ChangeTracker::new(),
            generation: GenerationCounter::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, e.g. to refresh a changed file before calling
    /// [`TwohopSession::on_metadata_resolved`]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &TwohopSettings {
        &self.settings
    }

    /// Replace the settings. The next render uses them.
    pub fn update_settings(&mut self, settings: TwohopSettings) {
        self.aggregator = LinkAggregator::from_settings(&settings);
        self.previews = PreviewExtractor::from_settings(&settings);
        self.settings = settings;
        self.tracker.reset();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn active_path(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// A handle for checking tokens outside the session
    pub fn generation(&self) -> GenerationCounter {
        self.generation.clone()
    }

    /// A document was opened.
    #[instrument(skip(self))]
    pub async fn on_file_open(&mut self, path: &str) -> Option<RenderedLinks> {
        self.active = Some(path.to_string());
        if !self.enabled {
            return None;
        }
        Some(self.render().await)
    }

    /// Metadata of `changed_path` was re-resolved by the host.
    ///
    /// Only re-renders when the active document's links or tags changed.
    #[instrument(skip(self))]
    pub async fn on_metadata_resolved(&mut self, changed_path: &str) -> Option<RenderedLinks> {
        if !self.enabled || self.active.as_deref() != Some(changed_path) {
            return None;
        }
        let metadata = self.host.cached_metadata(changed_path);
        if !self.tracker.observe(changed_path, metadata.as_ref()) {
            log::debug!("Links and tags of {} unchanged", changed_path);
            return None;
        }
        Some(self.aggregate_active(changed_path.to_string()).await)
    }

    pub fn can_enable(&self) -> bool {
        !self.enabled
    }

    pub fn can_disable(&self) -> bool {
        self.enabled
    }

    /// Turn the session on and render the active document, if any.
    pub async fn enable(&mut self) -> Option<RenderedLinks> {
        self.enabled = true;
        log::info!("Two-hop links enabled");
        if self.active.is_none() {
            return None;
        }
        Some(self.render().await)
    }

    /// Turn the session off. Outstanding previews become stale.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.tracker.reset();
        self.generation.bump();
        log::info!("Two-hop links disabled");
    }

    /// Preview `target` for the render identified by `token`.
    ///
    /// Returns `None` when the token was stale before or after the read.
    pub async fn preview(&self, token: GenerationToken, target: &FileReference) -> Option<String> {
        if !self.generation.is_current(token) {
            return None;
        }
        let preview = self.previews.preview(&self.host, target).await;
        if !self.generation.is_current(token) {
            log::debug!(
                "Discarding stale preview of {} (generation {})",
                target.link_text,
                token.value()
            );
            return None;
        }
        Some(preview)
    }

    /// Resolve a clicked entity.
    pub fn open_target(&self, target: &FileReference) -> OpenTarget {
        match self.host.resolve_link(target.link_path(), &target.source_path) {
            Some(path) => OpenTarget::Existing {
                path,
                link_text: target.link_text.clone(),
            },
            None => OpenTarget::Create {
                link_text: target.link_path().to_string(),
            },
        }
    }

    async fn render(&mut self) -> RenderedLinks {
        let path = self.active.clone().unwrap_or_default();
        let metadata = self.host.cached_metadata(&path);
        self.tracker.observe(&path, metadata.as_ref());
        self.aggregate_active(path).await
    }

    async fn aggregate_active(&mut self, path: String) -> RenderedLinks {
        let generation = self.generation.bump();
        let links = self.aggregator.aggregate(&self.host, &path).await;
        RenderedLinks {
            path,
            generation,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use twohop_core::{LinkCache, MemoryVault, TagCache};

    fn note(links: &[&str], tags: &[&str]) -> CachedMetadata {
        CachedMetadata {
            links: links.iter().map(|l| LinkCache::new(*l)).collect(),
            tags: tags.iter().map(|t| TagCache::new(*t)).collect(),
            ..Default::default()
        }
    }

    fn session() -> TwohopSession<MemoryVault> {
        let vault = MemoryVault::new()
            .with_note("A.md", note(&["T"], &["#x"]), "[[T]] #x")
            .with_note("T.md", note(&[], &[]), "Target body")
            .with_note("S.md", note(&["T"], &[]), "[[T]]");
        TwohopSession::new(vault, TwohopSettings::default())
    }

    #[test]
    fn test_generation_counter() {
        let counter = GenerationCounter::new();
        let first = counter.current();
        let shared = counter.clone();
        let second = shared.bump();
        assert_ne!(first, second);
        assert_eq!(second.value(), first.value() + 1);
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[test]
    fn test_change_tracker_compares_sets() {
        let mut tracker = ChangeTracker::new();
        assert!(tracker.observe("a.md", Some(&note(&["x", "y"], &["#t"]))));
        assert!(!tracker.observe("a.md", Some(&note(&["y", "x", "x"], &["#t"]))));
        assert!(tracker.observe("a.md", Some(&note(&["x"], &["#t"]))));
        assert!(tracker.observe("a.md", Some(&note(&["x"], &["#u"]))));
        assert!(tracker.observe("b.md", Some(&note(&["x"], &["#u"]))));

        // Joined strings would collide here
        assert!(tracker.observe("c.md", Some(&note(&["a,b"], &[]))));
        assert!(tracker.observe("c.md", Some(&note(&["a", "b"], &[]))));
    }

    #[tokio::test]
    async fn test_file_open_renders() {
        let mut session = session();
        let rendered = session.on_file_open("A.md").await.unwrap();
        assert_eq!(rendered.path, "A.md");
        assert_eq!(rendered.links.forward.len(), 1);
        assert_eq!(rendered.links.resolved_two_hop[0].members[0].link_text, "S");
        assert_eq!(session.active_path(), Some("A.md"));
    }

    #[tokio::test]
    async fn test_metadata_resolved_only_on_change() {
        let mut session = session();
        session.on_file_open("A.md").await.unwrap();

        assert!(session.on_metadata_resolved("A.md").await.is_none());
        assert!(session.on_metadata_resolved("S.md").await.is_none());

        session
            .host_mut()
            .insert_note("A.md", Some(note(&["T", "S"], &["#x"])), String::new());
        let rendered = session.on_metadata_resolved("A.md").await.unwrap();
        assert_eq!(rendered.links.forward.len(), 2);
    }

    #[tokio::test]
    async fn test_enable_disable() {
        let mut session = session();
        assert!(session.can_disable());
        assert!(!session.can_enable());

        session.disable();
        assert!(session.can_enable());
        assert!(session.on_file_open("A.md").await.is_none());
        assert!(session.on_metadata_resolved("A.md").await.is_none());

        let rendered = session.enable().await.unwrap();
        assert_eq!(rendered.path, "A.md");
    }

    #[tokio::test]
    async fn test_stale_preview_is_discarded() {
        let mut session = session();
        let first = session.on_file_open("A.md").await.unwrap();
        let target = first.links.forward[0].clone();

        assert_eq!(
            session.preview(first.generation, &target).await.as_deref(),
            Some("Target body")
        );

        let second = session.on_file_open("S.md").await.unwrap();
        assert!(session.preview(first.generation, &target).await.is_none());
        assert!(session.preview(second.generation, &target).await.is_some());

        session.disable();
        assert!(session.preview(second.generation, &target).await.is_none());
    }

    #[tokio::test]
    async fn test_open_target() {
        let session = session();
        assert_eq!(
            session.open_target(&FileReference::new("A.md", "T#^blk")),
            OpenTarget::Existing {
                path: "T.md".to_string(),
                link_text: "T#^blk".to_string(),
            }
        );
        assert_eq!(
            session.open_target(&FileReference::new("A.md", "Ghost#^blk")),
            OpenTarget::Create {
                link_text: "Ghost".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_update_settings_applies_to_next_render() {
        let mut session = session();
        let mut settings = TwohopSettings::default();
        settings.exclude_paths = vec!["S.md".to_string()];
        session.update_settings(settings);

        let rendered = session.on_file_open("A.md").await.unwrap();
        assert!(rendered.links.resolved_two_hop.is_empty());
    }
}
