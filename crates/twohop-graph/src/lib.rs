//! # Two-hop Link Aggregation
//!
//! Turns a vault-wide link graph into the link lists shown for the active
//! document.
//!
//! Provides:
//! - Forward links and new (unresolved) links
//! - Backward links, with mutual links kept only in the forward list
//! - Two-hop groups through existing and not-yet-created documents
//! - Tag co-occurrence groups
//! - Configurable, stable ordering of every list
//!
//! ## Quick Start
//!
//! ```
//! use twohop_core::{CachedMetadata, LinkCache, MemoryVault, TwohopSettings};
//! use twohop_graph::LinkAggregator;
//!
//! let links = |targets: &[&str]| CachedMetadata {
//!     links: targets.iter().map(|t| LinkCache::new(*t)).collect(),
//!     ..Default::default()
//! };
//! let vault = MemoryVault::new()
//!     .with_note("A.md", links(&["Topic"]), "")
//!     .with_note("Topic.md", links(&[]), "")
//!     .with_note("B.md", links(&["Topic"]), "");
//!
//! let aggregator = LinkAggregator::from_settings(&TwohopSettings::default());
//! let bundle = futures::executor::block_on(aggregator.aggregate(&vault, "A.md"));
//!
//! let group = &bundle.resolved_two_hop[0];
//! assert_eq!(group.link.link_text, "Topic");
//! assert_eq!(group.members[0].link_text, "B");
//! ```
//!
//! ## Pure Functions
//!
//! [`invert_two_hop`] works on a plain [`twohop_core::AdjacencyMap`] and needs
//! no host, which makes the core of the algorithm easy to test in isolation.

pub mod engine;
pub mod sort;
pub mod two_hop;

pub use engine::{LinkAggregator, LinkBundle, canonical_reference};
pub use sort::{Annotated, SortKey, compare, locale_compare, sort_annotated};
pub use two_hop::{DedupState, GroupCandidate, collect_groups, invert_two_hop};
