//! # Twohop Core
//!
//! Core data models, error types, settings and the host interface for two-hop
//! link discovery. This crate defines the canonical types that all other
//! crates depend on.
//!
//! ## Core Modules
//!
//! - [`models`] - References, groups, cached metadata and the link graph snapshot
//! - [`error`] - Error types and Result alias
//! - [`config`] - Settings and sort order
//! - [`filter`] - Exclusion rules
//! - [`host`] - The [`VaultHost`] trait implemented by vault backends
//! - [`resolver`] - Link resolution and link graph construction
//! - [`memory`] - An in-memory [`VaultHost`]
//! - [`utils`] - Link-text helpers
//!
//! ## Usage Examples
//!
//! ```
//! use twohop_core::prelude::*;
//!
//! let reference = FileReference::new("index.md", "Project#^summary");
//! assert_eq!(reference.key(), "index.md::Project");
//!
//! let filter = PathFilter::new(&["templates/"]);
//! assert!(filter.is_excluded("templates/daily.md"));
//! assert!(!filter.is_excluded("templatesx/daily.md"));
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod host;
pub mod memory;
pub mod models;
pub mod resolver;
pub mod utils;

pub use config::{SortOrder, TwohopSettings};
pub use error::{Error, Result};
pub use filter::{PathFilter, is_excluded};
pub use host::VaultHost;
pub use memory::MemoryVault;
pub use models::*;
pub use resolver::{LinkResolver, build_link_graph};
pub use utils::{path_to_link_text, remove_block_reference};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{SortOrder, TwohopSettings};
    pub use crate::error::{Error, Result};
    pub use crate::filter::PathFilter;
    pub use crate::host::VaultHost;
    pub use crate::memory::MemoryVault;
    pub use crate::resolver::{LinkResolver, build_link_graph};
    pub use crate::models::{
        AdjacencyMap, CachedMetadata, DocumentStat, FileReference, Frontmatter, LinkCache,
        LinkGraphSnapshot, StringOrList, TagCache, TagGroup, TwoHopGroup,
    };
    pub use crate::utils::{path_to_link_text, remove_block_reference};
}
