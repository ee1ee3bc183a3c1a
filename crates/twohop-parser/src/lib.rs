//! # Twohop Parser
//!
//! Extracts the per-document metadata the aggregation engine consumes:
//! outgoing links, embeds, inline tags and YAML front-matter.
//!
//! ## Architecture
//!
//! Parsing runs in two phases via [`MetadataEngine`]:
//!
//! ### Phase 1: pulldown-cmark pass
//! - Front-matter (YAML metadata block) and markdown links `[text](path)`
//! - Records code blocks, inline code and HTML as excluded ranges
//!
//! ### Phase 2: Regex pass (Obsidian extensions)
//! - Wikilinks `[[Note]]`, embeds `![[image.png]]`, tags `#tag`
//! - Skips excluded ranges so code samples never produce links
//!
//! ## Quick Start
//!
//! ```
//! use twohop_parser::parse_metadata;
//!
//! let content = "---\ntags: [project]\n---\n# Title\n\n[[Other Note|alias]] and #todo\n";
//! let metadata = parse_metadata(content);
//!
//! assert_eq!(metadata.links[0].link, "Other Note");
//! assert_eq!(metadata.all_tags(), vec!["#todo", "#project"]);
//! ```

mod engine;

pub use engine::MetadataEngine;
pub use twohop_core::CachedMetadata;

/// Extract links, embeds, tags and front-matter from markdown content.
pub fn parse_metadata(content: &str) -> CachedMetadata {
    MetadataEngine::new(content).extract()
}
