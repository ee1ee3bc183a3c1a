//! # Twohop
//!
//! Two-hop links for a vault of markdown notes: an event-driven session for
//! embedding in an editor and the `twohop` command line tool.

pub mod report;
pub mod session;
pub mod settings;

pub use report::{Report, collect_previews, preview_targets};
pub use session::{
    ChangeTracker, GenerationCounter, GenerationToken, OpenTarget, RenderedLinks, TwohopSession,
};
pub use settings::{ENV_PREFIX, load_settings, load_settings_from};

pub use twohop_core::prelude::*;
pub use twohop_graph::{LinkAggregator, LinkBundle};
pub use twohop_preview::PreviewExtractor;
pub use twohop_vault::FsVault;
