//! # Twohop Vault
//!
//! A [`VaultHost`](twohop_core::VaultHost) over a plain directory of
//! markdown notes and attachments.
//!
//! Opening a vault walks the directory (dot-directories such as
//! `.obsidian` and `.git` are skipped), parses every note with
//! `twohop-parser`, indexes paths and front-matter aliases for link
//! resolution and builds the resolved and unresolved link graphs.
//!
//! ```no_run
//! use twohop_core::VaultHost;
//! use twohop_vault::FsVault;
//!
//! # async fn run() -> twohop_core::Result<()> {
//! let vault = FsVault::open("/path/to/vault").await?;
//! let target = vault.resolve_link("Project", "index.md");
//! println!("{:?}", target);
//! # Ok(())
//! # }
//! ```

pub mod scan;
pub mod vault;

pub use scan::{ScannedFile, is_markdown, scan_vault, vault_relative};
pub use vault::FsVault;
