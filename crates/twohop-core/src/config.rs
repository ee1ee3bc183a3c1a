//! Settings consumed by the aggregation engine and the preview extractor.
//!
//! The host owns persistence; [`TwohopSettings::load`] and
//! [`TwohopSettings::save`] provide a YAML form for standalone use.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Ordering applied to every result list and to two-hop groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    #[default]
    FilenameAsc,
    FilenameDesc,
    ModifiedDesc,
    ModifiedAsc,
    CreatedDesc,
    CreatedAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        Self::FilenameAsc,
        Self::FilenameDesc,
        Self::ModifiedDesc,
        Self::ModifiedAsc,
        Self::CreatedDesc,
        Self::CreatedAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FilenameAsc => "filenameAsc",
            Self::FilenameDesc => "filenameDesc",
            Self::ModifiedDesc => "modifiedDesc",
            Self::ModifiedAsc => "modifiedAsc",
            Self::CreatedDesc => "createdDesc",
            Self::CreatedAsc => "createdAsc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::config_error(format!(
                    "Unknown sort order '{}'. Valid options: {}",
                    s,
                    Self::ALL.map(SortOrder::as_str).join(", ")
                ))
            })
    }
}

/// Two-hop links settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwohopSettings {
    /// Exact paths or `/`-terminated directories to hide from every list
    pub exclude_paths: Vec<String>,
    pub sort_order: SortOrder,
    /// Drop two-hop members already shown as forward links or in another group
    pub enable_duplicate_removal: bool,
    /// Prefer an image over a text excerpt in previews
    pub show_image: bool,

    // Presentation hints, persisted for the host UI
    pub put_on_top: bool,
    pub box_width: String,
    pub box_height: String,
    pub show_forward_connected_links: bool,
    pub show_backward_connected_links: bool,
    pub auto_load_two_hop_links: bool,
    pub initial_box_count: usize,
    pub initial_section_count: usize,
}

impl Default for TwohopSettings {
    fn default() -> Self {
        Self {
            exclude_paths: vec![],
            sort_order: SortOrder::default(),
            enable_duplicate_removal: true,
            show_image: true,
            put_on_top: false,
            box_width: String::new(),
            box_height: String::new(),
            show_forward_connected_links: true,
            show_backward_connected_links: true,
            auto_load_two_hop_links: true,
            initial_box_count: 10,
            initial_section_count: 3,
        }
    }
}

impl TwohopSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the exclusion list from a one-rule-per-line text block
    pub fn set_exclude_paths_from_text(&mut self, text: &str) {
        self.exclude_paths = text.lines().map(str::to_string).collect();
        self.normalize();
    }

    /// Trim exclusion rules and drop blank ones
    pub fn normalize(&mut self) {
        self.exclude_paths = self
            .exclude_paths
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if let Some(rule) = self.exclude_paths.iter().find(|p| p.trim() == "/") {
            return Err(Error::config_error(format!(
                "Exclude rule '{}' would hide every document",
                rule
            )));
        }
        Ok(())
    }

    /// Load settings from a YAML file, falling back to defaults if it is missing
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to load settings from {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut settings: Self = serde_yaml::from_str(&content)
            .map_err(|e| Error::config_error(format!("Invalid settings: {}", e)))?;
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings as YAML
    pub async fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::config_error(format!("Failed to serialize settings: {}", e)))?;

        tokio::fs::write(path, yaml).await.map_err(|e| {
            Error::config_error(format!(
                "Failed to save settings to {}: {}",
                path.display(),
                e
            ))
        })
    }
}
