//! Layered settings: an optional file, then `TWOHOP_*` environment variables.

use std::collections::HashMap;
use std::path::Path;
use twohop_core::{Error, Result, TwohopSettings};

/// Prefix of environment overrides, e.g. `TWOHOP_SORT_ORDER=modifiedDesc`
pub const ENV_PREFIX: &str = "TWOHOP";

/// Load settings from `file` (if given) and the process environment.
pub fn load_settings(file: Option<&Path>) -> Result<TwohopSettings> {
    load_settings_from(file, None)
}

/// Like [`load_settings`] but reads environment overrides from `env` when
/// given instead of the process environment.
///
/// `exclude_paths` may be given as a comma separated list.
pub fn load_settings_from(
    file: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<TwohopSettings> {
    let mut builder = config::Config::builder();
    if let Some(path) = file {
        builder = builder.add_source(config::File::from(path).required(true));
    }
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("exclude_paths")
            .source(env),
    );

    let mut settings: TwohopSettings = builder
        .build()
        .and_then(config::Config::try_deserialize)
        .map_err(|e| Error::config_error(format!("Failed to load settings: {}", e)))?;

    settings.normalize();
    settings.validate()?;
    log::debug!("Loaded settings: {:?}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use twohop_core::SortOrder;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = load_settings_from(None, env(&[])).unwrap();
        assert_eq!(settings, TwohopSettings::default());
    }

    #[test]
    fn test_file_then_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("twohop.yaml");
        fs::write(
            &path,
            "sort_order: createdAsc\nshow_image: false\nexclude_paths:\n  - ' templates/ '\n  - ''\n",
        )
        .unwrap();

        let settings = load_settings_from(Some(&path), env(&[])).unwrap();
        assert_eq!(settings.sort_order, SortOrder::CreatedAsc);
        assert!(!settings.show_image);
        assert_eq!(settings.exclude_paths, vec!["templates/"]);

        let settings = load_settings_from(
            Some(&path),
            env(&[
                ("TWOHOP_SORT_ORDER", "modifiedDesc"),
                ("TWOHOP_ENABLE_DUPLICATE_REMOVAL", "false"),
                ("TWOHOP_EXCLUDE_PATHS", "daily/,inbox.md"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.sort_order, SortOrder::ModifiedDesc);
        assert!(!settings.enable_duplicate_removal);
        assert!(!settings.show_image);
        assert_eq!(settings.exclude_paths, vec!["daily/", "inbox.md"]);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(load_settings_from(None, env(&[("TWOHOP_SORT_ORDER", "newest")])).is_err());
        assert!(load_settings_from(None, env(&[("TWOHOP_EXCLUDE_PATHS", "/")])).is_err());

        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.yaml");
        assert!(load_settings_from(Some(&missing), env(&[])).is_err());
    }
}
