//! Exclusion rules for candidate paths.
//!
//! A rule ending in `/` excludes a directory and everything below it; any
//! other rule excludes exactly one path. Directory rules compare whole path
//! segments, so `foo/` never matches `foobar/x.md`.

use crate::utils::path_segments;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExcludeRule {
    Exact(String),
    Directory(Vec<String>),
}

impl ExcludeRule {
    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.ends_with('/') {
            let segments: Vec<String> = path_segments(trimmed)
                .into_iter()
                .map(str::to_string)
                .collect();
            // "/" alone would exclude the whole vault
            if segments.is_empty() {
                return None;
            }
            Some(Self::Directory(segments))
        } else {
            Some(Self::Exact(trimmed.to_string()))
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(exact) => path == exact,
            Self::Directory(prefix) => {
                let segments = path_segments(path);
                segments.len() > prefix.len()
                    && prefix.iter().zip(&segments).all(|(a, b)| a == b)
            }
        }
    }
}

/// Compiled exclusion list, built once per aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    rules: Vec<ExcludeRule>,
}

impl PathFilter {
    /// Compile an exclusion list. Blank rules are ignored.
    pub fn new<S: AsRef<str>>(exclude: &[S]) -> Self {
        Self {
            rules: exclude
                .iter()
                .filter_map(|rule| ExcludeRule::parse(rule.as_ref()))
                .collect(),
        }
    }

    /// True iff some rule matches `path`
    pub fn is_excluded(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(path))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// One-shot form of [`PathFilter::is_excluded`].
pub fn is_excluded<S: AsRef<str>>(path: &str, exclude: &[S]) -> bool {
    PathFilter::new(exclude).is_excluded(path)
}
