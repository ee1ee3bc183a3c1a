//! Ordering of result lists.
//!
//! Every list is sorted by one [`SortOrder`]. Names compare with a
//! locale-style collation (accents and case are secondary differences);
//! times compare numerically. All sorts are stable.

use std::cmp::Ordering;
use twohop_core::{DocumentStat, FileReference, SortOrder, TwoHopGroup};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Something that can be ordered by name.
pub trait SortKey {
    fn sort_name(&self) -> &str;
}

impl SortKey for FileReference {
    fn sort_name(&self) -> &str {
        &self.link_text
    }
}

/// Groups sort by their intermediate document, never by members.
impl SortKey for TwoHopGroup {
    fn sort_name(&self) -> &str {
        &self.link.link_text
    }
}

/// An entity paired with its file-system stat.
///
/// `stat` is `None` only for entities with no backing document, which sort
/// as if both timestamps were zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated<T> {
    pub item: T,
    pub stat: Option<DocumentStat>,
}

impl<T> Annotated<T> {
    pub fn new(item: T, stat: Option<DocumentStat>) -> Self {
        Self { item, stat }
    }

    fn mtime(&self) -> i64 {
        self.stat.map(|s| s.mtime).unwrap_or(0)
    }

    fn ctime(&self) -> i64 {
        self.stat.map(|s| s.ctime).unwrap_or(0)
    }
}

/// Compare two annotated entities under `order`.
pub fn compare<T: SortKey>(a: &Annotated<T>, b: &Annotated<T>, order: SortOrder) -> Ordering {
    match order {
        SortOrder::FilenameAsc => locale_compare(a.item.sort_name(), b.item.sort_name()),
        SortOrder::FilenameDesc => locale_compare(b.item.sort_name(), a.item.sort_name()),
        SortOrder::ModifiedDesc => b.mtime().cmp(&a.mtime()),
        SortOrder::ModifiedAsc => a.mtime().cmp(&b.mtime()),
        SortOrder::CreatedDesc => b.ctime().cmp(&a.ctime()),
        SortOrder::CreatedAsc => a.ctime().cmp(&b.ctime()),
    }
}

/// Stable in-place sort.
pub fn sort_annotated<T: SortKey>(items: &mut [Annotated<T>], order: SortOrder) {
    items.sort_by(|a, b| compare(a, b, order));
}

/// Collation approximating a root locale: base letters first, then
/// accents, then case (lowercase before uppercase), then code points.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| accented(a).cmp(&accented(b)))
        .then_with(|| case_pattern(a).cmp(&case_pattern(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn accented(s: &str) -> String {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn case_pattern(s: &str) -> Vec<bool> {
    s.chars().map(char::is_uppercase).collect()
}
