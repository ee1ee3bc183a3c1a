//! Link-text helpers shared across crates.

/// Strip a trailing `#^block` reference from link text.
///
/// ```
/// use twohop_core::utils::remove_block_reference;
///
/// assert_eq!(remove_block_reference("Note#^abc"), "Note");
/// assert_eq!(remove_block_reference("Note#Heading"), "Note#Heading");
/// assert_eq!(remove_block_reference("Note"), "Note");
/// ```
pub fn remove_block_reference(link_text: &str) -> &str {
    match link_text.find("#^") {
        Some(idx) => &link_text[..idx],
        None => link_text,
    }
}

/// Canonical link text for a vault path: the path without its `.md` extension.
///
/// ```
/// use twohop_core::utils::path_to_link_text;
///
/// assert_eq!(path_to_link_text("folder/Note.md"), "folder/Note");
/// assert_eq!(path_to_link_text("image.png"), "image.png");
/// ```
pub fn path_to_link_text(path: &str) -> &str {
    path.strip_suffix(".md").unwrap_or(path)
}

/// Strip any `#heading` or `#^block` subpath, leaving the link path.
pub fn strip_subpath(link_text: &str) -> &str {
    match link_text.find('#') {
        Some(idx) => &link_text[..idx],
        None => link_text,
    }
}

/// Split a vault path into its non-empty segments, ignoring `.` segments.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}
