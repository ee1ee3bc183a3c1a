//! Pure scanning of document text for preview material.

use regex::Regex;
use std::sync::LazyLock;

static HAS_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.[a-z0-9_-]+$").unwrap());

static TEXT_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:md|markdown|txt|text)$").unwrap());

static IFRAME_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<iframe[^>]*src="([^"]+)"[^>]*>"#).unwrap());

static YOUTUBE_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?youtube\.com/embed/([^?&]+)(?:\?[^?]+)?$").unwrap()
});

static MARKDOWN_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[[^\]]*?\]\(((?:https?://[^)]+)|(?:[^)]+\.(?:png|bmp|jpg)))\)").unwrap()
});

static WIKI_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]]+\.(?:png|bmp|jpg))\]\]").unwrap());

static FRONTMATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---[ \t]*\r?\n(?:.*?\r?\n)?---[ \t]*(?:\r?\n|\z)").unwrap()
});

/// Default number of excerpt lines
pub const EXCERPT_LINES: usize = 6;

/// Whether the file behind `link_text` may be read for a preview.
///
/// Links without an extension are notes; anything else must be a plain
/// text format. PDFs and other binaries are never read.
pub fn is_previewable(link_text: &str) -> bool {
    !HAS_EXTENSION.is_match(link_text) || TEXT_EXTENSION.is_match(link_text)
}

/// Thumbnail URL for the first embedded video, if it is a known provider.
pub fn video_thumbnail(content: &str) -> Option<String> {
    let src = IFRAME_SRC.captures(content)?.get(1)?.as_str();
    let id = YOUTUBE_EMBED.captures(src)?.get(1)?.as_str();
    Some(format!("https://img.youtube.com/vi/{}/mqdefault.jpg", id))
}

/// An image reference found in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef<'a> {
    /// Absolute `http(s)` URL
    Remote(&'a str),
    /// Vault path relative to the referencing document
    Local(&'a str),
}

/// First image in markdown syntax, or failing that, in wiki-embed syntax.
pub fn find_image(content: &str) -> Option<ImageRef<'_>> {
    let image = MARKDOWN_IMAGE
        .captures(content)
        .or_else(|| WIKI_IMAGE.captures(content))?
        .get(1)?
        .as_str();

    if image.starts_with("http://") || image.starts_with("https://") {
        Some(ImageRef::Remote(image))
    } else {
        Some(ImageRef::Local(image))
    }
}

/// Remove a leading `---` delimited metadata block.
pub fn strip_frontmatter(content: &str) -> &str {
    match FRONTMATTER.find(content) {
        Some(m) => &content[m.end()..],
        None => content,
    }
}

/// First `max_lines` lines worth reading.
///
/// Blank lines, headings, tag-only lines and lines starting with a URL are
/// skipped.
pub fn text_excerpt(content: &str, max_lines: usize) -> String {
    strip_frontmatter(content)
        .lines()
        .filter(|line| {
            !line.trim().is_empty()
                && !line.starts_with('#')
                && !line.starts_with("http://")
                && !line.starts_with("https://")
        })
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}
