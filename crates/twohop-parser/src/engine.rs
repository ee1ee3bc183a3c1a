//! Metadata extraction engine.
//!
//! Two passes over a document:
//! - pulldown-cmark pass: front-matter, markdown links, and the byte ranges
//!   (code blocks, inline code, HTML) where Obsidian syntax must be ignored
//! - regex pass: wikilinks, embeds and inline tags outside those ranges

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use twohop_core::{CachedMetadata, Frontmatter, LinkCache, TagCache};

/// Wikilink: [[target]] or [[target|display]]
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());

/// Tag: #tag or #parent/child, at line start or after whitespace
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|\s)#([\p{L}\p{N}_\-/]+)").unwrap());

#[inline]
fn has_wikilink(content: &str) -> bool {
    content.contains("[[")
}

#[inline]
fn has_tag(content: &str) -> bool {
    content.contains('#')
}

/// Byte ranges where markdown syntax should not be interpreted.
#[derive(Debug, Default, Clone)]
struct ExcludedRanges {
    ranges: Vec<Range<usize>>,
}

impl ExcludedRanges {
    #[inline]
    fn contains(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.start <= offset);
        idx > 0 && offset < self.ranges[idx - 1].end
    }

    fn add(&mut self, range: Range<usize>) {
        self.ranges.push(range);
    }

    /// Sort and merge overlapping ranges so `contains` can binary search.
    fn optimize(&mut self) {
        if self.ranges.is_empty() {
            return;
        }
        self.ranges.sort_by_key(|r| r.start);

        let mut merged = Vec::with_capacity(self.ranges.len());
        let mut current = self.ranges[0].clone();
        for range in self.ranges.iter().skip(1) {
            if range.start <= current.end {
                current.end = current.end.max(range.end);
            } else {
                merged.push(current);
                current = range.clone();
            }
        }
        merged.push(current);
        self.ranges = merged;
    }
}

/// Metadata extractor for a single document.
pub struct MetadataEngine<'a> {
    content: &'a str,
}

impl<'a> MetadataEngine<'a> {
    pub fn new(content: &'a str) -> Self {
        Self { content }
    }

    /// Extract links, embeds, tags and front-matter.
    pub fn extract(&self) -> CachedMetadata {
        let mut metadata = CachedMetadata::default();
        // (offset, link) so wikilinks and markdown links interleave in document order
        let mut links: Vec<(usize, String)> = Vec::new();

        let (excluded, body_start) = self.pulldown_pass(&mut metadata, &mut links);
        let body = &self.content[body_start..];

        self.regex_pass(body, body_start, &excluded, &mut metadata, &mut links);

        links.sort_by_key(|(offset, _)| *offset);
        metadata.links = links.into_iter().map(|(_, l)| LinkCache::new(l)).collect();
        metadata
    }

    fn pulldown_pass(
        &self,
        metadata: &mut CachedMetadata,
        links: &mut Vec<(usize, String)>,
    ) -> (ExcludedRanges, usize) {
        let mut excluded = ExcludedRanges::default();
        let mut body_start: usize = 0;

        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TABLES);

        let parser = Parser::new_ext(self.content, opts);

        let mut code_block_start: usize = 0;
        let mut in_metadata = false;
        let mut metadata_content = String::new();

        for (event, range) in parser.into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(_)) => {
                    code_block_start = range.start;
                }
                Event::End(TagEnd::CodeBlock) => {
                    excluded.add(code_block_start..range.end);
                }
                Event::Code(_) | Event::Html(_) | Event::InlineHtml(_) => {
                    excluded.add(range.clone());
                }

                Event::Start(Tag::MetadataBlock(_)) => {
                    in_metadata = true;
                    metadata_content.clear();
                }
                Event::End(TagEnd::MetadataBlock(_)) => {
                    in_metadata = false;
                    body_start = range.end;
                    excluded.add(range.clone());
                    metadata.frontmatter = parse_frontmatter(&metadata_content);
                }
                Event::Text(text) if in_metadata => {
                    metadata_content.push_str(&text);
                }

                Event::Start(Tag::Link { dest_url, .. }) => {
                    if let Some(target) = internal_link_target(&dest_url) {
                        links.push((range.start, target));
                    }
                }

                _ => {}
            }
        }

        excluded.optimize();
        (excluded, body_start)
    }

    fn regex_pass(
        &self,
        body: &str,
        body_offset: usize,
        excluded: &ExcludedRanges,
        metadata: &mut CachedMetadata,
        links: &mut Vec<(usize, String)>,
    ) {
        if has_wikilink(body) {
            for caps in WIKILINK.captures_iter(body) {
                let full_match = caps.get(0).unwrap();
                let local_start = full_match.start();
                let global_start = body_offset + local_start;

                if excluded.contains(global_start) {
                    continue;
                }

                let target = link_target(caps.get(1).unwrap().as_str());
                if target.is_empty() {
                    continue;
                }

                // Preceded by ! means an embed
                if local_start > 0 && body.as_bytes().get(local_start - 1) == Some(&b'!') {
                    metadata.embeds.push(LinkCache::new(target));
                } else {
                    links.push((global_start, target));
                }
            }
        }

        if has_tag(body) {
            for caps in TAG.captures_iter(body) {
                let name = caps.get(1).unwrap();
                let global_start = body_offset + name.start() - 1;

                if excluded.contains(global_start) {
                    continue;
                }

                let name = name.as_str().trim_end_matches('/');
                // Obsidian requires at least one non-numeric character
                if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
                    continue;
                }

                metadata.tags.push(TagCache::new(format!("#{}", name)));
            }
        }
    }
}

/// Split `target|display` and drop the display part.
fn link_target(raw: &str) -> String {
    let target = match raw.find('|') {
        Some(pipe_idx) => &raw[..pipe_idx],
        None => raw,
    };
    target.trim().trim_end_matches('\\').to_string()
}

/// Markdown link destinations that point inside the vault.
fn internal_link_target(url: &str) -> Option<String> {
    if url.is_empty()
        || url.starts_with('#')
        || url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("mailto:")
        || url.contains("://")
    {
        return None;
    }
    Some(url.replace("%20", " "))
}

fn parse_frontmatter(yaml: &str) -> Option<Frontmatter> {
    if yaml.trim().is_empty() {
        return None;
    }
    match serde_yaml::from_str::<Frontmatter>(yaml) {
        Ok(frontmatter) => Some(frontmatter),
        Err(e) => {
            log::debug!("Ignoring unreadable front-matter: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_ranges_merge() {
        let mut excluded = ExcludedRanges::default();
        excluded.add(10..20);
        excluded.add(0..5);
        excluded.add(15..30);
        excluded.optimize();

        assert!(excluded.contains(0));
        assert!(!excluded.contains(5));
        assert!(excluded.contains(25));
        assert!(!excluded.contains(30));
    }

    #[test]
    fn test_link_target_strips_display() {
        assert_eq!(link_target("Note|Shown"), "Note");
        assert_eq!(link_target(" Note#^abc "), "Note#^abc");
    }

    #[test]
    fn test_internal_link_target() {
        assert_eq!(
            internal_link_target("folder/My%20Note.md"),
            Some("folder/My Note.md".to_string())
        );
        assert_eq!(internal_link_target("https://example.com"), None);
        assert_eq!(internal_link_target("#section"), None);
        assert_eq!(internal_link_target("obsidian://open"), None);
    }
}
