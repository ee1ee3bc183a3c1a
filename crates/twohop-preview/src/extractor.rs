//! Preview extraction against a [`VaultHost`].

use crate::content::{EXCERPT_LINES, ImageRef, find_image, is_previewable, text_excerpt, video_thumbnail};
use twohop_core::{Error, FileReference, Result, TwohopSettings, VaultHost, remove_block_reference};

/// Documents larger than this are never read
pub const MAX_PREVIEW_SIZE: u64 = 1_000_000;

/// Derives a short preview for a referenced document.
///
/// The preview is a thumbnail URL, an image URL or a text excerpt. Every
/// failure degrades to an empty string.
#[derive(Debug, Clone)]
pub struct PreviewExtractor {
    show_image: bool,
    max_size: u64,
    max_lines: usize,
}

impl Default for PreviewExtractor {
    fn default() -> Self {
        Self {
            show_image: true,
            max_size: MAX_PREVIEW_SIZE,
            max_lines: EXCERPT_LINES,
        }
    }
}

impl PreviewExtractor {
    pub fn new(show_image: bool) -> Self {
        Self {
            show_image,
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &TwohopSettings) -> Self {
        Self::new(settings.show_image)
    }

    /// Override the size cap
    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    /// Override the number of excerpt lines
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Preview for `target`, or an empty string when there is nothing to show.
    #[tracing::instrument(skip(self, host), fields(link = %target.link_text))]
    pub async fn preview<H>(&self, host: &H, target: &FileReference) -> String
    where
        H: VaultHost + ?Sized,
    {
        match self.try_preview(host, target).await {
            Ok(preview) => preview,
            Err(e) => {
                log::debug!("No preview for {}: {}", target.link_text, e);
                String::new()
            }
        }
    }

    async fn try_preview<H>(&self, host: &H, target: &FileReference) -> Result<String>
    where
        H: VaultHost + ?Sized,
    {
        if !is_previewable(&target.link_text) {
            log::debug!("{} is not a plain text file", target.link_text);
            return Ok(String::new());
        }

        let link = remove_block_reference(&target.link_text);
        let path = host
            .resolve_link(link, &target.source_path)
            .ok_or_else(|| Error::file_not_found(link))?;

        let stat = host.stat(&path).await?;
        if stat.size > self.max_size {
            return Err(Error::file_too_large(path, stat.size, self.max_size));
        }

        let content = host.read_text(&path).await?;

        if let Some(thumbnail) = video_thumbnail(&content) {
            return Ok(thumbnail);
        }

        if self.show_image {
            match find_image(&content) {
                Some(ImageRef::Remote(url)) => return Ok(url.to_string()),
                Some(ImageRef::Local(image)) => match host.resolve_link(image, &path) {
                    Some(image_path) => return Ok(host.resource_url(&image_path)),
                    None => log::debug!("Image {} in {} does not resolve", image, path),
                },
                None => {}
            }
        }

        Ok(text_excerpt(&content, self.max_lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use twohop_core::{CachedMetadata, DocumentStat, LinkGraphSnapshot, MemoryVault};
    use twohop_parser::parse_metadata;

    fn vault(notes: &[(&str, &str)]) -> MemoryVault {
        notes.iter().fold(MemoryVault::new(), |vault, (path, content)| {
            vault.with_note(path, parse_metadata(content), *content)
        })
    }

    fn target(link: &str) -> FileReference {
        FileReference::new("Active.md", link)
    }

    /// Counts reads so tests can assert that none happened.
    struct CountingHost {
        inner: MemoryVault,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl VaultHost for CountingHost {
        fn link_graph(&self) -> &LinkGraphSnapshot {
            self.inner.link_graph()
        }

        fn cached_metadata(&self, path: &str) -> Option<CachedMetadata> {
            self.inner.cached_metadata(path)
        }

        fn markdown_files(&self) -> Vec<String> {
            self.inner.markdown_files()
        }

        fn resolve_link(&self, link_text: &str, source_path: &str) -> Option<String> {
            self.inner.resolve_link(link_text, source_path)
        }

        async fn stat(&self, path: &str) -> Result<DocumentStat> {
            self.inner.stat(path).await
        }

        async fn read_text(&self, path: &str) -> Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_text(path).await
        }

        fn resource_url(&self, path: &str) -> String {
            self.inner.resource_url(path)
        }
    }

    #[tokio::test]
    async fn test_local_image_preview() {
        let vault = vault(&[("Note.md", "![img](pic.png)")]).with_attachment("pic.png", 100);
        let preview = PreviewExtractor::new(true).preview(&vault, &target("Note")).await;
        assert_eq!(preview, "app://local/pic.png");
    }

    #[tokio::test]
    async fn test_image_resolves_relative_to_target() {
        let vault = vault(&[("notes/Note.md", "![[shot.jpg]]\nText")])
            .with_attachment("a/shot.jpg", 10)
            .with_attachment("notes/shot.jpg", 10);
        let preview = PreviewExtractor::new(true).preview(&vault, &target("Note")).await;
        assert_eq!(preview, "app://local/notes/shot.jpg");
    }

    #[tokio::test]
    async fn test_remote_image_verbatim() {
        let vault = vault(&[("Note.md", "Hello\n![x](https://example.com/cat.gif)")]);
        let preview = PreviewExtractor::new(true).preview(&vault, &target("Note")).await;
        assert_eq!(preview, "https://example.com/cat.gif");
    }

    #[tokio::test]
    async fn test_images_disabled_gives_text() {
        let vault =
            vault(&[("Note.md", "![img](pic.png)\nSome text")]).with_attachment("pic.png", 1);
        let preview = PreviewExtractor::new(false).preview(&vault, &target("Note")).await;
        assert_eq!(preview, "![img](pic.png)\nSome text");
    }

    #[tokio::test]
    async fn test_unresolved_image_falls_through_to_text() {
        let vault = vault(&[("Note.md", "![img](missing.png)\nBody")]);
        let preview = PreviewExtractor::new(true).preview(&vault, &target("Note")).await;
        assert_eq!(preview, "![img](missing.png)\nBody");
    }

    #[tokio::test]
    async fn test_video_thumbnail_wins() {
        let content = "![img](https://example.com/a.png)\n<iframe src=\"https://youtube.com/embed/abc123\"></iframe>";
        let vault = vault(&[("Note.md", content)]);
        let preview = PreviewExtractor::new(true).preview(&vault, &target("Note")).await;
        assert_eq!(preview, "https://img.youtube.com/vi/abc123/mqdefault.jpg");
    }

    #[tokio::test]
    async fn test_text_excerpt_with_block_reference() {
        let vault = vault(&[(
            "Note.md",
            "---\ntags: [a]\n---\n# Title\nFirst line\nhttps://example.com\nSecond line",
        )]);
        let preview = PreviewExtractor::default().preview(&vault, &target("Note#^abc")).await;
        assert_eq!(preview, "First line\nSecond line");
    }

    #[tokio::test]
    async fn test_oversized_document_is_skipped() {
        let vault = vault(&[("Big.md", "Huge")]).with_stat(
            "Big.md",
            DocumentStat {
                size: MAX_PREVIEW_SIZE + 1,
                ..Default::default()
            },
        );
        let preview = PreviewExtractor::default().preview(&vault, &target("Big")).await;
        assert_eq!(preview, "");
    }

    #[tokio::test]
    async fn test_pdf_is_never_read() {
        let host = CountingHost {
            inner: MemoryVault::new().with_attachment("paper.pdf", 10),
            reads: AtomicUsize::new(0),
        };
        let preview = PreviewExtractor::default().preview(&host, &target("paper.pdf")).await;
        assert_eq!(preview, "");
        assert_eq!(host.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let host = CountingHost {
            inner: MemoryVault::new(),
            reads: AtomicUsize::new(0),
        };
        let preview = PreviewExtractor::default().preview(&host, &target("Nowhere")).await;
        assert_eq!(preview, "");
        assert_eq!(host.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stat_failure_degrades() {
        let vault = vault(&[("Note.md", "Body")]).with_failing_stat("Note.md");
        let preview = PreviewExtractor::default().preview(&vault, &target("Note")).await;
        assert_eq!(preview, "");
    }
}
