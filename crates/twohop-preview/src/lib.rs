//! # Twohop Preview
//!
//! Short previews for referenced documents: a video thumbnail, the first
//! image, or the first few meaningful lines of text.
//!
//! ```
//! use twohop_preview::{text_excerpt, EXCERPT_LINES};
//!
//! let excerpt = text_excerpt("---\ntags: [x]\n---\n# Title\nBody text", EXCERPT_LINES);
//! assert_eq!(excerpt, "Body text");
//! ```

pub mod content;
pub mod extractor;

pub use content::{
    EXCERPT_LINES, ImageRef, find_image, is_previewable, strip_frontmatter, text_excerpt,
    video_thumbnail,
};
pub use extractor::{MAX_PREVIEW_SIZE, PreviewExtractor};
