//! Rendering of aggregation results for the command line.

use crate::session::{RenderedLinks, TwohopSession};
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use twohop_core::{FileReference, VaultHost};
use twohop_graph::LinkBundle;

/// Everything printed for one note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub note: String,
    #[serde(flatten)]
    pub links: LinkBundle,
    /// Non-empty previews keyed by reference identity
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub previews: BTreeMap<String, String>,
}

impl Report {
    pub fn new(rendered: RenderedLinks, previews: BTreeMap<String, String>) -> Self {
        Self {
            note: rendered.path,
            links: rendered.links,
            previews,
        }
    }

    /// Indented plain-text listing. Previews show their first line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Two-hop links for {}", self.note);

        if self.links.is_empty() {
            let _ = writeln!(out, "\nNo related notes.");
            return out;
        }

        self.section(&mut out, "Links", &self.links.forward);
        self.section(&mut out, "New links", &self.links.new_links);
        self.section(&mut out, "Back links", &self.links.backward);
        for group in self.links.two_hop() {
            let title = format!("Two-hop via {}", group.link.link_text);
            self.section(&mut out, &title, &group.members);
        }
        for group in &self.links.tags {
            self.section(&mut out, &group.tag, &group.members);
        }
        out
    }

    fn section(&self, out: &mut String, title: &str, references: &[FileReference]) {
        if references.is_empty() {
            return;
        }
        let _ = writeln!(out, "\n{} ({})", title, references.len());
        for reference in references {
            match self
                .previews
                .get(&reference.key())
                .and_then(|p| p.lines().next())
            {
                Some(preview) => {
                    let _ = writeln!(out, "  {}: {}", reference.link_text, preview);
                }
                None => {
                    let _ = writeln!(out, "  {}", reference.link_text);
                }
            }
        }
    }
}

/// Every reference that can be previewed, first occurrence per identity.
pub fn preview_targets(links: &LinkBundle) -> Vec<&FileReference> {
    let mut seen = HashSet::new();
    links
        .forward
        .iter()
        .chain(links.backward.iter())
        .chain(links.two_hop().flat_map(|g| std::iter::once(&g.link).chain(g.members.iter())))
        .chain(links.tags.iter().flat_map(|g| g.members.iter()))
        .filter(|r| seen.insert(r.key()))
        .collect()
}

/// Fetch previews for every entity of `rendered` concurrently.
///
/// Empty previews are omitted. If the session moved on in the meantime the
/// result is empty.
pub async fn collect_previews<H: VaultHost>(
    session: &TwohopSession<H>,
    rendered: &RenderedLinks,
) -> BTreeMap<String, String> {
    let targets = preview_targets(&rendered.links);
    let previews = join_all(
        targets
            .iter()
            .map(|target| session.preview(rendered.generation, target)),
    )
    .await;

    targets
        .into_iter()
        .zip(previews)
        .filter_map(|(target, preview)| {
            preview
                .filter(|p| !p.is_empty())
                .map(|p| (target.key(), p))
        })
        .collect()
}
