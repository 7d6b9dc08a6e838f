//! Pre-parsed replacement markup.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Markup parsed once in a `<body>` context, ready to be grafted into a
/// document any number of times.
///
/// `canonical` is the serializer's rendering of the parsed nodes. Comparing
/// an element's current `inner_html` against it tells whether a write would
/// change anything, regardless of how the source markup was spelled
/// (quote style, entity forms, implied end tags).
#[derive(Debug)]
pub struct Fragment {
    html: Html,
    canonical: String,
}

impl Fragment {
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_fragment(source);
        let canonical = html.root_element().inner_html();
        Self {
            html,
            canonical,
        }
    }

    /// Markup as the document will serialize it after a write.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Top-level nodes of the fragment.
    pub(super) fn nodes(&self) -> impl Iterator<Item = NodeRef<'_, Node>> {
        self.html.root_element().children()
    }
}
