//! HTML microdata item types.

use dom_query::{Document, Selection};

use crate::dom;

/// Every `itemtype` token of elements that also carry `itemscope`.
///
/// Multi-valued `itemtype` attributes are split on whitespace.
#[must_use]
pub fn microdata_types(doc: &Document) -> Vec<String> {
    let mut types = Vec::new();
    for node in doc.select("[itemscope][itemtype]").nodes() {
        let sel = Selection::from(*node);
        if let Some(value) = dom::get_attribute(&sel, "itemtype") {
            types.extend(value.split_whitespace().map(ToString::to_string));
        }
    }
    types
}

/// Last path segment of an item type URL (`https://schema.org/Article` -> `Article`).
#[must_use]
pub fn short_type_name(item_type: &str) -> &str {
    item_type
        .trim_end_matches('/')
        .rsplit(['/', '#'])
        .next()
        .unwrap_or(item_type)
}
