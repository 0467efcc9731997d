//! JSON-LD collection and node inspection.
//!
//! Collects Schema.org JSON-LD embedded in HTML documents. A top-level array
//! is flattened one level; only objects are kept. A node wrapped in `@graph`
//! is represented by its first graph entry when it carries no `@type` itself.

use dom_query::{Document, Selection};
use serde_json::{Map, Value};

use crate::dom;

/// A JSON-LD object as written in the page.
pub type JsonLdNode = Map<String, Value>;

/// Decode every `<script type="application/ld+json">` block.
///
/// Blocks that fail to parse are skipped. Must run before scripts are
/// stripped for text analysis.
#[must_use]
pub fn collect_json_ld(doc: &Document) -> Vec<JsonLdNode> {
    let mut nodes = Vec::new();

    for script in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let script_sel = Selection::from(*script);
        let json_text = dom::text_content(&script_sel);
        let json_text = json_text.trim();
        if json_text.is_empty() {
            continue;
        }

        let Ok(data) = serde_json::from_str::<Value>(json_text) else {
            continue;
        };

        match data {
            Value::Object(map) => nodes.push(map),
            Value::Array(items) => nodes.extend(items.into_iter().filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })),
            _ => {}
        }
    }

    nodes
}

/// Collect JSON-LD straight from markup.
#[must_use]
pub fn collect_json_ld_from_html(html: &str) -> Vec<JsonLdNode> {
    collect_json_ld(&dom::parse(html))
}

/// Object entries of `@graph`, if any.
#[must_use]
pub fn graph_entries(node: &JsonLdNode) -> Vec<&JsonLdNode> {
    match node.get("@graph") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

/// The node itself, or its first `@graph` entry when it wraps a graph.
#[must_use]
pub fn primary_node(node: &JsonLdNode) -> &JsonLdNode {
    graph_entries(node).into_iter().next().unwrap_or(node)
}

/// String `@type` values of a node, without graph unwrapping.
#[must_use]
pub fn declared_types(node: &JsonLdNode) -> Vec<String> {
    match node.get("@type") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// `@type` values, falling back to the primary graph entry's.
#[must_use]
pub fn resolved_types(node: &JsonLdNode) -> Vec<String> {
    if node.get("@type").is_some_and(|t| !t.is_null()) {
        declared_types(node)
    } else {
        declared_types(primary_node(node))
    }
}

/// Whether any resolved type is one of `wanted` (case-sensitive).
#[must_use]
pub fn has_any_type(node: &JsonLdNode, wanted: &[&str]) -> bool {
    resolved_types(node).iter().any(|t| wanted.contains(&t.as_str()))
}

/// Whether the primary node carries a truthy value for every key.
#[must_use]
pub fn has_properties(node: &JsonLdNode, keys: &[&str]) -> bool {
    let target = primary_node(node);
    keys.iter().all(|key| target.get(*key).is_some_and(is_truthy))
}

/// String entries of a `sameAs` array on the primary node.
#[must_use]
pub fn same_as_count(node: &JsonLdNode) -> usize {
    match primary_node(node).get("sameAs") {
        Some(Value::Array(items)) => items.iter().filter(|item| item.is_string()).count(),
        _ => 0,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> JsonLdNode {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_collect_flattens_arrays_and_skips_invalid() {
        let html = r#"<html><head>
            <script type="application/ld+json">{"@type":"Article","headline":"A"}</script>
            <script type="application/ld+json">[{"@type":"Organization"}, 3, {"@type":"Person"}]</script>
            <script type="application/ld+json">{not json}</script>
            <script type="application/ld+json">   </script>
            <script type="application/ld+json">"just a string"</script>
        </head><body></body></html>"#;
        let nodes = collect_json_ld_from_html(html);
        let types: Vec<Vec<String>> = nodes.iter().map(declared_types).collect();
        assert_eq!(types, vec![vec!["Article"], vec!["Organization"], vec!["Person"]]);
    }

    #[test]
    fn test_graph_unwrapping() {
        let wrapped = node(json!({
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "BlogPosting", "author": "A", "datePublished": "2025-01-01",
                 "publisher": {"@type": "Organization"}, "mainEntityOfPage": "https://e.com/p"},
                {"@type": "Organization"}
            ]
        }));
        assert_eq!(resolved_types(&wrapped), vec!["BlogPosting"]);
        assert!(has_any_type(&wrapped, &["Article", "BlogPosting"]));
        assert!(has_properties(
            &wrapped,
            &["author", "datePublished", "publisher", "mainEntityOfPage"]
        ));
        assert!(declared_types(&wrapped).is_empty());
    }

    #[test]
    fn test_own_type_wins_over_graph() {
        let n = node(json!({"@type": ["WebPage", "FAQPage"], "@graph": [{"@type": "Person"}]}));
        assert_eq!(resolved_types(&n), vec!["WebPage", "FAQPage"]);
        assert!(!has_any_type(&n, &["Person"]));
    }

    #[test]
    fn test_properties_require_truthy_values() {
        let n = node(json!({"@type": "Article", "author": "", "datePublished": "2025",
                            "publisher": "P", "mainEntityOfPage": "x"}));
        assert!(!has_properties(&n, &["author", "datePublished"]));
        assert!(has_properties(&n, &["datePublished", "publisher"]));
    }

    #[test]
    fn test_same_as_counts_strings_only() {
        let n = node(json!({"@type": "Organization",
                            "sameAs": ["https://x.com/a", "https://linkedin.com/a", 7]}));
        assert_eq!(same_as_count(&n), 2);
        assert_eq!(same_as_count(&node(json!({"sameAs": "https://x.com"}))), 0);
    }
}
