//! Vertex selectors, edge filters and property-equality matching

use super::edge::Edge;
use super::property::{property_map_from_json, PropertyMap, PropertyValue};
use std::borrow::Cow;

/// Exact-match test of a pattern against a record's fields
///
/// Every key of `pattern` must resolve through `lookup` to an equal value.
/// A missing field never matches, not even a `Null` in the pattern.
pub fn matches_pattern<'a, F>(pattern: &PropertyMap, lookup: F) -> bool
where
    F: Fn(&str) -> Option<Cow<'a, PropertyValue>>,
{
    pattern.iter().all(|(key, expected)| match lookup(key) {
        Some(actual) => actual.as_ref() == expected,
        None => false,
    })
}

/// Which vertices a traversal starts from
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VertexPattern {
    /// Every vertex in the graph
    #[default]
    All,
    /// A single vertex by id
    Id(String),
    /// Several vertices by id; an empty list means every vertex
    Ids(Vec<String>),
    /// Vertices whose fields equal every entry of the map
    Properties(PropertyMap),
}

impl VertexPattern {
    /// Interpret a JSON value as a selector
    ///
    /// Accepts null, a string id, an array of string ids or an object pattern.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;

        match value {
            Json::Null => Some(VertexPattern::All),
            Json::String(id) => Some(VertexPattern::Id(id)),
            Json::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Json::String(id) => Some(id),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(VertexPattern::Ids),
            obj @ Json::Object(_) => property_map_from_json(obj).map(VertexPattern::Properties),
            _ => None,
        }
    }
}

impl From<()> for VertexPattern {
    fn from(_: ()) -> Self {
        VertexPattern::All
    }
}

impl From<&str> for VertexPattern {
    fn from(id: &str) -> Self {
        VertexPattern::Id(id.to_string())
    }
}

impl From<String> for VertexPattern {
    fn from(id: String) -> Self {
        VertexPattern::Id(id)
    }
}

impl From<Vec<&str>> for VertexPattern {
    fn from(ids: Vec<&str>) -> Self {
        VertexPattern::Ids(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for VertexPattern {
    fn from(ids: Vec<String>) -> Self {
        VertexPattern::Ids(ids)
    }
}

impl<const N: usize> From<[&str; N]> for VertexPattern {
    fn from(ids: [&str; N]) -> Self {
        VertexPattern::Ids(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl From<PropertyMap> for VertexPattern {
    fn from(pattern: PropertyMap) -> Self {
        VertexPattern::Properties(pattern)
    }
}

/// Restricts which edges of an adjacency list are followed
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EdgeFilter {
    /// Every edge
    #[default]
    Any,
    /// Edges with exactly this label
    Label(String),
    /// Edges whose label is one of these
    Labels(Vec<String>),
    /// Edges whose fields (label included as `_label`) equal every entry
    Pattern(PropertyMap),
}

impl EdgeFilter {
    /// Check a single edge against the filter
    pub fn accepts(&self, edge: &Edge) -> bool {
        match self {
            EdgeFilter::Any => true,
            EdgeFilter::Label(label) => edge.label().map(|l| l.as_str()) == Some(label.as_str()),
            EdgeFilter::Labels(labels) => match edge.label() {
                Some(l) => labels.iter().any(|candidate| candidate == l.as_str()),
                None => false,
            },
            EdgeFilter::Pattern(pattern) => matches_pattern(pattern, |key| edge.field(key)),
        }
    }

    /// Interpret a JSON value as an edge filter
    ///
    /// Accepts null, a label string, an array of label strings or an object pattern.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;

        match value {
            Json::Null => Some(EdgeFilter::Any),
            Json::String(label) => Some(EdgeFilter::Label(label)),
            Json::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Json::String(label) => Some(label),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(EdgeFilter::Labels),
            obj @ Json::Object(_) => property_map_from_json(obj).map(EdgeFilter::Pattern),
            _ => None,
        }
    }
}

impl From<()> for EdgeFilter {
    fn from(_: ()) -> Self {
        EdgeFilter::Any
    }
}

impl From<&str> for EdgeFilter {
    fn from(label: &str) -> Self {
        EdgeFilter::Label(label.to_string())
    }
}

impl From<String> for EdgeFilter {
    fn from(label: String) -> Self {
        EdgeFilter::Label(label)
    }
}

impl From<Vec<&str>> for EdgeFilter {
    fn from(labels: Vec<&str>) -> Self {
        EdgeFilter::Labels(labels.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EdgeFilter {
    fn from(labels: [&str; N]) -> Self {
        EdgeFilter::Labels(labels.iter().map(|l| l.to_string()).collect())
    }
}

impl From<PropertyMap> for EdgeFilter {
    fn from(pattern: PropertyMap) -> Self {
        EdgeFilter::Pattern(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::props;
    use crate::graph::types::{EdgeId, VertexHandle};
    use serde_json::json;

    fn edge(label: Option<&str>) -> Edge {
        Edge::new(
            EdgeId::new(0),
            label.map(Into::into),
            VertexHandle::new(0),
            VertexHandle::new(1),
            props([("color", "green")]),
        )
    }

    #[test]
    fn test_matches_pattern() {
        let record = props([("hair", "magnificent"), ("eyes", "one")]);
        let lookup = |key: &str| record.get(key).map(Cow::Borrowed);

        assert!(matches_pattern(&props([("hair", "magnificent")]), lookup));
        assert!(matches_pattern(&PropertyMap::new(), lookup));
        assert!(!matches_pattern(&props([("hair", "middling")]), lookup));
        assert!(!matches_pattern(&props([("beard", "long")]), lookup));
        assert!(!matches_pattern(&props([("beard", PropertyValue::Null)]), lookup));
    }

    #[test]
    fn test_edge_filter_label() {
        let e = edge(Some("childOf"));
        assert!(EdgeFilter::Any.accepts(&e));
        assert!(EdgeFilter::from("childOf").accepts(&e));
        assert!(!EdgeFilter::from("banana").accepts(&e));
        assert!(EdgeFilter::from(["banana", "childOf"]).accepts(&e));
        assert!(!EdgeFilter::from(["banana"]).accepts(&e));
    }

    #[test]
    fn test_edge_filter_unlabeled() {
        let e = edge(None);
        assert!(EdgeFilter::Any.accepts(&e));
        assert!(!EdgeFilter::from("childOf").accepts(&e));
        assert!(!EdgeFilter::from(vec!["childOf"]).accepts(&e));
        assert!(EdgeFilter::from(props([("color", "green")])).accepts(&e));
    }

    #[test]
    fn test_edge_filter_pattern_includes_label() {
        let e = edge(Some("childOf"));
        assert!(EdgeFilter::from(props([("_label", "childOf"), ("color", "green")])).accepts(&e));
        assert!(!EdgeFilter::from(props([("_label", "childOf"), ("color", "blue")])).accepts(&e));
    }

    #[test]
    fn test_vertex_pattern_from_json() {
        assert_eq!(VertexPattern::from_json(json!(null)), Some(VertexPattern::All));
        assert_eq!(
            VertexPattern::from_json(json!("thor")),
            Some(VertexPattern::Id("thor".to_string()))
        );
        assert_eq!(
            VertexPattern::from_json(json!(["thor", "hoder"])),
            Some(VertexPattern::from(vec!["thor", "hoder"]))
        );
        assert_eq!(
            VertexPattern::from_json(json!({"hair": "y"})),
            Some(VertexPattern::Properties(props([("hair", "y")])))
        );
        assert_eq!(VertexPattern::from_json(json!([1, 2])), None);
        assert_eq!(VertexPattern::from_json(json!(true)), None);
    }

    #[test]
    fn test_edge_filter_from_json() {
        assert_eq!(EdgeFilter::from_json(json!(null)), Some(EdgeFilter::Any));
        assert_eq!(
            EdgeFilter::from_json(json!({"color": "blue"})),
            Some(EdgeFilter::Pattern(props([("color", "blue")])))
        );
        assert_eq!(EdgeFilter::from_json(json!(3)), None);
    }
}
