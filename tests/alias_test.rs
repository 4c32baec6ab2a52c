use pipegraph::graph::{props, GraphConfig, GraphStore, NewEdge, NewVertex};
use pipegraph::query::{ExecutionError, QueryOutput};

fn norse_family() -> GraphStore {
    GraphStore::from_parts(
        GraphConfig::default(),
        vec![
            NewVertex::new().with_id("odin").with_property("hair", "magnificent"),
            NewVertex::new().with_id("thor").with_property("hair", "magnificent"),
            NewVertex::new().with_id("balder").with_property("hair", "middling"),
            NewVertex::new().with_id("hoder").with_property("hair", "y"),
        ],
        vec![
            NewEdge::new("thor", "odin").with_label("childOf").with_property("color", "green"),
            NewEdge::new("balder", "odin").with_label("childOf").with_property("color", "green"),
            NewEdge::new("hoder", "odin").with_label("childOf").with_property("color", "blue"),
        ],
    )
    .unwrap()
}

fn vertex_ids<'g>(outputs: &[QueryOutput<'g>]) -> Vec<&'g str> {
    outputs.iter().filter_map(QueryOutput::vertex_id).collect()
}

#[test]
fn test_as_merge() {
    let store = norse_family();
    let result = store
        .v(())
        .r#as("parent")
        .r#in("childOf")
        .r#as("child")
        .merge(["parent", "child"])
        .property("_id")
        .run()
        .unwrap();

    let ids: Vec<_> = result
        .iter()
        .filter_map(|o| o.as_value().and_then(|v| v.as_string()))
        .collect();
    assert_eq!(ids, vec!["odin", "hoder", "odin", "balder", "odin", "thor"]);
}

#[test]
fn test_as_except() {
    let store = norse_family();
    let result = store
        .v("thor")
        .r#as("me")
        .out("childOf")
        .r#in("childOf")
        .except("me")
        .run()
        .unwrap();
    assert_eq!(vertex_ids(&result), vec!["hoder", "balder"]);
}

#[test]
fn test_as_back() {
    let store = norse_family();
    let result = store
        .v(())
        .r#as("me")
        .r#in("childOf")
        .filter(props([("_id", "thor")]))
        .back("me")
        .run()
        .unwrap();
    assert_eq!(vertex_ids(&result), vec!["odin"]);
}

#[test]
fn test_back_restores_every_surviving_path() {
    let store = norse_family();
    let result = store
        .v("odin")
        .r#as("parent")
        .r#in("childOf")
        .back("parent")
        .run()
        .unwrap();
    assert_eq!(vertex_ids(&result), vec!["odin", "odin", "odin"]);
}

#[test]
fn test_having() {
    let store = norse_family();

    let result = store
        .v(())
        .having(|q| q.r#in("childOf").filter(props([("_id", "thor")])))
        .run()
        .unwrap();
    assert_eq!(vertex_ids(&result), vec!["odin"]);

    let result = store.v(()).having(|q| q.r#in("childOf")).run().unwrap();
    assert_eq!(vertex_ids(&result), vec!["odin"]);

    let result = store.v(()).having(|q| q.out("childOf")).run().unwrap();
    assert_eq!(vertex_ids(&result), vec!["hoder", "balder", "thor"]);
}

#[test]
fn test_nested_having_uses_distinct_aliases() {
    let store = norse_family();
    let query = store
        .v(())
        .having(|q| q.r#in("childOf"))
        .having(|q| q.r#in("childOf").filter(props([("hair", "middling")])));
    assert_eq!(query.len(), 10);

    let mut query = query;
    assert_eq!(vertex_ids(&query.run().unwrap()), vec!["odin"]);
}

#[test]
fn test_unbound_alias_errors() {
    let store = norse_family();

    let err = store.v("odin").back("nobody").run().unwrap_err();
    assert_eq!(err, ExecutionError::UndefinedAlias("nobody".to_string()));

    let err = store.v("odin").except("nobody").run().unwrap_err();
    assert!(matches!(err, ExecutionError::UndefinedAlias(_)));
}

#[test]
fn test_merge_skips_unbound_names() {
    let store = norse_family();
    let result = store
        .v("thor")
        .r#as("me")
        .merge(["ghost", "me"])
        .run()
        .unwrap();
    assert_eq!(vertex_ids(&result), vec!["thor"]);
}
