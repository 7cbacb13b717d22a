use std::sync::Arc;

use kvgraph::{
    ElementKind, ErrorCode, Graph, KvStore, MemoryKvStore,
    graph::{Adjacent, Direction, EdgeEndpoints, keys},
};
use serde_json::json;

fn graph_with_store() -> (Graph, Arc<MemoryKvStore>) {
    let store = Arc::new(MemoryKvStore::new());
    (Graph::new(store.clone()), store)
}

fn index(store: &MemoryKvStore, key: &str) -> Option<Vec<String>> {
    store
        .get(key)
        .expect("get")
        .map(|entry| entry.json().expect("index json"))
}

fn keys_under(store: &MemoryKvStore, pattern: &str) -> Vec<String> {
    store
        .keys(&[pattern])
        .expect("keys")
        .collect::<Result<_, _>>()
        .expect("stream")
}

#[test]
fn test_vertex_records_are_written() {
    let (graph, store) = graph_with_store();
    let id = graph.records().create_vertex("person").expect("vertex");
    assert_eq!(
        store.get(&format!("node.{id}")).expect("get").expect("marker").string(),
        id
    );
    assert_eq!(
        store.get(&format!("node.{id}.label")).expect("get").expect("label").string(),
        "person"
    );
    assert!(store.get(&format!("node.{id}.label.person")).expect("get").is_some());
    assert!(store.get(&format!("nodes.{id}")).expect("get").is_some());
    assert!(graph.records().exists(ElementKind::Vertex, &id).expect("exists"));
}

#[test]
fn test_edge_creation_writes_markers_and_indices() {
    let (graph, store) = graph_with_store();
    let records = graph.records();
    let a = records.create_vertex("person").expect("a");
    let b = records.create_vertex("person").expect("b");
    let e = records.create_edge("knows", &a, &b).expect("edge");

    assert_eq!(
        store.get(&format!("edge.{e}.incoming")).expect("get").expect("from").string(),
        a
    );
    assert_eq!(
        store.get(&format!("edge.{e}.outgoing")).expect("get").expect("to").string(),
        b
    );
    assert!(store.get(&format!("edges.{e}")).expect("get").is_some());
    for key in [
        format!("node.{a}.outE.{e}"),
        format!("node.{a}.outE.knows.{e}"),
        format!("node.{a}.outV.{b}"),
        format!("node.{a}.outV.knows.{b}"),
        format!("node.{b}.inE.{e}"),
        format!("node.{b}.inE.knows.{e}"),
        format!("node.{b}.inV.{a}"),
        format!("node.{b}.inV.knows.{a}"),
    ] {
        assert!(store.get(&key).expect("get").is_some(), "missing {key}");
    }
    assert_eq!(index(&store, &format!("node.{a}.outE.__index")), Some(vec![e.clone()]));
    assert_eq!(index(&store, &format!("node.{a}.outV.knows.__index")), Some(vec![b.clone()]));
    assert_eq!(index(&store, &format!("node.{b}.inV.__index")), Some(vec![a.clone()]));
    assert_eq!(
        records.edge_endpoints(&e).expect("endpoints"),
        EdgeEndpoints {
            from: Some(a),
            to: Some(b)
        }
    );
}

#[test]
fn test_edge_requires_existing_endpoints() {
    let (graph, store) = graph_with_store();
    let a = graph.records().create_vertex("person").expect("a");
    let err = graph
        .records()
        .create_edge("knows", &a, "missing")
        .expect_err("dangling endpoint");
    assert_eq!(err.code(), ErrorCode::DataEndpointMissing);
    assert!(keys_under(&store, "edge.>").is_empty());
    assert!(keys_under(&store, "edges.>").is_empty());
}

#[test]
fn test_record_argument_validation() {
    let (graph, _) = graph_with_store();
    let records = graph.records();
    assert_eq!(
        records.create_vertex("").expect_err("empty").code(),
        ErrorCode::ArgLabelRequired
    );
    assert_eq!(
        records.create_vertex("a.b").expect_err("dotted").code(),
        ErrorCode::ArgInvalidToken
    );
    let id = records.create_vertex("person").expect("vertex");
    for (key, code) in [
        ("id", ErrorCode::ArgReservedProperty),
        ("label", ErrorCode::ArgReservedProperty),
        ("", ErrorCode::ArgPropertyKeyRequired),
        ("a b", ErrorCode::ArgInvalidToken),
    ] {
        let err = records
            .set_property(ElementKind::Vertex, &id, key, &json!(1))
            .expect_err(key);
        assert_eq!(err.code(), code, "{key}");
    }
}

#[test]
fn test_properties_round_trip_as_json() {
    let (graph, _) = graph_with_store();
    let records = graph.records();
    let id = records.create_vertex("person").expect("vertex");
    records
        .set_property(ElementKind::Vertex, &id, "name", &json!("Alice"))
        .expect("name");
    records
        .set_property(ElementKind::Vertex, &id, "tags", &json!(["a", "b"]))
        .expect("tags");
    records
        .set_property(ElementKind::Vertex, &id, "name", &json!("Alicia"))
        .expect("overwrite");
    assert_eq!(
        records.get_property(ElementKind::Vertex, &id, "name").expect("get"),
        Some(json!("Alicia"))
    );
    let all = records.properties(ElementKind::Vertex, &id).expect("all");
    assert_eq!(all.len(), 2);
    assert_eq!(all["tags"], json!(["a", "b"]));
}

#[test]
fn test_adjacency_falls_back_to_marker_scan_without_index() {
    let (graph, store) = graph_with_store();
    let records = graph.records();
    let a = records.create_vertex("person").expect("a");
    let b = records.create_vertex("person").expect("b");
    let c = records.create_vertex("person").expect("c");
    records.create_edge("knows", &a, &b).expect("ab");
    records.create_edge("knows", &a, &c).expect("ac");

    store.delete(&format!("node.{a}.outV.__index")).expect("delete index");
    let mut ids = records
        .adjacent_ids(&a, Direction::Out, Adjacent::Vertices, None)
        .expect("scan");
    ids.sort();
    let mut expected = vec![b, c];
    expected.sort();
    assert_eq!(ids, expected);
}

#[test]
fn test_corrupt_index_is_treated_as_absent() {
    let (graph, store) = graph_with_store();
    let records = graph.records();
    let a = records.create_vertex("person").expect("a");
    let b = records.create_vertex("person").expect("b");
    records.create_edge("knows", &a, &b).expect("ab");
    store
        .put(&format!("node.{a}.outV.knows.__index"), b"{not json")
        .expect("corrupt");
    let ids = records
        .adjacent_ids(&a, Direction::Out, Adjacent::Vertices, Some("knows"))
        .expect("fallback");
    assert_eq!(ids, vec![b]);
}

#[test]
fn test_parallel_edges_keep_neighbor_until_last_is_dropped() {
    let (graph, store) = graph_with_store();
    let records = graph.records();
    let a = records.create_vertex("person").expect("a");
    let b = records.create_vertex("person").expect("b");
    let first = records.create_edge("knows", &a, &b).expect("first");
    let second = records.create_edge("knows", &a, &b).expect("second");

    assert_eq!(
        index(&store, &format!("node.{a}.outV.__index")),
        Some(vec![b.clone(), b.clone()])
    );
    records.drop_edge(&first).expect("drop first");
    assert!(store.get(&format!("node.{a}.outV.{b}")).expect("get").is_some());
    assert_eq!(index(&store, &format!("node.{a}.outV.__index")), Some(vec![b.clone()]));
    assert_eq!(
        index(&store, &format!("node.{a}.outE.__index")),
        Some(vec![second.clone()])
    );

    records.drop_edge(&second).expect("drop second");
    assert!(store.get(&format!("node.{a}.outV.{b}")).expect("get").is_none());
    assert!(store.get(&format!("node.{b}.inV.knows.{a}")).expect("get").is_none());
    assert_eq!(index(&store, &format!("node.{a}.outV.__index")), Some(vec![]));
}

#[test]
fn test_drop_edge_removes_every_edge_key() {
    let (graph, store) = graph_with_store();
    let records = graph.records();
    let a = records.create_vertex("person").expect("a");
    let b = records.create_vertex("person").expect("b");
    let e = records.create_edge("knows", &a, &b).expect("edge");
    records
        .set_property(ElementKind::Edge, &e, "weight", &json!(0.5))
        .expect("weight");
    records.drop_edge(&e).expect("drop");

    assert!(keys_under(&store, "edge.>").is_empty());
    assert!(keys_under(&store, "edges.>").is_empty());
    assert!(keys_under(&store, &format!("node.{a}.outE.*")).iter().all(|k| k.ends_with("__index")));
    assert!(
        records
            .adjacent_ids(&b, Direction::In, Adjacent::Edges, Some("knows"))
            .expect("in edges")
            .is_empty()
    );
}

#[test]
fn test_drop_vertex_cascades_to_incident_edges() {
    let (graph, store) = graph_with_store();
    let records = graph.records();
    let a = records.create_vertex("person").expect("a");
    let b = records.create_vertex("person").expect("b");
    let c = records.create_vertex("person").expect("c");
    records.create_edge("knows", &a, &b).expect("ab");
    records.create_edge("likes", &c, &a).expect("ca");
    let bc = records.create_edge("knows", &b, &c).expect("bc");
    records.create_edge("self", &a, &a).expect("loop");

    records.drop_vertex(&a).expect("drop");

    assert!(keys_under(&store, &format!("node.{a}.>")).is_empty());
    assert!(store.get(&format!("node.{a}")).expect("get").is_none());
    assert!(store.get(&format!("nodes.{a}")).expect("get").is_none());
    let edges: Vec<String> = keys_under(&store, "edges.*")
        .into_iter()
        .map(|k| keys::last_token(&k).to_string())
        .collect();
    assert_eq!(edges, vec![bc]);
    assert!(
        records
            .adjacent_ids(&b, Direction::In, Adjacent::Vertices, None)
            .expect("b in")
            .is_empty()
    );
    assert!(
        records
            .adjacent_ids(&c, Direction::Out, Adjacent::Vertices, Some("likes"))
            .expect("c out")
            .is_empty()
    );
    assert!(store.get(&format!("node.{c}.outV.likes.{a}")).expect("get").is_none());
}

#[test]
fn test_drop_all_clears_the_graph_keyspace() {
    let (graph, store) = graph_with_store();
    let records = graph.records();
    let a = records.create_vertex("person").expect("a");
    let b = records.create_vertex("person").expect("b");
    records.create_edge("knows", &a, &b).expect("ab");
    store.put("meta.version", b"1").expect("foreign key");

    records.drop_all().expect("drop all");
    assert_eq!(keys_under(&store, ">"), vec!["meta.version".to_string()]);
}

#[test]
fn test_label_scan_and_enumeration() {
    let (graph, _) = graph_with_store();
    let records = graph.records();
    let p1 = records.create_vertex("person").expect("p1");
    let p2 = records.create_vertex("person").expect("p2");
    records.create_vertex("software").expect("s");

    let mut people: Vec<String> = records
        .vertices_with_label("person")
        .expect("scan")
        .collect::<Result<_, _>>()
        .expect("stream");
    people.sort();
    let mut expected = vec![p1, p2];
    expected.sort();
    assert_eq!(people, expected);
    assert_eq!(records.element_ids(ElementKind::Vertex).expect("ids").count(), 3);
    assert_eq!(records.element_ids(ElementKind::Edge).expect("ids").count(), 0);
}

#[test]
fn test_element_ids_are_unique_tokens() {
    let first = kvgraph::graph::new_element_id();
    let second = kvgraph::graph::new_element_id();
    assert_ne!(first, second);
    assert_eq!(first.len(), 32);
    assert!(kvgraph::pattern::is_valid_token(&first));
}
