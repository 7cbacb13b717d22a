use std::sync::Arc;

use kvgraph::{
    ErrorCode, Graph, MemoryKvStore, OpCall, OpName, Optimizer, ResultType, RewriteRule,
    backend::InstrumentedStore,
    optimizer::{PlannedStep, resolve},
    steps::Step,
};
use serde_json::json;

fn seeded(optimizer: Optimizer) -> Graph {
    let g = Graph::in_memory().with_optimizer(optimizer);
    for label in ["person", "person", "other", "person", "other"] {
        g.add_v(label).iterate().expect("seed");
    }
    g
}

fn sorted_ids(g: &Graph) -> Vec<String> {
    let mut ids: Vec<String> = g
        .v(())
        .has("label", "person")
        .execute()
        .expect("people")
        .into_iter()
        .map(|v| v.as_str().expect("id").to_string())
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_label_scan_matches_unoptimized_results() {
    let optimized = seeded(Optimizer::new());
    let count = optimized
        .v(())
        .has("label", "person")
        .count()
        .execute()
        .expect("count");
    assert_eq!(count, vec![json!(3)]);

    let plain = Graph::new(Arc::clone(optimized.store())).with_optimizer(Optimizer::without_rewrites());
    assert_eq!(sorted_ids(&optimized), sorted_ids(&plain));
    assert_eq!(
        plain.v(()).has("label", "person").count().execute().expect("count"),
        vec![json!(3)]
    );
}

#[test]
fn test_plan_shows_rewritten_step() {
    let g = Graph::in_memory();
    let plan = g.v(()).has("label", "person").count().plan().expect("plan");
    assert_eq!(plan.to_string(), r#"Graph() -> labelScan("person") -> count()"#);
    assert_eq!(plan.output(), ResultType::Value);
    assert_eq!(
        plan.steps()[1].step,
        Step::VerticesWithLabel {
            label: "person".into()
        }
    );

    let plain = Graph::in_memory().with_optimizer(Optimizer::without_rewrites());
    let plan = plain.v(()).has("label", "person").plan().expect("plan");
    assert_eq!(plan.to_string(), r#"Graph() -> V() -> has("label", "person")"#);
}

#[test]
fn test_rewrite_needs_unfiltered_v_and_label_key() {
    let g = Graph::in_memory();
    for (traversal, expected) in [
        (
            g.v("abc").has("label", "person"),
            r#"Graph() -> V("abc") -> has("label", "person")"#,
        ),
        (
            g.v(()).has("name", "person"),
            r#"Graph() -> V() -> has("name", "person")"#,
        ),
        (
            g.v(()).has("label", 3),
            r#"Graph() -> V() -> has("label", 3)"#,
        ),
        (
            g.v(()).out(()).has("label", "person"),
            r#"Graph() -> V() -> out() -> has("label", "person")"#,
        ),
    ] {
        assert_eq!(traversal.plan().expect("plan").to_string(), expected);
    }
}

#[test]
fn test_invalid_transition_fails_before_any_io() {
    let store = InstrumentedStore::new(MemoryKvStore::new());
    let metrics = store.metrics();
    let g = Graph::new(Arc::new(store));

    let err = g.add_v("person").out_v().execute().expect_err("outV on vertex");
    assert_eq!(err.code(), ErrorCode::ChainOperationNotAllowed);
    let err = g.add_e("knows", "a", "b").out(()).execute().expect_err("out on edge");
    assert_eq!(err.code(), ErrorCode::ChainOperationNotAllowed);
    let err = g.v(()).count().out(()).execute().expect_err("out on value");
    assert_eq!(err.code(), ErrorCode::ChainOperationNotAllowed);
    let err = g.add_v("person").limit(1).label().count().has("x", 1).execute().expect_err("has on value");
    assert_eq!(err.code(), ErrorCode::ChainOperationNotAllowed);

    assert_eq!(metrics.snapshot().total_calls(), 0);
}

#[test]
fn test_argument_errors_fail_before_any_io() {
    let store = InstrumentedStore::new(MemoryKvStore::new());
    let metrics = store.metrics();
    let g = Graph::new(Arc::new(store));

    // The write comes first in the chain, the bad argument last.
    let err = g
        .add_v("person")
        .property("name", "x")
        .has("age", json!({"a": 1}))
        .execute()
        .expect_err("object");
    assert_eq!(err.code(), ErrorCode::ArgNonScalarValue);
    assert_eq!(metrics.snapshot().total_calls(), 0);
}

#[test]
fn test_resolve_prepends_root_and_tracks_types() {
    let calls = vec![
        OpCall::new(OpName::V, vec![]),
        OpCall::new(OpName::OutE, vec![json!("knows")]),
        OpCall::new(OpName::InV, vec![]),
        OpCall::new(OpName::Id, vec![]),
    ];
    let steps = resolve(&calls).expect("resolve");
    let types: Vec<(&str, ResultType, ResultType)> = steps
        .iter()
        .map(|s| (s.name, s.input, s.output))
        .collect();
    assert_eq!(
        types,
        vec![
            ("Graph", ResultType::Graph, ResultType::Graph),
            ("V", ResultType::Graph, ResultType::Vertex),
            ("outE", ResultType::Vertex, ResultType::Edge),
            ("inV", ResultType::Edge, ResultType::Vertex),
            ("id", ResultType::Vertex, ResultType::Value),
        ]
    );
    assert_eq!(resolve(&[]).expect_err("empty").code(), ErrorCode::ChainEmpty);
}

/// Drops `limit(n)` steps that follow a `count()`, which always yields one item.
struct LimitAfterCount;

impl RewriteRule for LimitAfterCount {
    fn name(&self) -> &'static str {
        "limit-after-count"
    }

    fn window(&self) -> usize {
        2
    }

    fn rewrite(&self, window: &[PlannedStep]) -> Option<Vec<PlannedStep>> {
        match (&window[0].step, &window[1].step) {
            (Step::Count, Step::Limit(n)) if *n >= 1 => Some(vec![window[0].clone()]),
            _ => None,
        }
    }
}

/// Tries to turn a vertex step into a value step; must be refused.
struct TypeChanging;

impl RewriteRule for TypeChanging {
    fn name(&self) -> &'static str {
        "type-changing"
    }

    fn window(&self) -> usize {
        1
    }

    fn rewrite(&self, window: &[PlannedStep]) -> Option<Vec<PlannedStep>> {
        if window[0].output != ResultType::Vertex {
            return None;
        }
        let mut replaced = window[0].clone();
        replaced.output = ResultType::Value;
        replaced.step = Step::Count;
        replaced.name = "count";
        Some(vec![replaced])
    }
}

#[test]
fn test_custom_rules_plug_in_without_executor_changes() {
    let g = seeded(Optimizer::new().with_rule(LimitAfterCount));
    assert_eq!(
        g.optimizer().rule_names(),
        vec!["vertex-label-scan", "limit-after-count"]
    );
    let traversal = g.v(()).count().limit(5);
    assert_eq!(
        traversal.plan().expect("plan").to_string(),
        "Graph() -> V() -> count()"
    );
    assert_eq!(traversal.execute().expect("run"), vec![json!(5)]);
}

#[test]
fn test_rule_changing_result_type_is_skipped() {
    let g = seeded(Optimizer::without_rewrites().with_rule(TypeChanging));
    let plan = g.v(()).plan().expect("plan");
    assert_eq!(plan.to_string(), "Graph() -> V()");
    assert_eq!(g.v(()).count().execute().expect("count"), vec![json!(5)]);
}
