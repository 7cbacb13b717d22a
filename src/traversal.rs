//! Fluent traversal builder.
//!
//! Each method records one [`OpCall`] and hands the builder back. Nothing is
//! validated or executed until [`Traversal::plan`], [`Traversal::stream`] or
//! [`Traversal::execute`]; [`Traversal::explain`] only renders the chain.
//!
//! ```no_run
//! use kvgraph::Graph;
//!
//! let g = Graph::in_memory();
//! let alice = g.add_v("person").property("name", "Alice").execute()?;
//! let people = g.v(()).has("label", "person").count().execute()?;
//! # Ok::<(), kvgraph::KvGraphError>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::Result,
    grammar::OpName,
    graph::Graph,
    optimizer::Plan,
    pipeline::{self, ExecutionContext, TraversalStream},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpCall {
    pub name: OpName,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl OpCall {
    pub fn new(name: OpName, args: Vec<Value>) -> Self {
        Self { name, args }
    }
}

pub fn render_call(name: &str, args: &[Value]) -> String {
    let rendered: Vec<String> = args.iter().map(Value::to_string).collect();
    format!("{name}({})", rendered.join(", "))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ids {
    All,
    One(String),
    Many(Vec<String>),
}

impl Ids {
    fn into_args(self) -> Vec<Value> {
        match self {
            Ids::All => Vec::new(),
            Ids::One(id) => vec![Value::String(id)],
            Ids::Many(ids) => vec![Value::Array(ids.into_iter().map(Value::String).collect())],
        }
    }
}

impl From<()> for Ids {
    fn from(_: ()) -> Self {
        Ids::All
    }
}

impl From<&str> for Ids {
    fn from(id: &str) -> Self {
        Ids::One(id.to_string())
    }
}

impl From<String> for Ids {
    fn from(id: String) -> Self {
        Ids::One(id)
    }
}

impl From<&String> for Ids {
    fn from(id: &String) -> Self {
        Ids::One(id.clone())
    }
}

impl From<Vec<String>> for Ids {
    fn from(ids: Vec<String>) -> Self {
        Ids::Many(ids)
    }
}

impl From<Vec<&str>> for Ids {
    fn from(ids: Vec<&str>) -> Self {
        Ids::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<&[String]> for Ids {
    fn from(ids: &[String]) -> Self {
        Ids::Many(ids.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Ids {
    fn from(ids: [&str; N]) -> Self {
        Ids::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Names(Vec<String>);

impl Names {
    fn into_args(self) -> Vec<Value> {
        self.0.into_iter().map(Value::String).collect()
    }
}

impl From<()> for Names {
    fn from(_: ()) -> Self {
        Names::default()
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names(vec![name.to_string()])
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names(vec![name])
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Names(names)
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Names {
    fn from(names: &[&str]) -> Self {
        Names(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Names(names.iter().map(|name| name.to_string()).collect())
    }
}

#[derive(Clone)]
pub struct Traversal {
    graph: Graph,
    calls: Vec<OpCall>,
}

impl Traversal {
    pub fn new(graph: &Graph) -> Self {
        Self {
            graph: graph.clone(),
            calls: Vec::new(),
        }
    }

    pub fn from_calls(graph: &Graph, calls: Vec<OpCall>) -> Self {
        Self {
            graph: graph.clone(),
            calls,
        }
    }

    fn push(mut self, name: OpName, args: Vec<Value>) -> Self {
        self.calls.push(OpCall::new(name, args));
        self
    }

    pub fn v(self, ids: impl Into<Ids>) -> Self {
        self.push(OpName::V, ids.into().into_args())
    }

    pub fn e(self, ids: impl Into<Ids>) -> Self {
        self.push(OpName::E, ids.into().into_args())
    }

    pub fn add_v(self, label: &str) -> Self {
        self.push(OpName::AddV, vec![Value::from(label)])
    }

    pub fn add_e(self, label: &str, from: &str, to: &str) -> Self {
        self.push(
            OpName::AddE,
            vec![Value::from(label), Value::from(from), Value::from(to)],
        )
    }

    pub fn drop(self) -> Self {
        self.push(OpName::Drop, Vec::new())
    }

    pub fn property(self, key: &str, value: impl Into<Value>) -> Self {
        self.push(OpName::Property, vec![Value::from(key), value.into()])
    }

    pub fn has(self, key: &str, value: impl Into<Value>) -> Self {
        self.push(OpName::Has, vec![Value::from(key), value.into()])
    }

    pub fn out(self, labels: impl Into<Names>) -> Self {
        self.push(OpName::Out, labels.into().into_args())
    }

    pub fn r#in(self, labels: impl Into<Names>) -> Self {
        self.push(OpName::In, labels.into().into_args())
    }

    pub fn out_e(self, labels: impl Into<Names>) -> Self {
        self.push(OpName::OutE, labels.into().into_args())
    }

    pub fn in_e(self, labels: impl Into<Names>) -> Self {
        self.push(OpName::InE, labels.into().into_args())
    }

    pub fn both_e(self, labels: impl Into<Names>) -> Self {
        self.push(OpName::BothE, labels.into().into_args())
    }

    pub fn out_v(self) -> Self {
        self.push(OpName::OutV, Vec::new())
    }

    pub fn in_v(self) -> Self {
        self.push(OpName::InV, Vec::new())
    }

    pub fn both_v(self) -> Self {
        self.push(OpName::BothV, Vec::new())
    }

    /// The endpoint that is not `known`; `None` picks `to`.
    pub fn other_v(self, known: Option<&str>) -> Self {
        let args = known.map(|id| vec![Value::from(id)]).unwrap_or_default();
        self.push(OpName::OtherV, args)
    }

    pub fn id(self) -> Self {
        self.push(OpName::Id, Vec::new())
    }

    pub fn label(self) -> Self {
        self.push(OpName::Label, Vec::new())
    }

    pub fn properties(self, keys: impl Into<Names>) -> Self {
        self.push(OpName::Properties, keys.into().into_args())
    }

    pub fn value_map(self, keys: impl Into<Names>) -> Self {
        self.push(OpName::ValueMap, keys.into().into_args())
    }

    pub fn limit(self, n: usize) -> Self {
        self.push(OpName::Limit, vec![Value::from(n)])
    }

    pub fn count(self) -> Self {
        self.push(OpName::Count, Vec::new())
    }

    pub fn calls(&self) -> &[OpCall] {
        &self.calls
    }

    pub fn explain(&self) -> String {
        self.calls
            .iter()
            .map(|call| render_call(call.name.as_str(), &call.args))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn plan(&self) -> Result<Plan> {
        self.graph.optimizer().plan(&self.calls)
    }

    /// Lazy results. Nothing reaches the backend until the stream is pulled.
    pub fn stream(self) -> Result<TraversalStream> {
        let plan = self.plan()?;
        let ctx = ExecutionContext::new(self.graph.records().clone());
        Ok(TraversalStream::new(pipeline::execute(&ctx, plan)?))
    }

    pub fn execute(self) -> Result<Vec<Value>> {
        self.stream()?.collect()
    }

    pub fn iterate(self) -> Result<()> {
        for item in self.stream()? {
            item?;
        }
        Ok(())
    }
}
