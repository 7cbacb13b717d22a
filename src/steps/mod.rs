//! Step catalog.
//!
//! A [`Step`] is a validated operation. Factory steps expand one upstream
//! item through [`Step::expand`]; stream-transform steps rewrap the whole
//! upstream sequence through [`Step::transform`]. Either way nothing touches
//! the backend until the returned iterator is pulled.

use std::iter;

use serde_json::Value;

use crate::{
    diagnostics::invariant_violation,
    errors::{ErrorCode, KvGraphError, Result},
    grammar::{OpName, ResultType, StepShape},
    graph::{
        RecordStore,
        keys::{Adjacent, Direction, ElementKind},
    },
};

mod args;
mod filter;
mod mutation;
mod navigation;
mod root;
mod terminal;

pub use filter::scalar_eq;

#[derive(Clone, Debug, PartialEq)]
pub enum Traverser {
    Graph,
    Vertex(String),
    Edge(String),
    Value(Value),
}

impl Traverser {
    pub fn element(&self) -> Option<(ElementKind, &str)> {
        match self {
            Traverser::Vertex(id) => Some((ElementKind::Vertex, id)),
            Traverser::Edge(id) => Some((ElementKind::Edge, id)),
            Traverser::Graph | Traverser::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Traverser::Graph => Value::Null,
            Traverser::Vertex(id) | Traverser::Edge(id) => Value::String(id),
            Traverser::Value(value) => value,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Traverser::Graph => "graph",
            Traverser::Vertex(_) => "vertex",
            Traverser::Edge(_) => "edge",
            Traverser::Value(_) => "value",
        }
    }
}

pub type Traversers = Box<dyn Iterator<Item = Result<Traverser>> + Send>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdSelector {
    All,
    One(String),
    Many(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeEnd {
    /// The `to` endpoint (stored as `outgoing`).
    Out,
    /// The `from` endpoint (stored as `incoming`).
    In,
    Both,
    Other(Option<String>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Root,
    Vertices(IdSelector),
    Edges(IdSelector),
    AddVertex { label: String },
    AddEdge { label: String, from: String, to: String },
    DropGraph,
    /// Produced by the optimizer only.
    VerticesWithLabel { label: String },
    Adjacent { direction: Direction, adjacent: Adjacent, labels: Vec<String> },
    BothEdges { labels: Vec<String> },
    EdgeVertex(EdgeEnd),
    Has { key: String, value: Value },
    Property { key: String, value: Value },
    Drop,
    Id,
    Label,
    Properties { keys: Vec<String> },
    ValueMap { keys: Vec<String> },
    Limit(usize),
    Count,
}

impl Step {
    /// Validates `args` for `name` called on a `state` step. Every argument
    /// error surfaces here, before the traversal reads anything.
    pub fn from_call(name: OpName, state: ResultType, call_args: &[Value]) -> Result<Self> {
        let op = name.as_str();
        let step = match name {
            OpName::V => Step::Vertices(args::ids(op, call_args)?),
            OpName::E => Step::Edges(args::ids(op, call_args)?),
            OpName::AddV => {
                args::arity(op, call_args, 1)?;
                Step::AddVertex {
                    label: args::label(op, call_args.first())?,
                }
            }
            OpName::AddE => {
                args::arity(op, call_args, 3)?;
                Step::AddEdge {
                    label: args::label(op, call_args.first())?,
                    from: args::endpoint(op, call_args.get(1))?,
                    to: args::endpoint(op, call_args.get(2))?,
                }
            }
            OpName::Drop => {
                args::arity(op, call_args, 0)?;
                if state == ResultType::Graph {
                    Step::DropGraph
                } else {
                    Step::Drop
                }
            }
            OpName::Out | OpName::In | OpName::OutE | OpName::InE => {
                let (direction, adjacent) = match name {
                    OpName::Out => (Direction::Out, Adjacent::Vertices),
                    OpName::In => (Direction::In, Adjacent::Vertices),
                    OpName::OutE => (Direction::Out, Adjacent::Edges),
                    _ => (Direction::In, Adjacent::Edges),
                };
                Step::Adjacent {
                    direction,
                    adjacent,
                    labels: args::names(op, call_args)?,
                }
            }
            OpName::BothE => Step::BothEdges {
                labels: args::names(op, call_args)?,
            },
            OpName::OutV | OpName::InV | OpName::BothV => {
                args::arity(op, call_args, 0)?;
                Step::EdgeVertex(match name {
                    OpName::OutV => EdgeEnd::Out,
                    OpName::InV => EdgeEnd::In,
                    _ => EdgeEnd::Both,
                })
            }
            OpName::OtherV => {
                args::arity(op, call_args, 1)?;
                Step::EdgeVertex(EdgeEnd::Other(args::optional_id(op, call_args.first())?))
            }
            OpName::Has => {
                args::arity(op, call_args, 2)?;
                Step::Has {
                    key: args::has_key(op, call_args.first())?,
                    value: args::scalar(op, call_args.get(1))?,
                }
            }
            OpName::Property => {
                args::arity(op, call_args, 2)?;
                Step::Property {
                    key: args::property_key(op, call_args.first())?,
                    value: args::required(op, call_args.get(1), "value")?.clone(),
                }
            }
            OpName::Id => {
                args::arity(op, call_args, 0)?;
                Step::Id
            }
            OpName::Label => {
                args::arity(op, call_args, 0)?;
                Step::Label
            }
            OpName::Properties => Step::Properties {
                keys: args::names(op, call_args)?,
            },
            OpName::ValueMap => Step::ValueMap {
                keys: args::names(op, call_args)?,
            },
            OpName::Limit => {
                args::arity(op, call_args, 1)?;
                Step::Limit(args::limit(op, call_args.first())?)
            }
            OpName::Count => {
                args::arity(op, call_args, 0)?;
                Step::Count
            }
        };
        Ok(step)
    }

    pub fn shape(&self) -> StepShape {
        match self {
            Step::Root
            | Step::Vertices(_)
            | Step::Edges(_)
            | Step::AddVertex { .. }
            | Step::AddEdge { .. }
            | Step::VerticesWithLabel { .. }
            | Step::Adjacent { .. }
            | Step::BothEdges { .. }
            | Step::EdgeVertex(_) => StepShape::Factory,
            Step::DropGraph
            | Step::Has { .. }
            | Step::Property { .. }
            | Step::Drop
            | Step::Id
            | Step::Label
            | Step::Properties { .. }
            | Step::ValueMap { .. }
            | Step::Limit(_)
            | Step::Count => StepShape::StreamTransform,
        }
    }

    pub fn expand(&self, records: &RecordStore, parent: Traverser) -> Traversers {
        match self {
            Step::Root => one(Traverser::Graph),
            Step::Vertices(ids) => root::vertices(records, parent, ids),
            Step::Edges(ids) => root::edges(records, parent, ids),
            Step::AddVertex { label } => root::add_vertex(records, parent, label),
            Step::AddEdge { label, from, to } => root::add_edge(records, parent, label, from, to),
            Step::VerticesWithLabel { label } => root::vertices_with_label(records, parent, label),
            Step::Adjacent {
                direction,
                adjacent,
                labels,
            } => navigation::adjacent(records, parent, *direction, *adjacent, labels),
            Step::BothEdges { labels } => navigation::both_edges(records, parent, labels),
            Step::EdgeVertex(end) => navigation::edge_vertex(records, parent, end),
            _ => failed(invariant_violation(
                ErrorCode::InvariantTraverserMismatch,
                format!("{self:?} is not a factory step"),
            )),
        }
    }

    pub fn transform(&self, records: &RecordStore, upstream: Traversers) -> Traversers {
        match self {
            Step::DropGraph => root::drop_graph(records, upstream),
            Step::Has { key, value } => filter::has(records, upstream, key, value),
            Step::Limit(n) => filter::limit(upstream, *n),
            Step::Property { key, value } => mutation::property(records, upstream, key, value),
            Step::Drop => mutation::drop(records, upstream),
            Step::Id => terminal::id(upstream),
            Step::Label => terminal::label(records, upstream),
            Step::Properties { keys } => terminal::properties(records, upstream, keys),
            Step::ValueMap { keys } => terminal::value_map(records, upstream, keys),
            Step::Count => terminal::count(upstream),
            _ => failed(invariant_violation(
                ErrorCode::InvariantTraverserMismatch,
                format!("{self:?} is not a stream-transform step"),
            )),
        }
    }
}

pub struct Deferred<F> {
    init: Option<F>,
    inner: Option<Traversers>,
}

impl<F> Iterator for Deferred<F>
where
    F: FnOnce() -> Result<Traversers>,
{
    type Item = Result<Traverser>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(init) = self.init.take() {
            match init() {
                Ok(inner) => self.inner = Some(inner),
                Err(err) => return Some(Err(err)),
            }
        }
        self.inner.as_mut()?.next()
    }
}

pub fn deferred<F>(init: F) -> Traversers
where
    F: FnOnce() -> Result<Traversers> + Send + 'static,
{
    Box::new(Deferred {
        init: Some(init),
        inner: None,
    })
}

pub(crate) fn one(traverser: Traverser) -> Traversers {
    Box::new(iter::once(Ok(traverser)))
}

pub(crate) fn none() -> Traversers {
    Box::new(iter::empty())
}

pub(crate) fn failed(err: KvGraphError) -> Traversers {
    Box::new(iter::once(Err(err)))
}

pub(crate) fn ids_as<F>(ids: Vec<String>, wrap: F) -> Traversers
where
    F: Fn(String) -> Traverser + Send + 'static,
{
    Box::new(ids.into_iter().map(move |id| Ok(wrap(id))))
}

/// The element an upstream item refers to, or an invariant error when the
/// grammar let something else through.
pub(crate) fn element_of<'a>(traverser: &'a Traverser, op: &str) -> Result<(ElementKind, &'a str)> {
    traverser.element().ok_or_else(|| {
        invariant_violation(
            ErrorCode::InvariantTraverserMismatch,
            format!("{op}() expects a vertex or edge, got {}", traverser.kind_name()),
        )
    })
}

pub(crate) fn mismatch(op: &str, expected: &str, got: &Traverser) -> KvGraphError {
    invariant_violation(
        ErrorCode::InvariantTraverserMismatch,
        format!("{op}() expects a {expected}, got {}", got.kind_name()),
    )
}
