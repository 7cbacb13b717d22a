//! Type-state operation grammar.
//!
//! Every step leaves the chain in one of four result types; the table below
//! lists which operations may follow each one and what they produce.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorCode, KvGraphError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Graph,
    Vertex,
    Edge,
    Value,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultType::Graph => "graph",
            ResultType::Vertex => "vertex",
            ResultType::Edge => "edge",
            ResultType::Value => "value",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpName {
    #[serde(rename = "V")]
    V,
    AddV,
    #[serde(rename = "E")]
    E,
    AddE,
    Drop,
    Property,
    Has,
    Out,
    In,
    OutE,
    InE,
    BothE,
    OutV,
    InV,
    BothV,
    OtherV,
    Id,
    Label,
    Properties,
    ValueMap,
    Limit,
    Count,
}

impl OpName {
    pub const ALL: [OpName; 22] = [
        OpName::V,
        OpName::AddV,
        OpName::E,
        OpName::AddE,
        OpName::Drop,
        OpName::Property,
        OpName::Has,
        OpName::Out,
        OpName::In,
        OpName::OutE,
        OpName::InE,
        OpName::BothE,
        OpName::OutV,
        OpName::InV,
        OpName::BothV,
        OpName::OtherV,
        OpName::Id,
        OpName::Label,
        OpName::Properties,
        OpName::ValueMap,
        OpName::Limit,
        OpName::Count,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpName::V => "V",
            OpName::AddV => "addV",
            OpName::E => "E",
            OpName::AddE => "addE",
            OpName::Drop => "drop",
            OpName::Property => "property",
            OpName::Has => "has",
            OpName::Out => "out",
            OpName::In => "in",
            OpName::OutE => "outE",
            OpName::InE => "inE",
            OpName::BothE => "bothE",
            OpName::OutV => "outV",
            OpName::InV => "inV",
            OpName::BothV => "bothV",
            OpName::OtherV => "otherV",
            OpName::Id => "id",
            OpName::Label => "label",
            OpName::Properties => "properties",
            OpName::ValueMap => "valueMap",
            OpName::Limit => "limit",
            OpName::Count => "count",
        }
    }
}

impl fmt::Display for OpName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpName {
    type Err = KvGraphError;

    fn from_str(s: &str) -> Result<Self> {
        OpName::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                KvGraphError::precondition(
                    ErrorCode::ChainUnknownOperation,
                    format!("unknown operation '{s}'"),
                )
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepShape {
    /// Invoked once per upstream item; results are spliced in place.
    Factory,
    /// Receives the whole upstream sequence and returns a new one.
    StreamTransform,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: OpName,
    pub output: ResultType,
    pub shape: StepShape,
}

const fn op(name: OpName, output: ResultType, shape: StepShape) -> OperationDescriptor {
    OperationDescriptor {
        name,
        output,
        shape,
    }
}

use ResultType as R;
use StepShape::{Factory, StreamTransform};

static GRAPH_OPERATIONS: [OperationDescriptor; 5] = [
    op(OpName::V, R::Vertex, Factory),
    op(OpName::AddV, R::Vertex, Factory),
    op(OpName::E, R::Edge, Factory),
    op(OpName::AddE, R::Edge, Factory),
    op(OpName::Drop, R::Value, StreamTransform),
];

static VERTEX_OPERATIONS: [OperationDescriptor; 14] = [
    op(OpName::Property, R::Vertex, StreamTransform),
    op(OpName::Has, R::Vertex, StreamTransform),
    op(OpName::Out, R::Vertex, Factory),
    op(OpName::In, R::Vertex, Factory),
    op(OpName::OutE, R::Edge, Factory),
    op(OpName::InE, R::Edge, Factory),
    op(OpName::BothE, R::Edge, Factory),
    op(OpName::Drop, R::Value, StreamTransform),
    op(OpName::Id, R::Value, StreamTransform),
    op(OpName::Label, R::Value, StreamTransform),
    op(OpName::Properties, R::Value, StreamTransform),
    op(OpName::ValueMap, R::Value, StreamTransform),
    op(OpName::Limit, R::Vertex, StreamTransform),
    op(OpName::Count, R::Value, StreamTransform),
];

static EDGE_OPERATIONS: [OperationDescriptor; 13] = [
    op(OpName::Property, R::Edge, StreamTransform),
    op(OpName::Has, R::Edge, StreamTransform),
    op(OpName::OutV, R::Vertex, Factory),
    op(OpName::InV, R::Vertex, Factory),
    op(OpName::BothV, R::Vertex, Factory),
    op(OpName::OtherV, R::Vertex, Factory),
    op(OpName::Drop, R::Value, StreamTransform),
    op(OpName::Id, R::Value, StreamTransform),
    op(OpName::Label, R::Value, StreamTransform),
    op(OpName::Properties, R::Value, StreamTransform),
    op(OpName::ValueMap, R::Value, StreamTransform),
    op(OpName::Limit, R::Edge, StreamTransform),
    op(OpName::Count, R::Value, StreamTransform),
];

static VALUE_OPERATIONS: [OperationDescriptor; 2] = [
    op(OpName::Limit, R::Value, StreamTransform),
    op(OpName::Count, R::Value, StreamTransform),
];

pub fn operations(state: ResultType) -> &'static [OperationDescriptor] {
    match state {
        ResultType::Graph => &GRAPH_OPERATIONS,
        ResultType::Vertex => &VERTEX_OPERATIONS,
        ResultType::Edge => &EDGE_OPERATIONS,
        ResultType::Value => &VALUE_OPERATIONS,
    }
}

pub fn resolve(state: ResultType, name: OpName) -> Result<&'static OperationDescriptor> {
    operations(state)
        .iter()
        .find(|descriptor| descriptor.name == name)
        .ok_or_else(|| {
            KvGraphError::precondition(
                ErrorCode::ChainOperationNotAllowed,
                format!("'{name}' is not allowed after a {state} step"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for op in OpName::ALL {
            assert_eq!(op.as_str().parse::<OpName>().expect("known op"), op);
        }
        assert!("both".parse::<OpName>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for op in OpName::ALL {
            let encoded = serde_json::to_string(&op).expect("encode");
            assert_eq!(encoded, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn test_vertex_and_edge_navigation_are_disjoint() {
        assert!(resolve(ResultType::Vertex, OpName::Out).is_ok());
        assert!(resolve(ResultType::Edge, OpName::Out).is_err());
        assert!(resolve(ResultType::Edge, OpName::OtherV).is_ok());
        assert!(resolve(ResultType::Vertex, OpName::OutV).is_err());
    }

    #[test]
    fn test_value_state_only_allows_limit_and_count() {
        let names: Vec<OpName> = operations(ResultType::Value)
            .iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec![OpName::Limit, OpName::Count]);
    }
}
