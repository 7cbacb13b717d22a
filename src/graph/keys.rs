//! Key naming for vertex and edge records.
//!
//! ```text
//! node.<id>                         existence marker (value: id)
//! node.<id>.label                   label
//! node.<id>.label.<label>           reverse label index
//! node.<id>.property.<key>          JSON property value
//! node.<id>.outE[.<L>].<edge>       edge-id markers (also inE)
//! node.<id>.outV[.<L>].<vertex>     neighbor markers (also inV)
//! node.<id>.outE[.<L>].__index      compact JSON arrays (also inE/outV/inV)
//! nodes.<id>                        enumeration marker, written last
//! edge.<id> / edge.<id>.label / edge.<id>.incoming / edge.<id>.outgoing
//! edges.<id>
//! ```

pub const INDEX_TOKEN: &str = "__index";
pub const LABEL_KEY: &str = "label";
pub const ID_KEY: &str = "id";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Vertex,
    Edge,
}

impl ElementKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ElementKind::Vertex => "node",
            ElementKind::Edge => "edge",
        }
    }

    pub fn enumeration_prefix(self) -> &'static str {
        match self {
            ElementKind::Vertex => "nodes",
            ElementKind::Edge => "edges",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Out,
    In,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Adjacent {
    Edges,
    Vertices,
}

pub fn element(kind: ElementKind, id: &str) -> String {
    format!("{}.{id}", kind.prefix())
}

pub fn enumeration(kind: ElementKind, id: &str) -> String {
    format!("{}.{id}", kind.enumeration_prefix())
}

pub fn enumeration_pattern(kind: ElementKind) -> String {
    format!("{}.*", kind.enumeration_prefix())
}

/// Every key nested under the element (`node.<id>.>`), not the marker itself.
pub fn element_children(kind: ElementKind, id: &str) -> String {
    format!("{}.{id}.>", kind.prefix())
}

pub fn label(kind: ElementKind, id: &str) -> String {
    format!("{}.{id}.{LABEL_KEY}", kind.prefix())
}

pub fn vertex_label_index(id: &str, label: &str) -> String {
    format!("node.{id}.{LABEL_KEY}.{label}")
}

pub fn vertex_label_scan(label: &str) -> String {
    format!("node.*.{LABEL_KEY}.{label}")
}

pub fn property(kind: ElementKind, id: &str, key: &str) -> String {
    format!("{}.{id}.property.{key}", kind.prefix())
}

pub fn property_pattern(kind: ElementKind, id: &str) -> String {
    format!("{}.{id}.property.*", kind.prefix())
}

pub fn edge_from(id: &str) -> String {
    format!("edge.{id}.incoming")
}

pub fn edge_to(id: &str) -> String {
    format!("edge.{id}.outgoing")
}

pub fn adjacency_segment(direction: Direction, adjacent: Adjacent) -> &'static str {
    match (direction, adjacent) {
        (Direction::Out, Adjacent::Edges) => "outE",
        (Direction::In, Adjacent::Edges) => "inE",
        (Direction::Out, Adjacent::Vertices) => "outV",
        (Direction::In, Adjacent::Vertices) => "inV",
    }
}

fn adjacency_base(vertex: &str, direction: Direction, adjacent: Adjacent, label: Option<&str>) -> String {
    let segment = adjacency_segment(direction, adjacent);
    match label {
        Some(label) => format!("node.{vertex}.{segment}.{label}"),
        None => format!("node.{vertex}.{segment}"),
    }
}

pub fn adjacency_marker(
    vertex: &str,
    direction: Direction,
    adjacent: Adjacent,
    label: Option<&str>,
    target: &str,
) -> String {
    format!("{}.{target}", adjacency_base(vertex, direction, adjacent, label))
}

pub fn adjacency_index(
    vertex: &str,
    direction: Direction,
    adjacent: Adjacent,
    label: Option<&str>,
) -> String {
    format!("{}.{INDEX_TOKEN}", adjacency_base(vertex, direction, adjacent, label))
}

pub fn adjacency_pattern(
    vertex: &str,
    direction: Direction,
    adjacent: Adjacent,
    label: Option<&str>,
) -> String {
    format!("{}.*", adjacency_base(vertex, direction, adjacent, label))
}

/// Labeled markers for every label: `node.<v>.<segment>.*.*`.
pub fn labeled_adjacency_pattern(vertex: &str, direction: Direction, adjacent: Adjacent) -> String {
    format!("node.{vertex}.{}.*.*", adjacency_segment(direction, adjacent))
}

pub fn last_token(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

pub fn token(key: &str, idx: usize) -> Option<&str> {
    key.split('.').nth(idx)
}
