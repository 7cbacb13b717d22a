use rand::{Rng, SeedableRng, rngs::StdRng};
use serde_json::json;

use crate::{Graph, errors::Result};

pub const VERTEX_LABELS: [&str; 3] = ["person", "software", "place"];
pub const EDGE_LABELS: [&str; 2] = ["knows", "uses"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeSpec {
    pub from: usize,
    pub to: usize,
    pub label: String,
}

#[derive(Clone, Debug)]
pub struct GraphDataset {
    pub labels: Vec<String>,
    pub edges: Vec<EdgeSpec>,
}

impl GraphDataset {
    pub fn nodes(&self) -> usize {
        self.labels.len()
    }

    pub fn edges(&self) -> usize {
        self.edges.len()
    }

    pub fn label_count(&self, label: &str) -> usize {
        self.labels.iter().filter(|l| l.as_str() == label).count()
    }

    pub fn out_degree(&self, idx: usize) -> usize {
        self.edges.iter().filter(|edge| edge.from == idx).count()
    }

    pub fn hub_index(&self) -> usize {
        let mut best = (0usize, 0usize);
        for idx in 0..self.nodes() {
            let degree = self.out_degree(idx);
            if degree > best.0 {
                best = (degree, idx);
            }
        }
        best.1
    }
}

#[derive(Clone, Debug)]
pub enum GraphShape {
    Line,
    Star,
    Random { edges: usize },
}

pub fn generate_graph(shape: GraphShape, node_count: usize, seed: u64) -> GraphDataset {
    assert!(node_count > 1, "node_count must exceed 1");
    let mut rng = StdRng::seed_from_u64(seed);
    let labels = (0..node_count)
        .map(|_| VERTEX_LABELS[rng.gen_range(0..VERTEX_LABELS.len())].to_string())
        .collect();
    let edges = match shape {
        GraphShape::Line => (0..node_count - 1)
            .map(|idx| new_edge(idx, idx + 1, EDGE_LABELS[0]))
            .collect(),
        GraphShape::Star => (1..node_count)
            .map(|leaf| new_edge(0, leaf, EDGE_LABELS[0]))
            .collect(),
        GraphShape::Random { edges } => (0..edges)
            .map(|_| {
                let from = rng.gen_range(0..node_count);
                let mut to = rng.gen_range(0..node_count - 1);
                if to >= from {
                    to += 1;
                }
                let label = EDGE_LABELS[rng.gen_range(0..EDGE_LABELS.len())];
                new_edge(from, to, label)
            })
            .collect(),
    };
    GraphDataset { labels, edges }
}

pub fn load_dataset(graph: &Graph, dataset: &GraphDataset) -> Result<Vec<String>> {
    let records = graph.records();
    let mut ids = Vec::with_capacity(dataset.nodes());
    for (idx, label) in dataset.labels.iter().enumerate() {
        let id = records.create_vertex(label)?;
        records.set_property(
            crate::ElementKind::Vertex,
            &id,
            "idx",
            &json!(idx),
        )?;
        ids.push(id);
    }
    for edge in &dataset.edges {
        records.create_edge(&edge.label, &ids[edge.from], &ids[edge.to])?;
    }
    Ok(ids)
}

fn new_edge(from: usize, to: usize, label: &str) -> EdgeSpec {
    EdgeSpec {
        from,
        to,
        label: label.to_string(),
    }
}
