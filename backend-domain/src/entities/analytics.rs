// Derived, non-persisted report views

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Bucket start in epoch milliseconds.
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub label: String,
    pub data: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub interval_seconds: i64,
    pub series: Vec<NamedSeries>,
}

impl Timeline {
    pub fn series(&self, label: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|series| series.label == label)
    }

    /// Value of `label` at the bucket starting at `bucket_seconds`.
    pub fn value_at(&self, label: &str, bucket_seconds: i64) -> Option<i64> {
        let x = bucket_seconds * 1000;
        self.series(label)?
            .data
            .iter()
            .find(|point| point.x == x)
            .map(|point| point.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionClass {
    Squad,
    Other,
}

impl InteractionClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionClass::Squad => "squad",
            InteractionClass::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub faction: Option<String>,
    pub group: usize,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub value: i64,
    pub label: String,
    pub title: String,
    pub hidden: bool,
    pub physics: bool,
    pub interaction_type: InteractionClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub dashes: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl InteractionGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub scope: String,
    pub start: i64,
    pub end: i64,
    pub class_timeline: Timeline,
    pub vehicle_timeline: Timeline,
    pub interaction_timeline: Timeline,
    pub interaction_graph: InteractionGraph,
}
