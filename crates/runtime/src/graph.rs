//! Serialized Graph Model
//!
//! A persisted graph is a JSON object with `function` (informational),
//! `nodes`, `edges` (informational; evaluation reconstructs dependencies
//! from node attributes), and `output`. Nodes keep their `kind` as a plain
//! string so that a file with an unknown kind still parses; the evaluator
//! is the one to reject it. Unknown keys at any level are skipped
//! silently, and absent numeric attributes read as 0.
//!
//! Loading indexes nodes into a dense 1-based arena sized by the largest
//! id: shared subgraphs are expressed as multiple edges into one integer
//! id, and the evaluator's memo array is indexed the same way.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Node kind strings as they appear on the wire.
pub mod kind {
    pub const INPUT: &str = "input";
    pub const CONST_INT: &str = "const_int";
    pub const CONST_NULL: &str = "const_null";
    pub const IS_NONNULL: &str = "is_nonnull";
    pub const GUARD_PTR: &str = "guard_ptr";
    pub const GUARD_NONNULL: &str = "guard_nonnull";
    pub const GUARD_EQ: &str = "guard_eq";
    pub const LOAD_PTR: &str = "load_ptr";
    pub const LOAD_INT: &str = "load_int";
    pub const GETFIELD: &str = "getfield";
    pub const GETFIELD_INT: &str = "getfield_int";
    pub const SELECT: &str = "select";
    pub const ADD: &str = "add";
}

/// One dataflow node as persisted. Optional attributes serialize only
/// when set; readers treat absence as 0 (or the empty name).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond: Option<i64>,
    #[serde(default, rename = "then", skip_serializing_if = "Option::is_none")]
    pub then_id: Option<i64>,
    #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_id: Option<i64>,
}

impl Node {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn x(&self) -> i64 {
        self.x.unwrap_or(0)
    }

    pub fn y(&self) -> i64 {
        self.y.unwrap_or(0)
    }

    /// The field slot index. Negative values are folded to an
    /// out-of-range index, which loads report as `MissingField`.
    pub fn field(&self) -> usize {
        usize::try_from(self.field.unwrap_or(0)).unwrap_or(usize::MAX)
    }

    pub fn value(&self) -> i64 {
        self.value.unwrap_or(0)
    }

    pub fn cond(&self) -> i64 {
        self.cond.unwrap_or(0)
    }

    pub fn then_id(&self) -> i64 {
        self.then_id.unwrap_or(0)
    }

    pub fn else_id(&self) -> i64 {
        self.else_id.unwrap_or(0)
    }
}

/// The on-disk graph shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFile {
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// `[from, to]` pairs. Written by the lifter for human consumption;
    /// readers ignore them.
    #[serde(default)]
    pub edges: Vec<[i64; 2]>,
    #[serde(default)]
    pub output: i64,
}

/// Errors loading a persisted graph.
#[derive(Debug)]
pub enum GraphLoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for GraphLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphLoadError::Io(e) => write!(f, "graph file error: {}", e),
            GraphLoadError::Json(e) => write!(f, "graph parse error: {}", e),
        }
    }
}

impl std::error::Error for GraphLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphLoadError::Io(e) => Some(e),
            GraphLoadError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for GraphLoadError {
    fn from(e: std::io::Error) -> Self {
        GraphLoadError::Io(e)
    }
}

impl From<serde_json::Error> for GraphLoadError {
    fn from(e: serde_json::Error) -> Self {
        GraphLoadError::Json(e)
    }
}

/// A loaded graph: nodes indexed densely by id, plus the output id.
#[derive(Debug, Clone)]
pub struct Graph {
    function: String,
    /// Dense arena, index = node id. Index 0 is an unused default node.
    nodes: Vec<Node>,
    output: i64,
}

impl Graph {
    /// Index a parsed file into the dense arena. Ids below 1 are dropped;
    /// a duplicated id keeps its last occurrence.
    pub fn from_file(file: GraphFile) -> Graph {
        let max_id = file.nodes.iter().map(|n| n.id).filter(|&id| id >= 1).max().unwrap_or(0);
        let mut nodes = vec![Node::default(); max_id as usize + 1];
        for node in file.nodes {
            if node.id >= 1 {
                let idx = node.id as usize;
                nodes[idx] = node;
            }
        }
        Graph {
            function: file.function,
            nodes,
            output: file.output,
        }
    }

    /// Parse and index a graph from JSON text.
    pub fn from_json(text: &str) -> Result<Graph, GraphLoadError> {
        let file: GraphFile = serde_json::from_str(text)?;
        Ok(Graph::from_file(file))
    }

    /// Load and index a graph from a file.
    pub fn load(path: &Path) -> Result<Graph, GraphLoadError> {
        let text = std::fs::read_to_string(path)?;
        Graph::from_json(&text)
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// The largest node id (the arena's upper bound).
    pub fn num_nodes(&self) -> i64 {
        self.nodes.len() as i64 - 1
    }

    /// The node at `id`, for ids in `[1, num_nodes]`.
    pub fn node(&self, id: i64) -> Option<&Node> {
        if id < 1 || id >= self.nodes.len() as i64 {
            return None;
        }
        Some(&self.nodes[id as usize])
    }

    pub fn output(&self) -> i64 {
        self.output
    }
}
