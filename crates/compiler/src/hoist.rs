//! Hoist Shape-Matcher
//!
//! Decides, from a kernel's serialized graph alone, whether a call to it
//! may be hoisted out of a loop with invariant arguments: the graph must
//! be a linear guarded chain — nothing but `input`, `guard_ptr`,
//! `guard_nonnull`, and `load_ptr` nodes, with at least one load. Such a
//! kernel is a pure function of its arguments and the (immutable) heap,
//! so one preheader evaluation stands in for every iteration.
//!
//! Verdicts are cached per function name; the first query reads
//! `<graph-dir>/<name>.json`, and unreadable or unparseable graphs are
//! remembered as non-qualifying.

use glift_runtime::graph::{GraphFile, kind};
use std::collections::HashMap;
use std::path::PathBuf;

/// True iff the graph is a pure deref chain with at least one load.
pub fn is_linear_guarded_chain(graph: &GraphFile) -> bool {
    let mut has_load = false;
    for node in &graph.nodes {
        match node.kind.as_str() {
            kind::LOAD_PTR => has_load = true,
            kind::INPUT | kind::GUARD_PTR | kind::GUARD_NONNULL => {}
            _ => return false,
        }
    }
    has_load
}

/// Per-function-name cache over serialized graphs on disk.
#[derive(Debug)]
pub struct HoistCache {
    graph_dir: PathBuf,
    verdicts: HashMap<String, bool>,
}

impl HoistCache {
    pub fn new(graph_dir: impl Into<PathBuf>) -> HoistCache {
        HoistCache {
            graph_dir: graph_dir.into(),
            verdicts: HashMap::new(),
        }
    }

    /// Whether calls to `function` qualify for hoisting.
    pub fn qualifies(&mut self, function: &str) -> bool {
        if let Some(&verdict) = self.verdicts.get(function) {
            return verdict;
        }
        let path = self.graph_dir.join(format!("{}.json", function));
        let verdict = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str::<GraphFile>(&text).ok())
            .map(|graph| is_linear_guarded_chain(&graph))
            .unwrap_or(false);
        self.verdicts.insert(function.to_string(), verdict);
        verdict
    }
}
