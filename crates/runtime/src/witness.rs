//! Witness Records
//!
//! A witness captures one trial — the environment, the synthesized heap,
//! and both evaluation results — as a flat JSON file, enough to reproduce
//! the trial by hand. Heap objects serialize their present fields as a
//! map from the decimal string of the field index to the raw tagged word;
//! absent fields are not written. `BTreeMap` keeps key order
//! deterministic, so identical trials produce identical bytes.

use glift_core::{Env, Eval, Heap, MAX_FIELDS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

/// An `Eval` on the wire: `ok` is 1/0, `err` the error code (0 when ok),
/// `value` the raw tagged word (0 when not ok).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalRecord {
    pub ok: u8,
    pub err: u8,
    pub value: i64,
}

impl From<Eval> for EvalRecord {
    fn from(eval: Eval) -> Self {
        match eval {
            Ok(v) => EvalRecord { ok: 1, err: 0, value: v.raw() },
            Err(e) => EvalRecord { ok: 0, err: e.code(), value: 0 },
        }
    }
}

/// The two environment inputs as raw tagged words.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvRecord {
    pub p: i64,
    pub q: i64,
}

impl From<&Env> for EnvRecord {
    fn from(env: &Env) -> Self {
        EnvRecord { p: env.p.raw(), q: env.q.raw() }
    }
}

/// A heap snapshot: object count plus one field map per object in
/// address order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeapRecord {
    pub num_objs: usize,
    pub objs: Vec<BTreeMap<String, i64>>,
}

impl From<&Heap> for HeapRecord {
    fn from(heap: &Heap) -> Self {
        let objs = heap
            .objs()
            .map(|obj| {
                let mut fields = BTreeMap::new();
                for f in 0..MAX_FIELDS {
                    if let Some(v) = obj.field(f) {
                        fields.insert(f.to_string(), v.raw());
                    }
                }
                fields
            })
            .collect();
        HeapRecord { num_objs: heap.num_objs(), objs }
    }
}

/// One recorded trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    pub env: EnvRecord,
    pub heap: HeapRecord,
    pub kernel: EvalRecord,
    pub graph: EvalRecord,
}

impl Witness {
    pub fn new(env: &Env, heap: &Heap, kernel: Eval, graph: Eval) -> Witness {
        Witness {
            env: env.into(),
            heap: heap.into(),
            kernel: kernel.into(),
            graph: graph.into(),
        }
    }

    /// Write the witness as a one-shot flat file.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        let text = serde_json::to_string(self).map_err(io::Error::other)?;
        std::fs::write(path, text)
    }
}
