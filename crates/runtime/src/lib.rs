//! glift runtime: checked-pointer primitives, the kernel op IR and its
//! interpreter, the serialized graph model, and the memoized graph
//! evaluator.
//!
//! The two execution paths — `Kernel::run` (primitive by primitive) and
//! `eval::graph_eval` (over a lifted graph) — share one semantics and
//! must agree bit-for-bit on every heap/environment pair; the harness in
//! the compiler crate checks exactly that.

pub mod checked;
pub mod eval;
pub mod graph;
pub mod heapgen;
pub mod kernel;
pub mod programs;
pub mod witness;

pub use eval::graph_eval;
pub use graph::{Graph, GraphFile, GraphLoadError, Node};
pub use kernel::{Kernel, Op};
pub use witness::{EnvRecord, EvalRecord, HeapRecord, Witness};

// Re-export the core value model so dependents need a single crate.
pub use glift_core::{Env, ErrKind, Eval, Heap, Obj, Value};
pub use glift_core::{FIELD_DEREF, FIELD_F, FIELD_G, MAX_FIELDS};
