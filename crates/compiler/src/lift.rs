//! Graph Lifter
//!
//! Walks a kernel's op sequence in source order and emits an equivalent
//! guarded dataflow graph: every checked-runtime invocation becomes one
//! node, with two translation rules that carry the real weight.
//!
//! First, inputs are deduplicated — a name used twice resolves to one
//! shared `input` node, so the graph observes each environment read once.
//! Second, every load gets a fresh `guard_ptr` -> `guard_nonnull` prelude
//! in front of it; preludes are never shared between loads, so each
//! invariant is checked exactly where the kernel checks it.
//!
//! Local bindings resolve through a name -> node-id map. A `Copy`
//! installs the source's already-resolved id, so chains of copies
//! collapse transitively to the defining node, and rebinding a name
//! overrides only that name. Operands that never resolve map to id 0,
//! which the evaluator rejects as invalid.

use glift_runtime::graph::{GraphFile, Node, kind};
use glift_runtime::kernel::{Kernel, Op};
use std::collections::HashMap;

/// Accumulates nodes under monotonically assigned ids.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    input_nodes: HashMap<String, i64>,
}

impl GraphBuilder {
    pub fn new() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Assign the next id to `node` and keep it. Ids start at 1.
    pub fn add_node(&mut self, mut node: Node) -> i64 {
        let id = self.nodes.len() as i64 + 1;
        node.id = id;
        self.nodes.push(node);
        id
    }

    /// The shared `input` node for `name`, creating it on first use.
    pub fn get_or_add_input(&mut self, name: &str) -> i64 {
        if let Some(&id) = self.input_nodes.get(name) {
            return id;
        }
        let id = self.add_node(Node {
            kind: kind::INPUT.into(),
            name: Some(name.to_string()),
            ..Node::default()
        });
        self.input_nodes.insert(name.to_string(), id);
        id
    }

    /// Fresh load prelude: `guard_ptr` on the operand, `guard_nonnull`
    /// on the guard. Returns the id the load should consume.
    fn add_guarded_ptr(&mut self, ptr_id: i64) -> i64 {
        let guard_ptr = self.add_node(Node {
            kind: kind::GUARD_PTR.into(),
            x: arg(ptr_id),
            ..Node::default()
        });
        self.add_node(Node {
            kind: kind::GUARD_NONNULL.into(),
            x: arg(guard_ptr),
            ..Node::default()
        })
    }
}

// Operand attributes are written only when they refer to a real node;
// id 0 stays absent and reads back as 0.
fn arg(id: i64) -> Option<i64> {
    if id != 0 { Some(id) } else { None }
}

fn field_attr(field: usize) -> Option<i64> {
    if field != 0 { Some(field as i64) } else { None }
}

/// Lift a kernel into its serialized graph form.
pub fn lift(kernel: &Kernel) -> GraphFile {
    let mut builder = GraphBuilder::new();
    let mut bindings: HashMap<&str, i64> = HashMap::new();
    let mut output = 0;

    let resolve = |bindings: &HashMap<&str, i64>, name: &str| -> i64 {
        bindings.get(name).copied().unwrap_or(0)
    };

    for op in &kernel.ops {
        match *op {
            Op::Input { dst, name } => {
                let id = builder.get_or_add_input(name);
                bindings.insert(dst, id);
            }
            Op::ConstInt { dst, value } => {
                // const_int always carries its value, zero included.
                let id = builder.add_node(Node {
                    kind: kind::CONST_INT.into(),
                    value: Some(value),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::ConstNull { dst } => {
                let id = builder.add_node(Node {
                    kind: kind::CONST_NULL.into(),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::GuardNonNull { dst, src } => {
                // The boolean primitive lifts to is_nonnull; the
                // pointer-valued guard_nonnull kind is reserved for load
                // preludes.
                let x = resolve(&bindings, src);
                let id = builder.add_node(Node {
                    kind: kind::IS_NONNULL.into(),
                    x: arg(x),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::GuardEq { dst, a, b } => {
                let x = resolve(&bindings, a);
                let y = resolve(&bindings, b);
                let id = builder.add_node(Node {
                    kind: kind::GUARD_EQ.into(),
                    x: arg(x),
                    y: arg(y),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::Select { dst, cond, then_v, else_v } => {
                let cond = resolve(&bindings, cond);
                let then_id = resolve(&bindings, then_v);
                let else_id = resolve(&bindings, else_v);
                let id = builder.add_node(Node {
                    kind: kind::SELECT.into(),
                    cond: arg(cond),
                    then_id: arg(then_id),
                    else_id: arg(else_id),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::Add { dst, a, b } => {
                let x = resolve(&bindings, a);
                let y = resolve(&bindings, b);
                let id = builder.add_node(Node {
                    kind: kind::ADD.into(),
                    x: arg(x),
                    y: arg(y),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::LoadPtr { dst, src } => {
                let guarded = builder.add_guarded_ptr(resolve(&bindings, src));
                let id = builder.add_node(Node {
                    kind: kind::LOAD_PTR.into(),
                    x: arg(guarded),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::LoadInt { dst, src } => {
                let guarded = builder.add_guarded_ptr(resolve(&bindings, src));
                let id = builder.add_node(Node {
                    kind: kind::LOAD_INT.into(),
                    x: arg(guarded),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::GetField { dst, src, field } => {
                let guarded = builder.add_guarded_ptr(resolve(&bindings, src));
                let id = builder.add_node(Node {
                    kind: kind::GETFIELD.into(),
                    x: arg(guarded),
                    field: field_attr(field),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::GetFieldInt { dst, src, field } => {
                let guarded = builder.add_guarded_ptr(resolve(&bindings, src));
                let id = builder.add_node(Node {
                    kind: kind::GETFIELD_INT.into(),
                    x: arg(guarded),
                    field: field_attr(field),
                    ..Node::default()
                });
                bindings.insert(dst, id);
            }
            Op::Copy { dst, src } => {
                // Alias: the copy maps to the source's defining node.
                let id = resolve(&bindings, src);
                bindings.insert(dst, id);
            }
            Op::Ret { src } => {
                output = resolve(&bindings, src);
                break;
            }
        }
    }

    let edges = collect_edges(&builder.nodes);
    GraphFile {
        function: kernel.name.to_string(),
        nodes: builder.nodes,
        edges,
        output,
    }
}

// Informational `[from, to]` pairs reconstructed from node attributes,
// in node order.
fn collect_edges(nodes: &[Node]) -> Vec<[i64; 2]> {
    let mut edges = Vec::new();
    for n in nodes {
        match n.kind.as_str() {
            kind::GUARD_PTR | kind::GUARD_NONNULL | kind::IS_NONNULL => {
                edges.push([n.x(), n.id]);
            }
            kind::GUARD_EQ | kind::ADD => {
                edges.push([n.x(), n.id]);
                edges.push([n.y(), n.id]);
            }
            kind::LOAD_PTR | kind::LOAD_INT | kind::GETFIELD | kind::GETFIELD_INT => {
                edges.push([n.x(), n.id]);
            }
            kind::SELECT => {
                edges.push([n.cond(), n.id]);
                edges.push([n.then_id(), n.id]);
                edges.push([n.else_id(), n.id]);
            }
            _ => {}
        }
    }
    edges
}
