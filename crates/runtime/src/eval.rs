//! Graph Evaluator
//!
//! Depth-first, memoized evaluation of a loaded graph rooted at its
//! `output` node, under the checked-pointer semantics. Each node is
//! evaluated at most once per call: the `memo` array (indexed by node id)
//! caches results, and `seen` marks entered nodes. Memoization is
//! semantic, not an optimization — a subexpression shared through several
//! edges must yield exactly one observed result.
//!
//! Defensive contracts: a missing or non-positive output, an id outside
//! `[1, num_nodes]`, and an unknown node kind all evaluate to `Invalid`.
//! Re-entering a node mid-evaluation (a cycle, which well-formed graphs
//! never contain) reads the memo slot's initial `Invalid` instead of
//! diverging.

use crate::checked;
use crate::graph::{Graph, kind};
use glift_core::{Env, ErrKind, Eval, Heap};

/// Evaluate a graph against a heap and environment.
///
/// Allocates its own memo/seen scratch, released on return; repeated
/// calls with the same inputs are independent and deterministic.
pub fn graph_eval(graph: &Graph, heap: &Heap, env: &Env) -> Eval {
    if graph.output() <= 0 {
        return Err(ErrKind::Invalid);
    }
    let slots = graph.num_nodes() as usize + 1;
    let mut memo: Vec<Eval> = vec![Err(ErrKind::Invalid); slots];
    let mut seen = vec![false; slots];
    eval_node(graph, heap, env, graph.output(), &mut memo, &mut seen)
}

// Pointer-typed guard: identity on pointers and null, Type on integers.
// Only exists as a graph node (load preludes); the kernel primitive set
// has no counterpart.
fn guard_ptr_node(v: Eval) -> Eval {
    let v = v?;
    if v.is_int() {
        return Err(ErrKind::Type);
    }
    Ok(v)
}

// Pointer-valued non-null guard: identity on non-null pointers. Distinct
// from the boolean `is_nonnull` node that lifts the kernel primitive.
fn guard_nonnull_node(v: Eval) -> Eval {
    let v = v?;
    if v.is_int() {
        return Err(ErrKind::Type);
    }
    if v.is_null() {
        return Err(ErrKind::Null);
    }
    Ok(v)
}

fn eval_node(
    graph: &Graph,
    heap: &Heap,
    env: &Env,
    id: i64,
    memo: &mut [Eval],
    seen: &mut [bool],
) -> Eval {
    let Some(node) = graph.node(id) else {
        return Err(ErrKind::Invalid);
    };
    let idx = id as usize;
    if seen[idx] {
        return memo[idx];
    }
    seen[idx] = true;

    let result = match node.kind.as_str() {
        kind::INPUT => checked::input_from(env, node.name()),
        kind::CONST_INT => checked::const_int(node.value()),
        kind::CONST_NULL => checked::const_null(),
        kind::IS_NONNULL => {
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            checked::guard_nonnull(x)
        }
        kind::GUARD_PTR => {
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            guard_ptr_node(x)
        }
        kind::GUARD_NONNULL => {
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            guard_nonnull_node(x)
        }
        kind::GUARD_EQ => {
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            let y = eval_node(graph, heap, env, node.y(), memo, seen);
            checked::guard_eq(x, y)
        }
        kind::LOAD_PTR => {
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            checked::load_ptr(heap, x)
        }
        kind::LOAD_INT => {
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            checked::load_int(heap, x)
        }
        kind::GETFIELD => {
            let field = node.field();
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            checked::getfield(heap, x, field)
        }
        kind::GETFIELD_INT => {
            let field = node.field();
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            checked::getfield_int(heap, x, field)
        }
        kind::SELECT => {
            // All three operands evaluate, matching the kernel's strict
            // branches.
            let cond = eval_node(graph, heap, env, node.cond(), memo, seen);
            let t = eval_node(graph, heap, env, node.then_id(), memo, seen);
            let e = eval_node(graph, heap, env, node.else_id(), memo, seen);
            checked::select(cond, t, e)
        }
        kind::ADD => {
            let x = eval_node(graph, heap, env, node.x(), memo, seen);
            let y = eval_node(graph, heap, env, node.y(), memo, seen);
            checked::add(x, y)
        }
        _ => Err(ErrKind::Invalid),
    };

    memo[idx] = result;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use glift_core::{FIELD_DEREF, Value};

    fn eval_json(json: &str, heap: &Heap, env: &Env) -> Eval {
        let graph = Graph::from_json(json).unwrap();
        graph_eval(&graph, heap, env)
    }

    #[test]
    fn test_missing_output_is_invalid() {
        let heap = Heap::create(0);
        let env = Env::default();
        assert_eq!(
            eval_json(r#"{"nodes":[{"id":1,"kind":"const_null"}]}"#, &heap, &env),
            Err(ErrKind::Invalid)
        );
        assert_eq!(
            eval_json(r#"{"nodes":[{"id":1,"kind":"const_null"}],"output":0}"#, &heap, &env),
            Err(ErrKind::Invalid)
        );
    }

    #[test]
    fn test_out_of_range_ids_are_invalid() {
        let heap = Heap::create(0);
        let env = Env::default();
        assert_eq!(
            eval_json(r#"{"nodes":[{"id":1,"kind":"const_null"}],"output":5}"#, &heap, &env),
            Err(ErrKind::Invalid)
        );
        // Operand id 0 (an unresolved reference) is equally invalid.
        assert_eq!(
            eval_json(r#"{"nodes":[{"id":1,"kind":"guard_ptr"}],"output":1}"#, &heap, &env),
            Err(ErrKind::Invalid)
        );
    }

    #[test]
    fn test_unknown_kind_rejected_at_eval() {
        let heap = Heap::create(0);
        let env = Env::default();
        // Parses fine; evaluation rejects.
        assert_eq!(
            eval_json(r#"{"nodes":[{"id":1,"kind":"frobnicate"}],"output":1}"#, &heap, &env),
            Err(ErrKind::Invalid)
        );
    }

    #[test]
    fn test_cycle_defensive() {
        let heap = Heap::create(0);
        let env = Env::default();
        // Two guards referencing each other: terminates with Invalid.
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"guard_ptr","x":2},
                             {"id":2,"kind":"guard_ptr","x":1}],"output":1}"#,
                &heap,
                &env
            ),
            Err(ErrKind::Invalid)
        );
    }

    #[test]
    fn test_shared_subexpression_memoized() {
        // add(load, load) over the same load node: the load is one id
        // referenced twice, so it must produce a single observed value.
        let mut heap = Heap::create(1);
        heap.get_obj_mut(1).unwrap().set_field(FIELD_DEREF, Value::int(5));
        let env = Env::new(Value::ptr(1), Value::null());
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"input","name":"p"},
                             {"id":2,"kind":"load_ptr","x":1},
                             {"id":3,"kind":"add","x":2,"y":2}],"output":3}"#,
                &heap,
                &env
            ),
            Ok(Value::int(10))
        );
    }

    #[test]
    fn test_guard_node_semantics() {
        let heap = Heap::create(1);
        let env = Env::new(Value::null(), Value::int(3));
        // guard_ptr passes null through untouched.
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"input","name":"p"},
                             {"id":2,"kind":"guard_ptr","x":1}],"output":2}"#,
                &heap,
                &env
            ),
            Ok(Value::null())
        );
        // guard_nonnull rejects it.
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"input","name":"p"},
                             {"id":2,"kind":"guard_nonnull","x":1}],"output":2}"#,
                &heap,
                &env
            ),
            Err(ErrKind::Null)
        );
        // Both reject integers.
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"input","name":"q"},
                             {"id":2,"kind":"guard_ptr","x":1}],"output":2}"#,
                &heap,
                &env
            ),
            Err(ErrKind::Type)
        );
    }

    #[test]
    fn test_guard_nonnull_returns_pointer_not_boolean() {
        let heap = Heap::create(2);
        let env = Env::new(Value::ptr(2), Value::null());
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"input","name":"p"},
                             {"id":2,"kind":"guard_nonnull","x":1}],"output":2}"#,
                &heap,
                &env
            ),
            Ok(Value::ptr(2))
        );
        // The boolean form is a separate kind.
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"input","name":"p"},
                             {"id":2,"kind":"is_nonnull","x":1}],"output":2}"#,
                &heap,
                &env
            ),
            Ok(Value::int(1))
        );
    }

    #[test]
    fn test_select_strictness_surfaces_untaken_error() {
        // else branch loads through null; cond picks then. The kernel
        // side evaluates both branches, so the graph must agree — select
        // itself returns the taken branch, and the untaken error stays
        // contained in its own node result.
        let mut heap = Heap::create(1);
        heap.get_obj_mut(1).unwrap().set_field(FIELD_DEREF, Value::int(2));
        let env = Env::new(Value::ptr(1), Value::null());
        assert_eq!(
            eval_json(
                r#"{"nodes":[{"id":1,"kind":"input","name":"p"},
                             {"id":2,"kind":"input","name":"q"},
                             {"id":3,"kind":"const_int","value":1},
                             {"id":4,"kind":"load_ptr","x":1},
                             {"id":5,"kind":"load_ptr","x":2},
                             {"id":6,"kind":"select","cond":3,"then":4,"else":5}],
                    "output":6}"#,
                &heap,
                &env
            ),
            Ok(Value::int(2))
        );
    }

    #[test]
    fn test_determinism() {
        let mut heap = Heap::create(2);
        heap.get_obj_mut(1).unwrap().set_field(FIELD_DEREF, Value::ptr(2));
        heap.get_obj_mut(2).unwrap().set_field(FIELD_DEREF, Value::int(7));
        let env = Env::new(Value::ptr(1), Value::null());
        let graph = Graph::from_json(
            r#"{"nodes":[{"id":1,"kind":"input","name":"p"},
                         {"id":2,"kind":"load_ptr","x":1},
                         {"id":3,"kind":"load_ptr","x":2}],"output":3}"#,
        )
        .unwrap();
        let first = graph_eval(&graph, &heap, &env);
        for _ in 0..3 {
            assert_eq!(graph_eval(&graph, &heap, &env), first);
        }
        assert_eq!(first, Ok(Value::int(7)));
    }
}
