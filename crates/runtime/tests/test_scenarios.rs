//! End-to-end scenarios over the kernel interpreter and the graph
//! evaluator, pinned to literal tagged words.
//!
//! Each graph here is the guarded lift of its kernel, written out by
//! hand: one deduplicated input per name, a fresh
//! guard_ptr -> guard_nonnull prelude before every load, is_nonnull for
//! the boolean guard. Kernel and graph must agree on the full result.

use glift_runtime::graph::Graph;
use glift_runtime::{Env, ErrKind, Eval, Heap, Value, graph_eval, programs};
use glift_runtime::{FIELD_DEREF, FIELD_F, FIELD_G};

const TRIPLE_DEREF_GRAPH: &str = r#"{
  "function": "triple_deref",
  "nodes": [
    {"id":1,"kind":"input","name":"p"},
    {"id":2,"kind":"guard_ptr","x":1},
    {"id":3,"kind":"guard_nonnull","x":2},
    {"id":4,"kind":"load_ptr","x":3},
    {"id":5,"kind":"guard_ptr","x":4},
    {"id":6,"kind":"guard_nonnull","x":5},
    {"id":7,"kind":"load_ptr","x":6},
    {"id":8,"kind":"guard_ptr","x":7},
    {"id":9,"kind":"guard_nonnull","x":8},
    {"id":10,"kind":"load_ptr","x":9}
  ],
  "output": 10
}"#;

const GUARDED_CHAIN_GRAPH: &str = r#"{
  "function": "guarded_chain",
  "nodes": [
    {"id":1,"kind":"input","name":"p"},
    {"id":2,"kind":"is_nonnull","x":1},
    {"id":3,"kind":"guard_ptr","x":1},
    {"id":4,"kind":"guard_nonnull","x":3},
    {"id":5,"kind":"load_ptr","x":4},
    {"id":6,"kind":"guard_ptr","x":5},
    {"id":7,"kind":"guard_nonnull","x":6},
    {"id":8,"kind":"load_ptr","x":7},
    {"id":9,"kind":"const_int","value":0},
    {"id":10,"kind":"select","cond":2,"then":8,"else":9}
  ],
  "output": 10
}"#;

const ALIAS_BRANCH_GRAPH: &str = r#"{
  "function": "alias_branch",
  "nodes": [
    {"id":1,"kind":"input","name":"p"},
    {"id":2,"kind":"input","name":"q"},
    {"id":3,"kind":"guard_eq","x":1,"y":2},
    {"id":4,"kind":"guard_ptr","x":1},
    {"id":5,"kind":"guard_nonnull","x":4},
    {"id":6,"kind":"load_ptr","x":5},
    {"id":7,"kind":"guard_ptr","x":2},
    {"id":8,"kind":"guard_nonnull","x":7},
    {"id":9,"kind":"load_ptr","x":8},
    {"id":10,"kind":"select","cond":3,"then":6,"else":9}
  ],
  "output": 10
}"#;

const ADD_TWO_GRAPH: &str = r#"{
  "function": "add_two",
  "nodes": [
    {"id":1,"kind":"input","name":"p"},
    {"id":2,"kind":"input","name":"q"},
    {"id":3,"kind":"guard_ptr","x":1},
    {"id":4,"kind":"guard_nonnull","x":3},
    {"id":5,"kind":"load_ptr","x":4},
    {"id":6,"kind":"guard_ptr","x":2},
    {"id":7,"kind":"guard_nonnull","x":6},
    {"id":8,"kind":"load_ptr","x":7},
    {"id":9,"kind":"add","x":5,"y":8}
  ],
  "output": 9
}"#;

fn check_both(kernel_name: &str, graph_json: &str, heap: &Heap, env: &Env, expect: Eval) {
    let kernel = programs::find(kernel_name).unwrap();
    let graph = Graph::from_json(graph_json).unwrap();
    assert_eq!(kernel.run(heap, env), expect, "{} kernel", kernel_name);
    assert_eq!(graph_eval(&graph, heap, env), expect, "{} graph", kernel_name);
}

fn chain_heap() -> Heap {
    let mut heap = Heap::create(4);
    for k in 1..=3 {
        heap.get_obj_mut(k).unwrap().set_field(FIELD_DEREF, Value::ptr(k + 1));
    }
    heap.get_obj_mut(4).unwrap().set_field(FIELD_DEREF, Value::int(7));
    heap
}

#[test]
fn triple_deref_all_valid() {
    let heap = chain_heap();
    let env = Env::new(Value::ptr(1), Value::null());
    let expect = Ok(Value::int(7));
    assert_eq!(expect.unwrap().raw(), 15);
    check_both("triple_deref", TRIPLE_DEREF_GRAPH, &heap, &env, expect);
}

#[test]
fn triple_deref_second_hop_null() {
    let mut heap = chain_heap();
    heap.get_obj_mut(2).unwrap().set_field(FIELD_DEREF, Value::null());
    let env = Env::new(Value::ptr(1), Value::null());
    check_both("triple_deref", TRIPLE_DEREF_GRAPH, &heap, &env, Err(ErrKind::Null));
}

#[test]
fn guarded_chain_null_input() {
    let heap = Heap::create(2);
    let env = Env::new(Value::null(), Value::null());
    // is_nonnull yields Int(0); the select takes the constant arm even
    // though the strict then-branch errored with Null.
    let expect = Ok(Value::int(0));
    assert_eq!(expect.unwrap().raw(), 1);
    check_both("guarded_chain", GUARDED_CHAIN_GRAPH, &heap, &env, expect);
}

#[test]
fn alias_branch_same_pointer() {
    let mut heap = Heap::create(1);
    heap.get_obj_mut(1).unwrap().set_field(FIELD_DEREF, Value::int(5));
    let env = Env::new(Value::ptr(1), Value::ptr(1));
    let expect = Ok(Value::int(5));
    assert_eq!(expect.unwrap().raw(), 11);
    check_both("alias_branch", ALIAS_BRANCH_GRAPH, &heap, &env, expect);
}

#[test]
fn add_two_sums_loads() {
    let mut heap = Heap::create(2);
    heap.get_obj_mut(1).unwrap().set_field(FIELD_DEREF, Value::int(3));
    heap.get_obj_mut(2).unwrap().set_field(FIELD_DEREF, Value::int(4));
    let env = Env::new(Value::ptr(1), Value::ptr(2));
    let expect = Ok(Value::int(7));
    assert_eq!(expect.unwrap().raw(), 15);
    check_both("add_two", ADD_TWO_GRAPH, &heap, &env, expect);
}

#[test]
fn integer_input_is_a_type_error() {
    let heap = chain_heap();
    // Tagged word 5 is Int(2); every load path rejects it the same way.
    let env = Env::new(Value::from_raw(5), Value::null());
    check_both("triple_deref", TRIPLE_DEREF_GRAPH, &heap, &env, Err(ErrKind::Type));
}

#[test]
fn field_chain_reads_named_slots() {
    let mut heap = Heap::create(3);
    heap.get_obj_mut(1).unwrap().set_field(FIELD_F, Value::ptr(2));
    heap.get_obj_mut(2).unwrap().set_field(FIELD_G, Value::int(9));
    let env = Env::new(Value::ptr(1), Value::null());
    let kernel = programs::find("field_chain").unwrap();
    assert_eq!(kernel.run(&heap, &env), Ok(Value::int(9)));

    // Dropping the g slot distinguishes absence from null.
    let mut bare = Heap::create(3);
    bare.get_obj_mut(1).unwrap().set_field(FIELD_F, Value::ptr(2));
    assert_eq!(kernel.run(&bare, &env), Err(ErrKind::MissingField));
}
