//! Kernel Op IR and Interpreter
//!
//! A kernel is a straight-line sequence of checked-runtime primitive
//! invocations over named local bindings. The same sequence feeds two
//! consumers: the interpreter here (direct execution, primitive by
//! primitive) and the lifter (which turns it into a guarded dataflow
//! graph). Differential agreement between the two is the property the
//! harness checks.
//!
//! Binding rules: an op's `dst` (re)binds a local, shadowing any prior
//! value; `Copy` duplicates a binding (the lifter aliases through it);
//! execution stops at the first `Ret`. Reading a never-bound local yields
//! `Invalid`, matching the graph evaluator's behavior for an unresolved
//! node id.

use crate::checked;
use glift_core::{Env, ErrKind, Eval, Heap};
use std::collections::HashMap;

/// One checked-runtime primitive invocation, in source order.
///
/// Operand evaluation is strict and left-to-right as listed, so error
/// propagation order is fixed by the op sequence itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Bind an environment input.
    Input { dst: &'static str, name: &'static str },
    /// Bind an integer constant.
    ConstInt { dst: &'static str, value: i64 },
    /// Bind the null constant.
    ConstNull { dst: &'static str },
    /// Boolean non-null test (see the `guard_nonnull` asymmetry note).
    GuardNonNull { dst: &'static str, src: &'static str },
    /// Bit-identical word comparison.
    GuardEq { dst: &'static str, a: &'static str, b: &'static str },
    /// Strict two-way branch; both arms are already evaluated bindings.
    Select {
        dst: &'static str,
        cond: &'static str,
        then_v: &'static str,
        else_v: &'static str,
    },
    /// Wrapping integer addition.
    Add { dst: &'static str, a: &'static str, b: &'static str },
    /// Dereference the `FIELD_DEREF` slot.
    LoadPtr { dst: &'static str, src: &'static str },
    /// Dereference `FIELD_DEREF`, requiring an integer result.
    LoadInt { dst: &'static str, src: &'static str },
    /// Read an explicit field slot.
    GetField { dst: &'static str, src: &'static str, field: usize },
    /// Read an explicit field slot, requiring an integer result.
    GetFieldInt { dst: &'static str, src: &'static str, field: usize },
    /// Duplicate a binding. The lifter resolves this as an alias.
    Copy { dst: &'static str, src: &'static str },
    /// Return a binding's value; execution stops here.
    Ret { src: &'static str },
}

/// A kernel program plus the driver metadata the harness needs: which
/// fields the randomizer should populate and which inputs are live.
#[derive(Debug, Clone)]
pub struct Kernel {
    pub name: &'static str,
    pub ops: Vec<Op>,
    /// Field indices the heap randomizer populates for this kernel.
    pub fields: Vec<usize>,
    pub use_p: bool,
    pub use_q: bool,
}

fn local(locals: &HashMap<&str, Eval>, name: &str) -> Eval {
    locals.get(name).copied().unwrap_or(Err(ErrKind::Invalid))
}

impl Kernel {
    /// Execute the kernel directly through the checked runtime.
    pub fn run(&self, heap: &Heap, env: &Env) -> Eval {
        let mut locals: HashMap<&str, Eval> = HashMap::new();
        for op in &self.ops {
            match *op {
                Op::Input { dst, name } => {
                    locals.insert(dst, checked::input_from(env, name));
                }
                Op::ConstInt { dst, value } => {
                    locals.insert(dst, checked::const_int(value));
                }
                Op::ConstNull { dst } => {
                    locals.insert(dst, checked::const_null());
                }
                Op::GuardNonNull { dst, src } => {
                    let v = local(&locals, src);
                    locals.insert(dst, checked::guard_nonnull(v));
                }
                Op::GuardEq { dst, a, b } => {
                    let a = local(&locals, a);
                    let b = local(&locals, b);
                    locals.insert(dst, checked::guard_eq(a, b));
                }
                Op::Select { dst, cond, then_v, else_v } => {
                    let cond = local(&locals, cond);
                    let t = local(&locals, then_v);
                    let e = local(&locals, else_v);
                    locals.insert(dst, checked::select(cond, t, e));
                }
                Op::Add { dst, a, b } => {
                    let a = local(&locals, a);
                    let b = local(&locals, b);
                    locals.insert(dst, checked::add(a, b));
                }
                Op::LoadPtr { dst, src } => {
                    let v = local(&locals, src);
                    locals.insert(dst, checked::load_ptr(heap, v));
                }
                Op::LoadInt { dst, src } => {
                    let v = local(&locals, src);
                    locals.insert(dst, checked::load_int(heap, v));
                }
                Op::GetField { dst, src, field } => {
                    let v = local(&locals, src);
                    locals.insert(dst, checked::getfield(heap, v, field));
                }
                Op::GetFieldInt { dst, src, field } => {
                    let v = local(&locals, src);
                    locals.insert(dst, checked::getfield_int(heap, v, field));
                }
                Op::Copy { dst, src } => {
                    let v = local(&locals, src);
                    locals.insert(dst, v);
                }
                Op::Ret { src } => {
                    return local(&locals, src);
                }
            }
        }
        Err(ErrKind::Invalid)
    }
}
