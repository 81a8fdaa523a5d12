//! Checked-Pointer Primitives
//!
//! Every primitive consumes and produces `Eval`. The propagation rule is
//! uniform: the first non-ok operand, left-to-right in the signature, is
//! returned unchanged. Loads surface errors in a fixed priority:
//! upstream error, then `Type` (integer operand), `Null`, `Invalid`
//! (address out of range), `MissingField` (presence bit clear).
//!
//! `select` is strict: callers evaluate both branches before invoking it,
//! so an error in the untaken branch still surfaces through its own
//! propagation path. The lifter preserves this.

use glift_core::{Env, ErrKind, Eval, FIELD_DEREF, Heap, Value};

/// A named kernel input. The name is informational; the caller has already
/// resolved it against the environment.
pub fn input(_name: &str, tagged: Value) -> Eval {
    Ok(tagged)
}

/// Resolve and wrap an input in one step.
pub fn input_from(env: &Env, name: &str) -> Eval {
    input(name, env.lookup(name))
}

/// The integer constant `Int(value)`.
pub fn const_int(value: i64) -> Eval {
    Ok(Value::int(value))
}

/// The null constant.
pub fn const_null() -> Eval {
    Ok(Value::null())
}

/// Non-null test. Yields `Int(1)` for a non-null pointer, `Int(0)` for
/// null, and `Type` for an integer.
///
/// Note the asymmetry with the graph's `guard_nonnull` node: this
/// primitive returns a boolean, the node returns the pointer itself. The
/// lifter bridges the two by emitting an `is_nonnull` node here and
/// reserving pointer-valued guards for load preludes.
pub fn guard_nonnull(v: Eval) -> Eval {
    let v = v?;
    if v.is_int() {
        return Err(ErrKind::Type);
    }
    Ok(Value::int(if v.is_null() { 0 } else { 1 }))
}

/// Bit-identical comparison of two tagged words: `Int(1)` on match,
/// `Int(0)` otherwise.
pub fn guard_eq(a: Eval, b: Eval) -> Eval {
    let a = a?;
    let b = b?;
    Ok(Value::int(if a == b { 1 } else { 0 }))
}

/// Two-way branch on an already-evaluated pair. `cond` must be `Int(0|1)`
/// (any other shape is a `Type` error); the untaken branch's result is
/// simply dropped here, having been evaluated by the caller.
pub fn select(cond: Eval, then_v: Eval, else_v: Eval) -> Eval {
    let cond = cond?;
    if !cond.is_int() {
        return Err(ErrKind::Type);
    }
    if cond.int_value() != 0 { then_v } else { else_v }
}

/// Integer addition. Both operands must be integers; the sum wraps
/// silently in two's-complement.
pub fn add(a: Eval, b: Eval) -> Eval {
    let a = a?;
    let b = b?;
    if !a.is_int() || !b.is_int() {
        return Err(ErrKind::Type);
    }
    Ok(Value::int(a.int_value().wrapping_add(b.int_value())))
}

// Shared body of the four load forms. `require_int` adds the trailing
// type check `load_int`/`getfield_int` impose on the loaded word.
fn load_field(heap: &Heap, ptr: Eval, field: usize, require_int: bool) -> Eval {
    let ptr = ptr?;
    if ptr.is_int() {
        return Err(ErrKind::Type);
    }
    if ptr.is_null() {
        return Err(ErrKind::Null);
    }
    let obj = heap.get_obj(ptr.ptr_addr()).ok_or(ErrKind::Invalid)?;
    let value = obj.field(field).ok_or(ErrKind::MissingField)?;
    if require_int && !value.is_int() {
        return Err(ErrKind::Type);
    }
    Ok(value)
}

/// Dereference through the `FIELD_DEREF` slot.
pub fn load_ptr(heap: &Heap, ptr: Eval) -> Eval {
    load_field(heap, ptr, FIELD_DEREF, false)
}

/// As `load_ptr`, and additionally require the loaded word to be an
/// integer.
pub fn load_int(heap: &Heap, ptr: Eval) -> Eval {
    load_field(heap, ptr, FIELD_DEREF, true)
}

/// Read an explicit field slot.
pub fn getfield(heap: &Heap, ptr: Eval, field: usize) -> Eval {
    load_field(heap, ptr, field, false)
}

/// As `getfield`, requiring an integer result.
pub fn getfield_int(heap: &Heap, ptr: Eval, field: usize) -> Eval {
    load_field(heap, ptr, field, true)
}
