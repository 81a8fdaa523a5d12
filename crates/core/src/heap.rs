//! Heap, Objects, and the Environment
//!
//! The heap is a flat, 1-indexed table of fixed-shape objects. Each object
//! carries `MAX_FIELDS` optional slots; a slot is either absent (presence
//! bit clear) or holds a tagged value, and absence is observable as a
//! distinct error from holding null. Objects are populated before a trial
//! and never mutated during evaluation.

use crate::value::Value;

/// Slot index for the plain dereference field (`load_ptr` / `load_int`).
pub const FIELD_DEREF: usize = 0;
/// Slot index for the named field `f`.
pub const FIELD_F: usize = 1;
/// Slot index for the named field `g`.
pub const FIELD_G: usize = 2;
/// Number of slots per object.
pub const MAX_FIELDS: usize = 3;

/// A fixed-size record of optional tagged slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Obj {
    present: [bool; MAX_FIELDS],
    values: [Value; MAX_FIELDS],
}

impl Obj {
    /// Read a slot. `None` when the index is out of range or the presence
    /// bit is clear; this is how `MissingField` arises upstream.
    pub fn field(&self, field: usize) -> Option<Value> {
        if field >= MAX_FIELDS || !self.present[field] {
            return None;
        }
        Some(self.values[field])
    }

    /// True iff the slot's presence bit is set.
    pub fn has_field(&self, field: usize) -> bool {
        field < MAX_FIELDS && self.present[field]
    }

    /// Store a value and set the presence bit. Out-of-range indices are
    /// ignored; only generators call this, and only before evaluation.
    pub fn set_field(&mut self, field: usize, value: Value) {
        if field < MAX_FIELDS {
            self.present[field] = true;
            self.values[field] = value;
        }
    }
}

/// A flat table of objects addressed by 1-based index.
#[derive(Debug, Clone)]
pub struct Heap {
    objs: Vec<Obj>,
}

impl Heap {
    /// Allocate `num_objs` objects with every presence bit clear,
    /// addressed `1..=num_objs`.
    pub fn create(num_objs: usize) -> Heap {
        Heap {
            objs: vec![Obj::default(); num_objs],
        }
    }

    /// Number of objects.
    pub fn num_objs(&self) -> usize {
        self.objs.len()
    }

    /// The object at `addr`, or `None` outside `[1, num_objs]`.
    pub fn get_obj(&self, addr: i64) -> Option<&Obj> {
        if addr <= 0 || addr as usize > self.objs.len() {
            return None;
        }
        Some(&self.objs[addr as usize - 1])
    }

    /// Mutable access for heap generators. Same addressing as `get_obj`.
    pub fn get_obj_mut(&mut self, addr: i64) -> Option<&mut Obj> {
        if addr <= 0 || addr as usize > self.objs.len() {
            return None;
        }
        Some(&mut self.objs[addr as usize - 1])
    }

    /// Iterate objects in address order (addresses `1..=num_objs`).
    pub fn objs(&self) -> impl Iterator<Item = &Obj> {
        self.objs.iter()
    }
}

/// The trial environment: the two symbolic kernel inputs.
///
/// Lookup is total; names other than `"p"` and `"q"` resolve to null.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Env {
    pub p: Value,
    pub q: Value,
}

impl Env {
    pub fn new(p: Value, q: Value) -> Env {
        Env { p, q }
    }

    /// Resolve a symbolic input name to its tagged value.
    pub fn lookup(&self, name: &str) -> Value {
        match name {
            "p" => self.p,
            "q" => self.q,
            _ => Value::null(),
        }
    }
}
