//! glift core: the value model shared by the checked runtime, the graph
//! evaluator, and the lifter.
//!
//! Key design principles:
//! - `Value`: one signed machine word, discriminated by a low-bit tag
//!   (integer / pointer / null). Equality is bit-identity.
//! - `Eval`: every primitive and every graph node produces
//!   `Result<Value, ErrKind>`; errors are data, not panics.
//! - `Heap`/`Env`: read-only during evaluation. Slot absence is distinct
//!   from a slot holding null.

pub mod heap;
pub mod value;

pub use heap::{Env, FIELD_DEREF, FIELD_F, FIELD_G, Heap, MAX_FIELDS, Obj};
pub use value::{ErrKind, Eval, Value};
