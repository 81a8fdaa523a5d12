//! Random Heap and Environment Synthesis
//!
//! Seeded generation of trial inputs. The distributions are tuned so that
//! pointer chains are common enough to exercise deep kernels but nulls,
//! dangling shapes, and integer collisions still show up: the deref slot
//! is a pointer 70% of the time (other slots 50%), a chosen pointer is
//! null 10% of the time, everything else is a small integer.

use glift_core::{Env, FIELD_DEREF, Heap, Value};
use rand::Rng;

/// Populate every listed field of every object with a random tagged
/// value. Presence bits for listed fields are always set; unlisted
/// fields stay absent.
pub fn heap_randomize<R: Rng>(heap: &mut Heap, fields: &[usize], rng: &mut R) {
    let num_objs = heap.num_objs() as i64;
    for addr in 1..=num_objs {
        for &field in fields {
            let make_ptr = if field == FIELD_DEREF {
                rng.gen_ratio(70, 100)
            } else {
                rng.gen_ratio(50, 100)
            };
            let value = if make_ptr {
                if rng.gen_ratio(10, 100) {
                    Value::null()
                } else {
                    Value::ptr(rng.gen_range(1..=num_objs))
                }
            } else {
                Value::int(rng.gen_range(0..=9))
            };
            // Addresses stay in range by construction.
            if let Some(obj) = heap.get_obj_mut(addr) {
                obj.set_field(field, value);
            }
        }
    }
}

/// Draw an environment. Live inputs are null 10% of the time, otherwise
/// a uniform valid pointer; dead inputs are pinned to null.
pub fn env_randomize<R: Rng>(num_objs: usize, use_p: bool, use_q: bool, rng: &mut R) -> Env {
    let mut draw = |live: bool| {
        if !live || rng.gen_ratio(10, 100) {
            Value::null()
        } else {
            Value::ptr(rng.gen_range(1..=num_objs as i64))
        }
    };
    let p = draw(use_p);
    let q = draw(use_q);
    Env::new(p, q)
}
