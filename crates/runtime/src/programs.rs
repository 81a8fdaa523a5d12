//! Kernel Programs
//!
//! The fixed set of pointer-chasing kernels the harness differentially
//! tests. Each is a straight-line op sequence over the checked primitives;
//! the attached metadata tells the randomizer which fields to populate and
//! which environment inputs are live.

use crate::kernel::{Kernel, Op};
use glift_core::{FIELD_DEREF, FIELD_F, FIELD_G};

/// Three dereference hops from `p`.
pub fn triple_deref() -> Kernel {
    Kernel {
        name: "triple_deref",
        ops: vec![
            Op::Input { dst: "vp", name: "p" },
            Op::LoadPtr { dst: "v1", src: "vp" },
            Op::LoadPtr { dst: "v2", src: "v1" },
            Op::LoadPtr { dst: "v3", src: "v2" },
            Op::Ret { src: "v3" },
        ],
        fields: vec![FIELD_DEREF],
        use_p: true,
        use_q: false,
    }
}

/// `p.f.g` through the named field slots.
pub fn field_chain() -> Kernel {
    Kernel {
        name: "field_chain",
        ops: vec![
            Op::Input { dst: "vp", name: "p" },
            Op::GetField { dst: "v1", src: "vp", field: FIELD_F },
            Op::GetField { dst: "v2", src: "v1", field: FIELD_G },
            Op::Ret { src: "v2" },
        ],
        fields: vec![FIELD_F, FIELD_G, FIELD_DEREF],
        use_p: true,
        use_q: false,
    }
}

/// Double deref of `p` behind a non-null check, defaulting to 0.
///
/// Both branches are evaluated before the select; that strictness is part
/// of the semantics under test.
pub fn guarded_chain() -> Kernel {
    Kernel {
        name: "guarded_chain",
        ops: vec![
            Op::Input { dst: "vp", name: "p" },
            Op::GuardNonNull { dst: "cond", src: "vp" },
            Op::LoadPtr { dst: "inner", src: "vp" },
            Op::LoadPtr { dst: "then_v", src: "inner" },
            Op::ConstInt { dst: "else_v", value: 0 },
            Op::Select { dst: "out", cond: "cond", then_v: "then_v", else_v: "else_v" },
            Op::Ret { src: "out" },
        ],
        fields: vec![FIELD_DEREF],
        use_p: true,
        use_q: false,
    }
}

/// Load through `p` or `q` depending on whether they alias.
pub fn alias_branch() -> Kernel {
    Kernel {
        name: "alias_branch",
        ops: vec![
            Op::Input { dst: "vp", name: "p" },
            Op::Input { dst: "vq", name: "q" },
            Op::GuardEq { dst: "cond", a: "vp", b: "vq" },
            Op::LoadPtr { dst: "then_v", src: "vp" },
            Op::LoadPtr { dst: "else_v", src: "vq" },
            Op::Select { dst: "out", cond: "cond", then_v: "then_v", else_v: "else_v" },
            Op::Ret { src: "out" },
        ],
        fields: vec![FIELD_DEREF],
        use_p: true,
        use_q: true,
    }
}

/// `p.f` guarded, then `.g` of the result, defaulting to 0.
pub fn mixed_fields() -> Kernel {
    Kernel {
        name: "mixed_fields",
        ops: vec![
            Op::Input { dst: "vp", name: "p" },
            Op::GetField { dst: "pf", src: "vp", field: FIELD_F },
            Op::GuardNonNull { dst: "cond", src: "pf" },
            Op::GetField { dst: "then_v", src: "pf", field: FIELD_G },
            Op::ConstInt { dst: "else_v", value: 0 },
            Op::Select { dst: "out", cond: "cond", then_v: "then_v", else_v: "else_v" },
            Op::Ret { src: "out" },
        ],
        fields: vec![FIELD_F, FIELD_G, FIELD_DEREF],
        use_p: true,
        use_q: false,
    }
}

/// Sum of the values behind `p` and `q`.
pub fn add_two() -> Kernel {
    Kernel {
        name: "add_two",
        ops: vec![
            Op::Input { dst: "vp", name: "p" },
            Op::Input { dst: "vq", name: "q" },
            Op::LoadPtr { dst: "lp", src: "vp" },
            Op::LoadPtr { dst: "lq", src: "vq" },
            Op::Add { dst: "out", a: "lp", b: "lq" },
            Op::Ret { src: "out" },
        ],
        fields: vec![FIELD_DEREF],
        use_p: true,
        use_q: true,
    }
}

/// Five dereference hops from `p`: the microbenchmark chain kernel.
pub fn graph_walk() -> Kernel {
    Kernel {
        name: "graph_walk",
        ops: vec![
            Op::Input { dst: "vp", name: "p" },
            Op::LoadPtr { dst: "v1", src: "vp" },
            Op::LoadPtr { dst: "v2", src: "v1" },
            Op::LoadPtr { dst: "v3", src: "v2" },
            Op::LoadPtr { dst: "v4", src: "v3" },
            Op::LoadPtr { dst: "v5", src: "v4" },
            Op::Ret { src: "v5" },
        ],
        fields: vec![FIELD_DEREF],
        use_p: true,
        use_q: false,
    }
}

/// Every kernel the driver tests, in a stable order.
pub fn all() -> Vec<Kernel> {
    vec![
        triple_deref(),
        field_chain(),
        guarded_chain(),
        alias_branch(),
        mixed_fields(),
        add_two(),
        graph_walk(),
    ]
}

/// Look up a kernel by name.
pub fn find(name: &str) -> Option<Kernel> {
    all().into_iter().find(|k| k.name == name)
}
