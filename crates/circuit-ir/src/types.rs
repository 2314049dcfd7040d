//! The dataflow type lattice.
//!
//! Maps SQL column types onto the types the dataflow host composes streams
//! over. Every base variant carries a nullability bit; nullability is lifted
//! explicitly rather than folded into a separate `Option`-wrapper variant, so
//! that `Tuple`/`Struct`/`Stream` (which are never independently nullable,
//! per the invariants below) don't need a dead `nullable` field.
//!
//! [`Type::same`] is the structural-equality the design calls out explicitly:
//! it ignores [`Origin`] (the opaque back-reference to the front-end node
//! that produced a value, kept only for diagnostics). `PartialEq` is
//! implemented to mean exactly `same` -- there is no other equality a caller
//! should reach for.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque, nullable back-reference to the front-end node that produced an IR
/// value. Never interpreted by the core; carried only so diagnostics can
/// point back at user input.
pub type Origin = Option<u32>;

/// Bit width of a `SignedInt`. SQL's TINYINT/SMALLINT/INTEGER/BIGINT map onto
/// these four widths (see `sql2circuit`'s type compiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

/// A dataflow type: the element type of a stream, or a component of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Type {
    Bool {
        nullable: bool,
        origin: Origin,
    },
    SignedInt {
        width: IntWidth,
        nullable: bool,
        origin: Origin,
    },
    /// 32-bit IEEE float.
    Float {
        nullable: bool,
        origin: Origin,
    },
    /// 64-bit IEEE float.
    Double {
        nullable: bool,
        origin: Origin,
    },
    String {
        nullable: bool,
        origin: Origin,
    },
    /// Ordered list of element types. Never independently nullable -- an
    /// arity-1 tuple is semantically identical to its sole element when
    /// emitted (see `sql2circuit::emit`).
    Tuple {
        elements: Vec<Type>,
        origin: Origin,
    },
    /// Named, ordered list of (field name, type). Field names are unique.
    /// Never independently nullable.
    Struct {
        name: String,
        fields: IndexMap<String, Type>,
        origin: Origin,
    },
    /// The element type of a stream. Not independently nullable.
    Stream {
        element: Box<Type>,
        origin: Origin,
    },
    /// Generic reference used for opaque host types (the `Weight` type) and
    /// as the general form a `ZSet` specializes.
    User {
        name: String,
        args: Vec<Type>,
        nullable: bool,
        origin: Origin,
    },
}

/// Fixed name of the opaque weight type the dataflow host supplies.
/// `Weight = isize` in the host, but the IR treats it as opaque.
pub const WEIGHT_TYPE_NAME: &str = "Weight";

/// Fixed name `ZSet` specializes `User` under.
pub const ZSET_TYPE_NAME: &str = "ZSet";

impl Type {
    /// The opaque `Weight` type, with no type arguments.
    pub fn weight() -> Type {
        Type::User {
            name: WEIGHT_TYPE_NAME.to_string(),
            args: Vec::new(),
            nullable: false,
            origin: None,
        }
    }

    /// `ZSet(element, Weight)` -- a `User` specialization with a fixed name.
    /// This is `makeZSet` from the type compiler (§4.1).
    pub fn zset(element: Type) -> Type {
        Type::User {
            name: ZSET_TYPE_NAME.to_string(),
            args: vec![element, Type::weight()],
            nullable: false,
            origin: None,
        }
    }

    /// Whether this value is a `ZSet(key, weight)` specialization, and if so
    /// its key and weight element types.
    pub fn as_zset(&self) -> Option<(&Type, &Type)> {
        match self {
            Type::User { name, args, .. } if name == ZSET_TYPE_NAME && args.len() == 2 => {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    /// The nullability bit. `Tuple`, `Struct`, and `Stream` are never
    /// independently nullable and always report `false`.
    pub fn nullable(&self) -> bool {
        match self {
            Type::Bool { nullable, .. }
            | Type::SignedInt { nullable, .. }
            | Type::Float { nullable, .. }
            | Type::Double { nullable, .. }
            | Type::String { nullable, .. }
            | Type::User { nullable, .. } => *nullable,
            Type::Tuple { .. } | Type::Struct { .. } | Type::Stream { .. } => false,
        }
    }

    /// The opaque origin back-reference, for diagnostics.
    pub fn origin(&self) -> Origin {
        match self {
            Type::Bool { origin, .. }
            | Type::SignedInt { origin, .. }
            | Type::Float { origin, .. }
            | Type::Double { origin, .. }
            | Type::String { origin, .. }
            | Type::Tuple { origin, .. }
            | Type::Struct { origin, .. }
            | Type::Stream { origin, .. }
            | Type::User { origin, .. } => *origin,
        }
    }

    /// Returns an equal-except-for-nullability copy. Idempotent:
    /// `t.set_nullable(b).set_nullable(b)` equals `t.set_nullable(b)`.
    ///
    /// `Tuple`, `Struct`, and `Stream` have no nullable bit to set and are
    /// returned unchanged -- nullability is "forced" rather than preserved
    /// for these, per the invariant that e.g. a `Struct` is never directly
    /// nullable.
    pub fn set_nullable(&self, nullable: bool) -> Type {
        match self {
            Type::Bool { origin, .. } => Type::Bool {
                nullable,
                origin: *origin,
            },
            Type::SignedInt { width, origin, .. } => Type::SignedInt {
                width: *width,
                nullable,
                origin: *origin,
            },
            Type::Float { origin, .. } => Type::Float {
                nullable,
                origin: *origin,
            },
            Type::Double { origin, .. } => Type::Double {
                nullable,
                origin: *origin,
            },
            Type::String { origin, .. } => Type::String {
                nullable,
                origin: *origin,
            },
            Type::User {
                name, args, origin, ..
            } => Type::User {
                name: name.clone(),
                args: args.clone(),
                nullable,
                origin: *origin,
            },
            Type::Tuple { .. } | Type::Struct { .. } | Type::Stream { .. } => self.clone(),
        }
    }

    /// Structural equality, ignoring [`Origin`]. This is the only equality
    /// the core ever uses; `PartialEq` is implemented in terms of it.
    pub fn same(&self, other: &Type) -> bool {
        match (self, other) {
            (
                Type::Bool { nullable: a, .. },
                Type::Bool { nullable: b, .. },
            ) => a == b,
            (
                Type::SignedInt {
                    width: wa,
                    nullable: a,
                    ..
                },
                Type::SignedInt {
                    width: wb,
                    nullable: b,
                    ..
                },
            ) => wa == wb && a == b,
            (Type::Float { nullable: a, .. }, Type::Float { nullable: b, .. }) => a == b,
            (Type::Double { nullable: a, .. }, Type::Double { nullable: b, .. }) => a == b,
            (Type::String { nullable: a, .. }, Type::String { nullable: b, .. }) => a == b,
            (
                Type::Tuple { elements: ea, .. },
                Type::Tuple { elements: eb, .. },
            ) => ea.len() == eb.len() && ea.iter().zip(eb).all(|(x, y)| x.same(y)),
            (
                Type::Struct {
                    name: na,
                    fields: fa,
                    ..
                },
                Type::Struct {
                    name: nb,
                    fields: fb,
                    ..
                },
            ) => {
                na == nb
                    && fa.len() == fb.len()
                    && fa
                        .iter()
                        .zip(fb.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same(vb))
            }
            (
                Type::Stream { element: ea, .. },
                Type::Stream { element: eb, .. },
            ) => ea.same(eb),
            (
                Type::User {
                    name: na,
                    args: aa,
                    nullable: ba,
                    ..
                },
                Type::User {
                    name: nb,
                    args: ab,
                    nullable: bb,
                    ..
                },
            ) => {
                na == nb
                    && ba == bb
                    && aa.len() == ab.len()
                    && aa.iter().zip(ab).all(|(x, y)| x.same(y))
            }
            _ => false,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}
