//! The type compiler: `convert(SqlType) -> Type`, §4.1.
//!
//! Stands in front of `circuit_ir::Type` with the minimal typed surface a
//! validated SQL front end would actually hand the core -- concrete enough
//! that `convert` has something to pattern-match, but carrying no more
//! structure than the core cares about (precision/scale on `Decimal` are
//! kept on the descriptor only because a real front end would have them; the
//! core discards them, per the DECIMAL note in §9).

use circuit_ir::{IntWidth, Type};

use crate::error::CompileError;

/// One field of a `Row` (struct) SQL type.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlField {
    pub name: String,
    pub ty: SqlType,
}

/// The SQL type descriptor `convert` consumes. Every variant carries its own
/// `nullable` bit; `Row` does not, since structs are never independently
/// nullable in the target lattice (the bit would have nowhere to go).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlType {
    Boolean { nullable: bool },
    TinyInt { nullable: bool },
    SmallInt { nullable: bool },
    Integer { nullable: bool },
    BigInt { nullable: bool },
    /// Precision/scale are carried for fidelity to a real front end but
    /// discarded by `convert` -- DECIMAL maps to 64-bit signed integer
    /// regardless (see spec §9: "preserve the source behavior but document
    /// it").
    Decimal { precision: u32, scale: u32, nullable: bool },
    Float { nullable: bool },
    Real { nullable: bool },
    Double { nullable: bool },
    Char { len: u32, nullable: bool },
    Varchar { len: u32, nullable: bool },
    /// A struct type: ordered, named fields.
    Row(Vec<SqlField>),
    /// Catch-all for every SQL type `convert` does not lower: binary,
    /// temporal, interval, array, map, cursor, geometry, sarg, and anything
    /// else. Named generically since the core does not need to distinguish
    /// among the ones it rejects.
    Other(String),
}

/// Pure function mapping a SQL column type onto a dataflow type, §4.1.
///
/// A `Row` lowers to a `Tuple` of recursively converted field types (the
/// tuple itself is non-nullable; nullability lives on each element).
/// Primitive types map through the fixed table; everything else raises
/// [`CompileError::Unimplemented`].
pub fn convert(sql_type: &SqlType) -> Result<Type, CompileError> {
    match sql_type {
        SqlType::Boolean { nullable } => Ok(Type::Bool {
            nullable: *nullable,
            origin: None,
        }),
        SqlType::TinyInt { nullable } => Ok(signed_int(IntWidth::W8, *nullable)),
        SqlType::SmallInt { nullable } => Ok(signed_int(IntWidth::W16, *nullable)),
        SqlType::Integer { nullable } => Ok(signed_int(IntWidth::W32, *nullable)),
        SqlType::BigInt { nullable } => Ok(signed_int(IntWidth::W64, *nullable)),
        SqlType::Decimal { nullable, .. } => Ok(signed_int(IntWidth::W64, *nullable)),
        SqlType::Float { nullable } => Ok(Type::Float {
            nullable: *nullable,
            origin: None,
        }),
        SqlType::Real { nullable } => Ok(Type::Float {
            nullable: *nullable,
            origin: None,
        }),
        SqlType::Double { nullable } => Ok(Type::Double {
            nullable: *nullable,
            origin: None,
        }),
        SqlType::Char { nullable, .. } => Ok(Type::String {
            nullable: *nullable,
            origin: None,
        }),
        SqlType::Varchar { nullable, .. } => Ok(Type::String {
            nullable: *nullable,
            origin: None,
        }),
        SqlType::Row(fields) => {
            let elements = fields
                .iter()
                .map(|f| convert(&f.ty))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Type::Tuple {
                elements,
                origin: None,
            })
        }
        SqlType::Other(name) => Err(CompileError::Unimplemented {
            construct: format!("SQL type '{name}'"),
        }),
    }
}

fn signed_int(width: IntWidth, nullable: bool) -> Type {
    Type::SignedInt {
        width,
        nullable,
        origin: None,
    }
}

/// `makeZSet(element)` from §4.1: `ZSet(element, Weight)`. A thin
/// re-export of `circuit_ir::Type::zset` so callers in this crate reach for
/// the type compiler's own vocabulary rather than the IR crate's.
pub fn make_zset(element: Type) -> Type {
    Type::zset(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_map_through_the_fixed_table() {
        assert_eq!(
            convert(&SqlType::Boolean { nullable: true }).unwrap(),
            Type::Bool {
                nullable: true,
                origin: None
            }
        );
        assert_eq!(
            convert(&SqlType::Integer { nullable: false }).unwrap(),
            Type::SignedInt {
                width: IntWidth::W32,
                nullable: false,
                origin: None
            }
        );
        assert_eq!(
            convert(&SqlType::BigInt { nullable: true }).unwrap(),
            Type::SignedInt {
                width: IntWidth::W64,
                nullable: true,
                origin: None
            }
        );
    }

    #[test]
    fn decimal_discards_precision_and_scale() {
        let ty = convert(&SqlType::Decimal {
            precision: 10,
            scale: 2,
            nullable: false,
        })
        .unwrap();
        assert_eq!(
            ty,
            Type::SignedInt {
                width: IntWidth::W64,
                nullable: false,
                origin: None
            }
        );
    }

    #[test]
    fn row_lowers_to_a_non_nullable_tuple_of_its_fields() {
        let row = SqlType::Row(vec![
            SqlField {
                name: "a".into(),
                ty: SqlType::Integer { nullable: true },
            },
            SqlField {
                name: "b".into(),
                ty: SqlType::Boolean { nullable: false },
            },
        ]);
        let ty = convert(&row).unwrap();
        assert!(!ty.nullable());
        match ty {
            Type::Tuple { elements, .. } => {
                assert_eq!(elements.len(), 2);
                assert!(elements[0].nullable());
                assert!(!elements[1].nullable());
            }
            other => panic!("expected Tuple, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_types_are_unimplemented() {
        let err = convert(&SqlType::Other("ARRAY".into())).unwrap_err();
        assert!(matches!(err, CompileError::Unimplemented { .. }));
    }

    #[test]
    fn type_round_trip_set_nullable_is_idempotent() {
        for nullable in [true, false] {
            let ty = convert(&SqlType::Double { nullable }).unwrap();
            let once = ty.set_nullable(ty.nullable());
            let twice = once.set_nullable(ty.nullable());
            assert!(once.same(&twice));
            assert_eq!(once.nullable(), ty.nullable());
        }
    }
}
