//! The expression compiler, §4.2: a recursive post-order visitor from
//! [`RelExpr`] to `circuit_ir::Expr`.

use circuit_ir::{BinaryOp, Expr, UnaryOp};

use crate::error::CompileError;
use crate::relalg::{CallKind, RelExpr};
use crate::sql_type::convert;

/// Compiles a scalar expression into an [`Expr`], wrapping the result in a
/// [`Expr::Closure`] over the implicit row variable `t`. `row_arity` is the
/// arity of the row `t` ranges over, needed to validate column references.
pub fn compile(expr: &RelExpr, row_arity: usize) -> Result<Expr, CompileError> {
    let body = compile_node(expr, row_arity)?;
    Expr::closure(body, origin_of(expr)).map_err(CompileError::from)
}

fn origin_of(_expr: &RelExpr) -> Option<u32> {
    // `RelExpr` carries no origin of its own in this front-end descriptor
    // (only `RelNode` does); the closure wrapping a compiled expression is
    // attributed to no particular front-end node.
    None
}

fn compile_node(expr: &RelExpr, row_arity: usize) -> Result<Expr, CompileError> {
    match expr {
        RelExpr::Column { index, ty } => {
            let dataflow_ty = convert(ty)?;
            Expr::field(*index, row_arity, dataflow_ty, None).map_err(CompileError::from)
        }
        RelExpr::Literal { text, ty } => {
            let dataflow_ty = convert(ty)?;
            Ok(Expr::literal(text.clone(), dataflow_ty, None))
        }
        RelExpr::Call { kind, operands, ty } => compile_call(*kind, operands, ty, row_arity),
    }
}

fn compile_call(
    kind: CallKind,
    operands: &[RelExpr],
    ty: &crate::sql_type::SqlType,
    row_arity: usize,
) -> Result<Expr, CompileError> {
    let dataflow_ty = convert(ty)?;

    let binary_op = match kind {
        CallKind::Mul => Some(BinaryOp::Mul),
        CallKind::Div => Some(BinaryOp::Div),
        CallKind::Rem => Some(BinaryOp::Rem),
        CallKind::Add => Some(BinaryOp::Add),
        CallKind::Sub => Some(BinaryOp::Sub),
        CallKind::Lt => Some(BinaryOp::Lt),
        CallKind::Gt => Some(BinaryOp::Gt),
        CallKind::Le => Some(BinaryOp::Le),
        CallKind::Ge => Some(BinaryOp::Ge),
        CallKind::Eq => Some(BinaryOp::Eq),
        CallKind::Ne => Some(BinaryOp::Ne),
        CallKind::And => Some(BinaryOp::And),
        CallKind::Or => Some(BinaryOp::Or),
        CallKind::Dot => Some(BinaryOp::Dot),
        CallKind::BitAnd => Some(BinaryOp::BitAnd),
        CallKind::BitOr => Some(BinaryOp::BitOr),
        CallKind::BitXor => Some(BinaryOp::BitXor),
        _ => None,
    };
    if let Some(op) = binary_op {
        let [left, right] = require_operands(operands, kind)?;
        let left = compile_node(left, row_arity)?;
        let right = compile_node(right, row_arity)?;
        return Ok(Expr::binary(op, left, right, dataflow_ty, None));
    }

    let unary_op = match kind {
        CallKind::Not => Some(UnaryOp::Not),
        CallKind::UnaryPlus => Some(UnaryOp::Plus),
        CallKind::UnaryMinus => Some(UnaryOp::Neg),
        _ => None,
    };
    if let Some(op) = unary_op {
        let [operand] = require_unary_operand(operands, kind)?;
        let operand = compile_node(operand, row_arity)?;
        return Ok(Expr::unary(op, operand, dataflow_ty, None));
    }

    // `IS TRUE` / `IS NOT FALSE` collapse to the operand unchanged -- a
    // known limitation for nullable booleans, see §9.
    match kind {
        CallKind::IsTrue | CallKind::IsNotFalse => {
            let [operand] = require_unary_operand(operands, kind)?;
            compile_node(operand, row_arity)
        }
        _ => Err(CompileError::Unimplemented {
            construct: format!("call kind {kind:?}"),
        }),
    }
}

fn require_operands(operands: &[RelExpr], kind: CallKind) -> Result<[&RelExpr; 2], CompileError> {
    match operands {
        [a, b] => Ok([a, b]),
        _ => Err(CompileError::Unimplemented {
            construct: format!("{kind:?} with {} operand(s)", operands.len()),
        }),
    }
}

fn require_unary_operand(operands: &[RelExpr], kind: CallKind) -> Result<[&RelExpr; 1], CompileError> {
    match operands {
        [a] => Ok([a]),
        _ => Err(CompileError::Unimplemented {
            construct: format!("{kind:?} with {} operand(s)", operands.len()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_type::SqlType;

    fn bool_col(index: usize) -> RelExpr {
        RelExpr::Column {
            index,
            ty: SqlType::Boolean { nullable: false },
        }
    }

    #[test]
    fn column_compiles_to_a_field_expression_inside_a_closure() {
        let compiled = compile(&bool_col(0), 2).unwrap();
        match compiled {
            Expr::Closure { body, .. } => assert!(matches!(*body, Expr::Field { index: 0, .. })),
            other => panic!("expected Closure, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_column_is_an_ir_invariant_error() {
        let err = compile(&bool_col(5), 2).unwrap_err();
        assert!(matches!(err, CompileError::Ir(_)));
    }

    #[test]
    fn binary_call_dispatches_to_binary_expr() {
        let call = RelExpr::Call {
            kind: CallKind::Lt,
            operands: vec![bool_col(0), bool_col(1)],
            ty: SqlType::Boolean { nullable: false },
        };
        let compiled = compile(&call, 2).unwrap();
        match compiled {
            Expr::Closure { body, .. } => assert!(matches!(
                *body,
                Expr::Binary {
                    op: BinaryOp::Lt,
                    ..
                }
            )),
            other => panic!("expected Closure, got {other:?}"),
        }
    }

    #[test]
    fn is_true_collapses_to_its_operand() {
        let call = RelExpr::Call {
            kind: CallKind::IsTrue,
            operands: vec![bool_col(0)],
            ty: SqlType::Boolean { nullable: false },
        };
        let compiled = compile(&call, 1).unwrap();
        match compiled {
            Expr::Closure { body, .. } => assert!(matches!(*body, Expr::Field { index: 0, .. })),
            other => panic!("expected Closure, got {other:?}"),
        }
    }

    #[test]
    fn is_null_is_unimplemented() {
        let call = RelExpr::Call {
            kind: CallKind::IsNull,
            operands: vec![bool_col(0)],
            ty: SqlType::Boolean { nullable: false },
        };
        let err = compile(&call, 1).unwrap_err();
        assert!(matches!(err, CompileError::Unimplemented { .. }));
    }

    #[test]
    fn cast_floor_ceil_are_unimplemented() {
        for kind in [CallKind::Cast, CallKind::Floor, CallKind::Ceil] {
            let call = RelExpr::Call {
                kind,
                operands: vec![bool_col(0)],
                ty: SqlType::Boolean { nullable: false },
            };
            assert!(matches!(
                compile(&call, 1).unwrap_err(),
                CompileError::Unimplemented { .. }
            ));
        }
    }
}
