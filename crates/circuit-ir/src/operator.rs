//! Operator IR: the dataflow node type.
//!
//! An [`Operator`] is a single polymorphic node -- the "shapes of the same
//! entity" from the design: what distinguishes a projection from a filter
//! from a distinct is the [`OperatorKind`] tag plus whatever extra data that
//! tag needs (e.g. `RelProject`'s column indexes), not a subclass.

use smallvec::SmallVec;

use crate::expr::Expr;
use crate::id::{IdGen, OperatorId};
use crate::types::{Origin, Type};

/// The operation a node performs. Variants are "shapes of the same entity" --
/// all [`Operator`]s share the same struct; this tag plus `function` and
/// `inputs` is what varies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorKind {
    /// Exposes an external input as a stream. No inputs, no function.
    Source,
    /// Terminal observer of its single input.
    Sink,
    /// Element-wise projection `t -> (t.i1, .., t.ik)`. Preserves weights.
    RelProject { indexes: Vec<usize> },
    /// Keeps elements where the payload predicate `t -> bool` holds.
    /// Preserves weights.
    Filter,
    /// Multiset union of N inputs (pointwise addition of weights).
    Sum,
    /// Unary negation of all weights.
    Negate,
    /// Squashes each positive-weight element to weight 1, drops non-positive
    /// rows.
    Distinct,
}

impl OperatorKind {
    /// The operator name the dataflow host expects at emission time (§6).
    pub fn op_tag(&self) -> &'static str {
        match self {
            OperatorKind::Source => "source",
            OperatorKind::Sink => "inspect",
            OperatorKind::RelProject { .. } => "map_keys",
            OperatorKind::Filter => "filter_keys",
            OperatorKind::Sum => "sum",
            OperatorKind::Negate => "neg",
            OperatorKind::Distinct => "distinct",
        }
    }
}

/// A single dataflow node: operation tag, optional payload expression,
/// output type, a unique output binding name, and an ordered (non-owning)
/// list of input operators. Order is significant: the first input is the
/// "pipeline carrier", later inputs are additional data sources (e.g. the
/// rest of a variadic `Sum`).
#[derive(Debug, Clone)]
pub struct Operator {
    pub id: OperatorId,
    pub origin: Origin,
    pub kind: OperatorKind,
    pub function: Option<Expr>,
    pub output_type: Type,
    pub name: String,
    pub inputs: SmallVec<[OperatorId; 2]>,
}

impl Operator {
    /// Creates an operator. When `name` is `None`, a fresh, collision-free
    /// name is allocated: it embeds the operator's freshly-generated
    /// [`OperatorId`], and ids are never reused within a compilation unit, so
    /// the name is unique across the circuit without the circuit having to
    /// track a separate namespace.
    pub fn new(
        id_gen: &mut IdGen,
        origin: Origin,
        kind: OperatorKind,
        function: Option<Expr>,
        output_type: Type,
        name: Option<String>,
    ) -> Operator {
        let id = id_gen.next_operator_id();
        let name = name.unwrap_or_else(|| format!("{}_{}", kind.op_tag(), id.0));
        Operator {
            id,
            origin,
            kind,
            function,
            output_type,
            name,
            inputs: SmallVec::new(),
        }
    }

    /// Appends an input. Order is significant (see struct docs).
    pub fn add_input(&mut self, op: OperatorId) {
        self.inputs.push(op);
    }

    pub fn op_tag(&self) -> &'static str {
        self.kind.op_tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntWidth;

    fn i32_zset() -> Type {
        Type::zset(Type::Tuple {
            elements: vec![Type::SignedInt {
                width: IntWidth::W32,
                nullable: false,
                origin: None,
            }],
            origin: None,
        })
    }

    #[test]
    fn fresh_names_are_unique_across_operators() {
        let mut gen = IdGen::new();
        let a = Operator::new(&mut gen, None, OperatorKind::Source, None, i32_zset(), None);
        let b = Operator::new(&mut gen, None, OperatorKind::Distinct, None, i32_zset(), None);
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn explicit_name_is_used_verbatim() {
        let mut gen = IdGen::new();
        let op = Operator::new(
            &mut gen,
            None,
            OperatorKind::Sink,
            None,
            i32_zset(),
            Some("v_sink".to_string()),
        );
        assert_eq!(op.name, "v_sink");
    }

    #[test]
    fn add_input_preserves_order() {
        let mut gen = IdGen::new();
        let src1 = Operator::new(&mut gen, None, OperatorKind::Source, None, i32_zset(), None);
        let src2 = Operator::new(&mut gen, None, OperatorKind::Source, None, i32_zset(), None);
        let mut sum = Operator::new(&mut gen, None, OperatorKind::Sum, None, i32_zset(), None);
        sum.add_input(src1.id);
        sum.add_input(src2.id);
        assert_eq!(sum.inputs.as_slice(), &[src1.id, src2.id]);
    }

    #[test]
    fn op_tags_match_host_operator_names() {
        assert_eq!(OperatorKind::Source.op_tag(), "source");
        assert_eq!(OperatorKind::Sink.op_tag(), "inspect");
        assert_eq!(
            OperatorKind::RelProject { indexes: vec![0] }.op_tag(),
            "map_keys"
        );
        assert_eq!(OperatorKind::Filter.op_tag(), "filter_keys");
        assert_eq!(OperatorKind::Sum.op_tag(), "sum");
        assert_eq!(OperatorKind::Negate.op_tag(), "neg");
        assert_eq!(OperatorKind::Distinct.op_tag(), "distinct");
    }
}
