//! The lowering visitor, §4.4: a post-order walk of a [`RelNode`] tree that
//! synthesizes operators bottom-up and wires them into a [`Circuit`].

use circuit_ir::{Circuit, NodeId, OperatorId, OperatorKind, Type};

use crate::error::CompileError;
use crate::expr_compile;
use crate::relalg::{RelExpr, RelNode};

/// A `(parent, ordinal)` diagnostic frame: which node we're inside, and
/// which child of that node we're currently visiting. Not consulted by the
/// lowering logic itself -- purely for error context, per §4.4.
#[derive(Debug, Clone, Copy)]
struct Frame {
    parent_kind: &'static str,
    ordinal: usize,
}

/// Drives the post-order walk over one relational tree, accumulating
/// operators into `circuit`. One `Lowering` is used per view; it is
/// consumed by `lower`.
pub struct Lowering<'a> {
    circuit: &'a mut Circuit,
    stack: Vec<Frame>,
}

impl<'a> Lowering<'a> {
    pub fn new(circuit: &'a mut Circuit) -> Self {
        Lowering {
            circuit,
            stack: Vec::new(),
        }
    }

    /// Lowers `node` and every descendant, returning the operator
    /// synthesized for the tree's root.
    pub fn lower(&mut self, node: &RelNode) -> Result<OperatorId, CompileError> {
        let (_node_id, op) = self.lower_and_register(node)?;
        Ok(op)
    }

    /// Lowers `node`, registers the synthesized operator against a fresh
    /// [`NodeId`] in the circuit's node->operator map, and returns both --
    /// §4.4's "look up each child's operator in a node->operator map" is
    /// exercised by `lower_child`, which looks the operator back up by this
    /// id rather than trusting the value returned here directly.
    fn lower_and_register(&mut self, node: &RelNode) -> Result<(NodeId, OperatorId), CompileError> {
        let _span = tracing::debug_span!("lower_node", kind = node_kind(node)).entered();
        let node_id = self.circuit.id_gen().next_node_id();
        let op = match node {
            RelNode::TableScan { table, .. } => self.lower_table_scan(table),
            RelNode::Project { input, targets, .. } => self.lower_project(input, targets),
            RelNode::Filter { input, predicate, .. } => self.lower_filter(input, predicate),
            RelNode::Union { inputs, all, .. } => self.lower_union(inputs, *all),
            RelNode::Minus { inputs, all, .. } => self.lower_minus(inputs, *all),
            RelNode::Sort { .. } => Err(CompileError::UnsupportedConstruct {
                construct: "ORDER BY",
            }),
            RelNode::Unhandled(name) => Err(CompileError::Unimplemented {
                construct: format!("relational node '{name}'"),
            }),
        }?;
        self.circuit.register_node(node_id, op)?;
        Ok((node_id, op))
    }

    fn lower_child(&mut self, parent_kind: &'static str, ordinal: usize, node: &RelNode) -> Result<OperatorId, CompileError> {
        self.stack.push(Frame { parent_kind, ordinal });
        let result = self.lower_and_register(node);
        self.stack.pop();
        let (node_id, _op) = result?;
        self.circuit.operator_for_node(node_id).map_err(CompileError::from)
    }

    fn output_type_of(&self, op: OperatorId) -> Result<Type, CompileError> {
        Ok(self.circuit.get(op)?.output_type.clone())
    }

    fn lower_table_scan(&mut self, table: &str) -> Result<OperatorId, CompileError> {
        self.circuit
            .endpoint(table)
            .ok_or_else(|| CompileError::Catalog {
                reason: format!("no source registered for table '{table}'"),
            })
    }

    fn lower_project(&mut self, input: &RelNode, targets: &[RelExpr]) -> Result<OperatorId, CompileError> {
        let input_op = self.lower_child("Project", 0, input)?;
        let input_type = self.output_type_of(input_op)?;

        let mut indexes = Vec::with_capacity(targets.len());
        for target in targets {
            match target {
                RelExpr::Column { index, .. } => indexes.push(*index),
                _ => {
                    return Err(CompileError::Unimplemented {
                        construct: "non-column projection target".to_string(),
                    })
                }
            }
        }

        let projected_element = project_element_type(&input_type, &indexes)?;
        let project_output = Type::zset(projected_element);

        let project_id = self.push_operator(
            None,
            OperatorKind::RelProject { indexes },
            None,
            project_output.clone(),
            &[input_op],
        )?;
        let distinct_id = self.push_operator(
            None,
            OperatorKind::Distinct,
            None,
            project_output,
            &[project_id],
        )?;
        Ok(distinct_id)
    }

    fn lower_filter(&mut self, input: &RelNode, predicate: &RelExpr) -> Result<OperatorId, CompileError> {
        let input_op = self.lower_child("Filter", 0, input)?;
        let input_type = self.output_type_of(input_op)?;
        let row_arity = zset_tuple_arity(&input_type)?;
        let predicate_expr = expr_compile::compile(predicate, row_arity)?;

        self.push_operator(
            None,
            OperatorKind::Filter,
            Some(predicate_expr),
            input_type,
            &[input_op],
        )
    }

    fn lower_union(&mut self, inputs: &[RelNode], all: bool) -> Result<OperatorId, CompileError> {
        let mut input_ops = Vec::with_capacity(inputs.len());
        for (ordinal, child) in inputs.iter().enumerate() {
            input_ops.push(self.lower_child("Union", ordinal, child)?);
        }
        let output_type = self.output_type_of(input_ops[0])?;

        let sum_id = self.push_operator(None, OperatorKind::Sum, None, output_type.clone(), &input_ops)?;
        if all {
            Ok(sum_id)
        } else {
            self.push_operator(None, OperatorKind::Distinct, None, output_type, &[sum_id])
        }
    }

    fn lower_minus(&mut self, inputs: &[RelNode], all: bool) -> Result<OperatorId, CompileError> {
        let mut input_ops = Vec::with_capacity(inputs.len());
        for (ordinal, child) in inputs.iter().enumerate() {
            input_ops.push(self.lower_child("Minus", ordinal, child)?);
        }
        let output_type = self.output_type_of(input_ops[0])?;

        let mut sum_inputs = Vec::with_capacity(input_ops.len());
        sum_inputs.push(input_ops[0]);
        for &child_op in &input_ops[1..] {
            let negate_id = self.push_operator(
                None,
                OperatorKind::Negate,
                None,
                output_type.clone(),
                &[child_op],
            )?;
            sum_inputs.push(negate_id);
        }

        let sum_id = self.push_operator(None, OperatorKind::Sum, None, output_type.clone(), &sum_inputs)?;
        if all {
            Ok(sum_id)
        } else {
            self.push_operator(None, OperatorKind::Distinct, None, output_type, &[sum_id])
        }
    }

    fn push_operator(
        &mut self,
        origin: Option<u32>,
        kind: OperatorKind,
        function: Option<circuit_ir::Expr>,
        output_type: Type,
        inputs: &[OperatorId],
    ) -> Result<OperatorId, CompileError> {
        let tag = kind.op_tag();
        let mut op = {
            let id_gen = self.circuit.id_gen();
            circuit_ir::Operator::new(id_gen, origin, kind, function, output_type, None)
        };
        for &input in inputs {
            op.add_input(input);
        }
        tracing::debug!(tag, name = %op.name, "creating operator");
        Ok(self.circuit.add_operator(op)?)
    }
}

fn node_kind(node: &RelNode) -> &'static str {
    match node {
        RelNode::TableScan { .. } => "TableScan",
        RelNode::Project { .. } => "Project",
        RelNode::Filter { .. } => "Filter",
        RelNode::Union { .. } => "Union",
        RelNode::Minus { .. } => "Minus",
        RelNode::Sort { .. } => "Sort",
        RelNode::Unhandled(_) => "Unhandled",
    }
}

fn zset_tuple_arity(ty: &Type) -> Result<usize, CompileError> {
    let (key, _weight) = ty.as_zset().ok_or_else(|| CompileError::Catalog {
        reason: "expected a ZSet element type".to_string(),
    })?;
    match key {
        Type::Tuple { elements, .. } => Ok(elements.len()),
        _ => Ok(1),
    }
}

fn project_element_type(input_type: &Type, indexes: &[usize]) -> Result<Type, CompileError> {
    let (key, _weight) = input_type.as_zset().ok_or_else(|| CompileError::Catalog {
        reason: "expected a ZSet element type".to_string(),
    })?;
    let elements = match key {
        Type::Tuple { elements, .. } => elements.clone(),
        other => vec![other.clone()],
    };
    let mut projected = Vec::with_capacity(indexes.len());
    for &index in indexes {
        let element = elements
            .get(index)
            .cloned()
            .ok_or_else(|| CompileError::Ir(circuit_ir::CircuitError::FieldIndexOutOfRange {
                index,
                arity: elements.len(),
            }))?;
        projected.push(element);
    }
    Ok(Type::Tuple {
        elements: projected,
        origin: None,
    })
}
