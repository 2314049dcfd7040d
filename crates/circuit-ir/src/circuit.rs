//! The circuit graph: a named container of operators.
//!
//! Mirrors the "cross-linked IR graph" strategy from the design notes: an
//! arena inside the circuit keyed by stable [`OperatorId`]s, with edges
//! (`Operator::inputs`) stored as ids rather than owning references.
//! Ownership lives in the arena; everything else (the ordered
//! sources/sinks/internal lists, the node->operator map, the
//! endpoint-name->operator map) is bookkeeping over those ids.

use std::collections::HashMap;

use crate::error::CircuitError;
use crate::id::{IdGen, NodeId, OperatorId};
use crate::operator::{Operator, OperatorKind};

/// A named, typed dataflow circuit: the ordered lists of sources, sinks, and
/// internal operators that together form the DAG, plus the bookkeeping maps
/// the lowering visitor uses while building it.
#[derive(Debug)]
pub struct Circuit {
    name: String,
    id_gen: IdGen,
    arena: HashMap<OperatorId, Operator>,
    /// Binding-name -> operator, enforcing invariant 4 (operator uniqueness).
    names: HashMap<String, OperatorId>,
    sources: Vec<OperatorId>,
    sinks: Vec<OperatorId>,
    internal: Vec<OperatorId>,
    /// Relational-tree node -> the operator that was synthesized for it.
    node_operator: HashMap<NodeId, OperatorId>,
    /// Table/view name -> its Source/Sink operator.
    endpoint_operator: HashMap<String, OperatorId>,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Circuit {
        Circuit {
            name: name.into(),
            id_gen: IdGen::new(),
            arena: HashMap::new(),
            names: HashMap::new(),
            sources: Vec::new(),
            sinks: Vec::new(),
            internal: Vec::new(),
            node_operator: HashMap::new(),
            endpoint_operator: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id generator backing every operator and node allocated for this
    /// circuit. A single monotonic counter, shared across node ids and
    /// operator ids (see `id::IdGen`).
    pub fn id_gen(&mut self) -> &mut IdGen {
        &mut self.id_gen
    }

    /// Adds an operator to the circuit, routing it into sources, sinks, or
    /// the internal-operator list based on its [`OperatorKind`]. Fails if
    /// another operator already owns the same output binding name.
    pub fn add_operator(&mut self, op: Operator) -> Result<OperatorId, CircuitError> {
        if self.names.contains_key(&op.name) {
            return Err(CircuitError::DuplicateBinding {
                name: op.name.clone(),
            });
        }
        let id = op.id;
        self.names.insert(op.name.clone(), id);
        match &op.kind {
            OperatorKind::Source => self.sources.push(id),
            OperatorKind::Sink => self.sinks.push(id),
            _ => self.internal.push(id),
        }
        self.arena.insert(id, op);
        Ok(id)
    }

    /// Registers the operator synthesized for a relational-tree node.
    /// `putNew` semantics: fails if `node` is already registered.
    pub fn register_node(&mut self, node: NodeId, op: OperatorId) -> Result<(), CircuitError> {
        if self.node_operator.contains_key(&node) {
            return Err(CircuitError::DuplicateBinding {
                name: format!("node:{node}"),
            });
        }
        self.node_operator.insert(node, op);
        Ok(())
    }

    /// Looks up the operator synthesized for a relational-tree node.
    pub fn operator_for_node(&self, node: NodeId) -> Result<OperatorId, CircuitError> {
        self.node_operator
            .get(&node)
            .copied()
            .ok_or_else(|| CircuitError::NoOperatorForNode {
                node: node.to_string(),
            })
    }

    /// Registers a table or view name against its Source/Sink operator.
    /// `putNew` semantics: fails if `name` is already registered.
    pub fn register_endpoint(&mut self, name: String, op: OperatorId) -> Result<(), CircuitError> {
        if self.endpoint_operator.contains_key(&name) {
            return Err(CircuitError::DuplicateBinding { name });
        }
        self.endpoint_operator.insert(name, op);
        Ok(())
    }

    /// Looks up a table/view's Source/Sink operator by name.
    pub fn endpoint(&self, name: &str) -> Option<OperatorId> {
        self.endpoint_operator.get(name).copied()
    }

    pub fn get(&self, id: OperatorId) -> Result<&Operator, CircuitError> {
        self.arena.get(&id).ok_or(CircuitError::OperatorNotFound(id))
    }

    /// Sources in registration order -- the order the driver's positional
    /// arguments are emitted in.
    pub fn sources(&self) -> &[OperatorId] {
        &self.sources
    }

    /// Sinks in registration order -- the order the driver's return tuple is
    /// emitted in.
    pub fn sinks(&self) -> &[OperatorId] {
        &self.sinks
    }

    /// Internal operators in the order they were added -- the post-order of
    /// the lowering visit.
    pub fn internal(&self) -> &[OperatorId] {
        &self.internal
    }

    /// Total number of operators of any kind, for sanity checks (invariant
    /// 4: every operator appears exactly once in exactly one of
    /// sources/sinks/internal).
    pub fn operator_count(&self) -> usize {
        self.arena.len()
    }
}
