//! Stable id newtypes and the monotonic counters that hand them out.
//!
//! All IR nodes carry a dense numeric id allocated from a monotonic counter
//! on creation (used to generate stable variable names at emission time).
//! IDs are distinct newtype wrappers over `u32` so a `NodeId` cannot be
//! accidentally used where an `OperatorId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of an IR node (type, expression, or operator), in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Identity of an operator within a [`Circuit`](crate::circuit::Circuit).
///
/// Operators reference each other by `OperatorId`, not by owning pointer --
/// ownership lives in the circuit's arena, edges are ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id generator. Never reuses a value, even across failed
/// compilations -- a fresh `IdGen` is created per compilation unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    pub fn new() -> Self {
        IdGen { next: 0 }
    }

    pub fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    pub fn next_operator_id(&mut self) -> OperatorId {
        let id = OperatorId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_and_increasing() {
        let mut gen = IdGen::new();
        let a = gen.next_node_id();
        let b = gen.next_node_id();
        assert_ne!(a, b);
        assert!(a.0 < b.0);
    }

    #[test]
    fn node_and_operator_ids_share_the_same_counter() {
        // A single monotonic counter per compilation unit, as spec'd in
        // DATA MODEL: "a dense numeric id allocated from a monotonic
        // counter on creation".
        let mut gen = IdGen::new();
        let n = gen.next_node_id();
        let o = gen.next_operator_id();
        assert_eq!(n.0, 0);
        assert_eq!(o.0, 1);
    }

    #[test]
    fn display_impls_print_inner_value() {
        assert_eq!(format!("{}", NodeId(7)), "7");
        assert_eq!(format!("{}", OperatorId(12)), "12");
    }
}
