//! Compiles validated SQL DDL and view definitions into `circuit_ir`
//! circuits, and renders those circuits as source text for a dataflow host.
//!
//! The SQL front end itself (parsing, name resolution, logical-plan
//! construction) is out of scope: this crate's input boundary is the
//! descriptor types in [`relalg`] and [`catalog`], which stand in for
//! whatever a real front end would hand the core.

pub mod catalog;
pub mod emit;
pub mod error;
pub mod expr_compile;
pub mod lowering;
pub mod options;
pub mod relalg;
pub mod sql_type;

pub use catalog::{CalciteProgram, Catalog, ColumnDecl, Statement, TableDdl, ViewDdl};
pub use emit::emit as emit_circuit;
pub use error::CompileError;
pub use lowering::Lowering;
pub use options::CompileOptions;
pub use relalg::{CallKind, RelExpr, RelNode};
pub use sql_type::{convert, make_zset, SqlField, SqlType};
