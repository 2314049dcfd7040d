//! The DDL simulator and the compiler's external entry points, §6.
//!
//! `Catalog` plays the role the GLOSSARY assigns the "DDL simulator": an
//! in-memory schema store that `compile` mutates on `CREATE TABLE` and
//! consults on `CREATE VIEW`/`TableScan` lowering. Insertion order is kept
//! (an `IndexMap`) so `getProgram()`'s ordered lists match the order DDL was
//! first presented, per §5's ordering guarantee.

use indexmap::IndexMap;

use circuit_ir::{Circuit, OperatorKind, Type};

use crate::error::CompileError;
use crate::lowering::Lowering;
use crate::relalg::RelNode;
use crate::sql_type::{convert, SqlType};

/// One column of a table DDL: its SQL type and nullability.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDecl {
    pub name: String,
    pub ty: SqlType,
}

/// A `CREATE TABLE` descriptor: name and ordered column declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDdl {
    pub name: String,
    pub columns: Vec<ColumnDecl>,
}

/// A `CREATE VIEW` descriptor: name and a validated relational-algebra root.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewDdl {
    pub name: String,
    pub query: RelNode,
}

/// The typed boundary the out-of-scope SQL front end hands the core: one
/// pre-parsed statement at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(TableDdl),
    CreateView(ViewDdl),
    /// Any non-DDL statement kind. Rejected with `Unimplemented`.
    Other(String),
}

/// Two ordered lists, returned by [`Catalog::get_program`]: every table and
/// view declared so far, in the order their DDL was first presented.
#[derive(Debug, Clone, PartialEq)]
pub struct CalciteProgram {
    pub tables: Vec<TableDdl>,
    pub views: Vec<ViewDdl>,
}

/// The DDL simulator: an in-memory schema catalog, plus the one circuit
/// built so far for each view compiled against it.
#[derive(Debug)]
pub struct Catalog {
    tables: IndexMap<String, TableDdl>,
    views: IndexMap<String, ViewDdl>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Catalog {
            tables: IndexMap::new(),
            views: IndexMap::new(),
        }
    }

    /// `getProgram()`: the ordered tables and views declared so far.
    pub fn get_program(&self) -> CalciteProgram {
        CalciteProgram {
            tables: self.tables.values().cloned().collect(),
            views: self.views.values().cloned().collect(),
        }
    }

    /// `compile(sql-statement)`, §6. DDL statements update the catalog;
    /// `CREATE VIEW` additionally builds and registers a relational plan
    /// against a fresh [`Circuit`], returned on success. Non-DDL statements
    /// are rejected. Table DDL produces no circuit (S1).
    pub fn compile(&mut self, statement: Statement) -> Result<Option<Circuit>, CompileError> {
        match statement {
            Statement::CreateTable(table) => {
                self.create_table(table)?;
                Ok(None)
            }
            Statement::CreateView(view) => {
                if let RelNode::Sort { .. } = &view.query {
                    return Err(CompileError::UnsupportedConstruct { construct: "ORDER BY" });
                }
                let circuit = self.create_view(view)?;
                Ok(Some(circuit))
            }
            Statement::Other(kind) => Err(CompileError::Unimplemented {
                construct: format!("non-DDL statement '{kind}'"),
            }),
        }
    }

    fn create_table(&mut self, table: TableDdl) -> Result<(), CompileError> {
        if self.tables.contains_key(&table.name) {
            return Err(CompileError::Catalog {
                reason: format!("table '{}' already declared", table.name),
            });
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    fn create_view(&mut self, view: ViewDdl) -> Result<Circuit, CompileError> {
        if self.views.contains_key(&view.name) {
            return Err(CompileError::Catalog {
                reason: format!("view '{}' already declared", view.name),
            });
        }

        let mut circuit = Circuit::new(view.name.clone());

        // Step 1: every table DDL becomes a Source, registered under the
        // table's name, in the order tables were first declared.
        for table in self.tables.values() {
            add_source(&mut circuit, table)?;
        }

        // Step 2: lower the view's relational tree and wire its root to a
        // Sink carrying the view's row type.
        let root_op = Lowering::new(&mut circuit).lower(&view.query)?;
        let sink_type = circuit.get(root_op)?.output_type.clone();
        let id_gen = circuit.id_gen();
        let mut sink = circuit_ir::Operator::new(
            id_gen,
            None,
            OperatorKind::Sink,
            None,
            sink_type,
            Some(view.name.clone()),
        );
        sink.add_input(root_op);
        let sink_id = circuit.add_operator(sink)?;
        circuit.register_endpoint(view.name.clone(), sink_id)?;

        tracing::debug!(view = %view.name, "circuit assembled");
        self.views.insert(view.name.clone(), view);
        Ok(circuit)
    }
}

fn add_source(circuit: &mut Circuit, table: &TableDdl) -> Result<(), CompileError> {
    if circuit.endpoint(&table.name).is_some() {
        return Ok(());
    }
    let element_types = table
        .columns
        .iter()
        .map(|c| convert(&c.ty))
        .collect::<Result<Vec<_>, _>>()?;
    let output_type = Type::zset(Type::Tuple {
        elements: element_types,
        origin: None,
    });
    let id_gen = circuit.id_gen();
    let source = circuit_ir::Operator::new(
        id_gen,
        None,
        OperatorKind::Source,
        None,
        output_type,
        None,
    );
    let source_id = circuit.add_operator(source)?;
    circuit.register_endpoint(table.name.clone(), source_id)?;
    Ok(())
}
