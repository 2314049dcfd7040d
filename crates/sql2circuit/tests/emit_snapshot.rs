//! Snapshot coverage for the emitter's stable, easily-eyeballed fragments:
//! the fixed preamble, and the operator tag/name sequence a lowered view
//! produces. The full emitted body is exercised with plain assertions in
//! `integration_tests.rs` -- its exact spacing is not a contract worth
//! pinning to a snapshot.

use circuit_ir::Circuit;

use sql2circuit::{CompileOptions, Catalog, ColumnDecl, RelExpr, RelNode, SqlType, Statement, TableDdl, ViewDdl};

fn describe_operators(circuit: &Circuit) -> String {
    let mut lines = Vec::new();
    for &id in circuit.sources() {
        let op = circuit.get(id).unwrap();
        lines.push(format!("source: {} ({})", op.name, op.op_tag()));
    }
    for &id in circuit.internal() {
        let op = circuit.get(id).unwrap();
        lines.push(format!("internal: {} ({})", op.name, op.op_tag()));
    }
    for &id in circuit.sinks() {
        let op = circuit.get(id).unwrap();
        lines.push(format!("sink: {} ({})", op.name, op.op_tag()));
    }
    lines.join("\n")
}

#[test]
fn preamble_is_a_fixed_set_of_host_imports() {
    let circuit = Circuit::new("v");
    let text = sql2circuit::emit_circuit(&circuit, &CompileOptions::default()).unwrap();
    let preamble: String = text.lines().take(6).collect::<Vec<_>>().join("\n");

    insta::assert_snapshot!(preamble, @r###"
    // generated by sql2circuit -- do not edit by hand
    use dataflow_host::{FiniteMap, HasZero, Root, Runtime, Stream};
    use dataflow_host::operator::{CsvSource, DelayedFeedback};
    use dataflow_host::ordered_float::OrderedFloat;
    use dataflow_host::ZSetHashMap;
    pub type Weight = isize;
    "###);
}

#[test]
fn projection_lowers_to_the_expected_operator_sequence() {
    let mut catalog = Catalog::new();
    catalog
        .compile(Statement::CreateTable(TableDdl {
            name: "T".to_string(),
            columns: vec![
                ColumnDecl {
                    name: "COL1".to_string(),
                    ty: SqlType::Integer { nullable: true },
                },
                ColumnDecl {
                    name: "COL2".to_string(),
                    ty: SqlType::Float { nullable: true },
                },
                ColumnDecl {
                    name: "COL3".to_string(),
                    ty: SqlType::Boolean { nullable: true },
                },
            ],
        }))
        .unwrap();

    let view = ViewDdl {
        name: "V".to_string(),
        query: RelNode::Project {
            origin: None,
            input: Box::new(RelNode::TableScan {
                origin: None,
                table: "T".to_string(),
            }),
            targets: vec![RelExpr::Column {
                index: 2,
                ty: SqlType::Boolean { nullable: true },
            }],
        },
    };
    let circuit = catalog
        .compile(Statement::CreateView(view))
        .unwrap()
        .unwrap();

    insta::assert_snapshot!(describe_operators(&circuit), @r###"
    source: source_0 (source)
    internal: map_keys_3 (map_keys)
    internal: distinct_4 (distinct)
    sink: V (inspect)
    "###);
}
