//! The textual emitter, §4.5: a pure, read-only traversal of a built
//! [`Circuit`] that renders the five-part textual shape the core commits
//! to. The concrete syntax below is one faithful rendering of that shape;
//! any host accepting the same five parts is an acceptable target (§1:
//! rendering to any concrete textual target is a mechanical traversal, and
//! is explicitly not part of the IR contract).

use std::fmt::Write as _;

use circuit_ir::{BinaryOp, Circuit, Expr, Operator, OperatorId, OperatorKind, Type, UnaryOp};

use crate::error::CompileError;
use crate::options::CompileOptions;

/// Renders `circuit` as source text for the dataflow host, per §4.5/§6.
/// Read-only: never mutates `circuit`, so callers may emit the same built
/// circuit any number of times.
pub fn emit(circuit: &Circuit, options: &CompileOptions) -> Result<String, CompileError> {
    let mut out = String::new();

    emit_preamble(&mut out, options);
    let _ = writeln!(out);

    let fn_name = format!("build_{}", sanitize(circuit.name()));
    emit_signature(&mut out, circuit, &fn_name, options)?;

    for &source in circuit.sources() {
        emit_cell(&mut out, circuit.get(source)?, options)?;
    }
    for &sink in circuit.sinks() {
        emit_cell(&mut out, circuit.get(sink)?, options)?;
    }
    let _ = writeln!(out);

    emit_build_call(&mut out, circuit, options)?;
    let _ = writeln!(out);

    emit_driver(&mut out, circuit)?;
    let _ = writeln!(out, "}}");

    Ok(out)
}

fn emit_preamble(out: &mut String, options: &CompileOptions) {
    let _ = writeln!(out, "// generated by sql2circuit -- do not edit by hand");
    let _ = writeln!(out, "use dataflow_host::{{FiniteMap, HasZero, Root, Runtime, Stream}};");
    let _ = writeln!(out, "use dataflow_host::operator::{{CsvSource, DelayedFeedback}};");
    let _ = writeln!(out, "use dataflow_host::ordered_float::OrderedFloat;");
    if options.zset_type_name == "ZSetHashMap" {
        let _ = writeln!(out, "use dataflow_host::ZSetHashMap;");
    } else {
        let _ = writeln!(out, "use dataflow_host::ZSetHashMap as {};", options.zset_type_name);
    }
    let _ = writeln!(out, "pub type {} = isize;", options.weight_type_name);
}

fn emit_signature(
    out: &mut String,
    circuit: &Circuit,
    fn_name: &str,
    options: &CompileOptions,
) -> Result<(), CompileError> {
    let mut param_types = Vec::new();
    for &source in circuit.sources() {
        param_types.push(render_type(&circuit.get(source)?.output_type, options));
    }
    let returns: Result<Vec<_>, _> = circuit
        .sinks()
        .iter()
        .map(|&sink| circuit.get(sink).map(|op| render_type(&op.output_type, options)))
        .collect();
    let returns = returns?;
    // The generator function itself takes no arguments; its signature, per
    // the design, describes the driver closure it returns -- one positional
    // argument per Source, a tuple of one element per Sink.
    let return_ty = format!("impl FnMut({}) -> ({})", param_types.join(", "), returns.join(", "));
    let _ = writeln!(out, "pub fn {fn_name}() -> {return_ty} {{");
    Ok(())
}

fn emit_cell(out: &mut String, op: &Operator, options: &CompileOptions) -> Result<(), CompileError> {
    let ty = render_type(&op.output_type, options);
    let _ = writeln!(
        out,
        "    let {name}_cell = std::rc::Rc::new(std::cell::RefCell::new({ty}::default()));",
        name = op.name,
    );
    Ok(())
}

fn emit_build_call(out: &mut String, circuit: &Circuit, options: &CompileOptions) -> Result<(), CompileError> {
    let _ = writeln!(out, "    let (root, handles) = Root::build(|circuit| {{");

    for &source in circuit.sources() {
        let op = circuit.get(source)?;
        let _ = writeln!(
            out,
            "        let {name} = circuit.add_source(CsvSource::from_cell({name}_cell.clone()));",
            name = op.name,
        );
    }

    for &id in circuit.internal() {
        emit_operator(out, circuit, id, options)?;
    }

    for &sink in circuit.sinks() {
        let op = circuit.get(sink)?;
        let input = render_binding(circuit, &op.name, op.inputs.first().copied())?;
        let _ = writeln!(
            out,
            "        {input}.inspect(move |m| {{ *{name}_cell.borrow_mut() = m.clone(); }});",
            name = op.name,
        );
    }

    let _ = writeln!(out, "    })?;");
    Ok(())
}

fn emit_operator(out: &mut String, circuit: &Circuit, id: OperatorId, options: &CompileOptions) -> Result<(), CompileError> {
    let op = circuit.get(id)?;
    let ty = render_type(&op.output_type, options);
    let first_input = render_binding(circuit, &op.name, op.inputs.first().copied())?;

    let rhs = match &op.kind {
        OperatorKind::RelProject { indexes } => {
            let func = op
                .function
                .as_ref()
                .map(render_expr)
                .unwrap_or_else(|| render_indexes(indexes));
            format!("{first_input}.map_keys({func})")
        }
        OperatorKind::Filter => {
            let func = op
                .function
                .as_ref()
                .map(render_expr)
                .unwrap_or_else(|| "|t| true".to_string());
            format!("{first_input}.filter_keys({func})")
        }
        OperatorKind::Sum => {
            let rest: Result<Vec<_>, _> = op.inputs[1..]
                .iter()
                .map(|&i| render_binding(circuit, &op.name, Some(i)))
                .collect();
            let rest = rest?;
            if rest.is_empty() {
                format!("{first_input}.sum(&[])")
            } else {
                format!("{first_input}.sum(&[{}])", rest.join(", "))
            }
        }
        OperatorKind::Negate => format!("{first_input}.neg()"),
        OperatorKind::Distinct => format!("{first_input}.distinct()"),
        OperatorKind::Source | OperatorKind::Sink => {
            return Err(CompileError::Ir(circuit_ir::CircuitError::NoOperatorForNode {
                node: op.name.clone(),
            }))
        }
    };

    let _ = writeln!(out, "        let {name}: Stream<{ty}> = {rhs};", name = op.name);
    Ok(())
}

fn render_binding(circuit: &Circuit, operator: &str, id: Option<OperatorId>) -> Result<String, CompileError> {
    let id = id.ok_or_else(|| {
        CompileError::Ir(circuit_ir::CircuitError::MissingInput {
            operator: operator.to_string(),
        })
    })?;
    Ok(circuit.get(id)?.name.clone())
}

fn render_indexes(indexes: &[usize]) -> String {
    let fields = indexes
        .iter()
        .map(|i| format!("t.{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("|t| ({fields})")
}

fn emit_driver(out: &mut String, circuit: &Circuit) -> Result<(), CompileError> {
    let arg_names: Vec<String> = (0..circuit.sources().len()).map(|i| format!("arg_{i}")).collect();
    let _ = writeln!(out, "    move |{}| {{", arg_names.join(", "));
    for (i, &source) in circuit.sources().iter().enumerate() {
        let op = circuit.get(source)?;
        let _ = writeln!(out, "        *{}_cell.borrow_mut() = {};", op.name, arg_names[i]);
    }
    let _ = writeln!(out, "        root.step().unwrap();");
    let sink_tuple: Result<Vec<_>, _> = circuit
        .sinks()
        .iter()
        .map(|&id| circuit.get(id).map(|op| format!("{}_cell.borrow().clone()", op.name)))
        .collect();
    let sink_tuple = sink_tuple?;
    let _ = writeln!(out, "        ({})", sink_tuple.join(", "));
    Ok(())
}

fn render_type(ty: &Type, options: &CompileOptions) -> String {
    match ty {
        Type::Bool { nullable, .. } => wrap_nullable("bool", *nullable),
        Type::SignedInt { width, nullable, .. } => {
            let base = match width {
                circuit_ir::IntWidth::W8 => "i8",
                circuit_ir::IntWidth::W16 => "i16",
                circuit_ir::IntWidth::W32 => "i32",
                circuit_ir::IntWidth::W64 => "i64",
            };
            wrap_nullable(base, *nullable)
        }
        Type::Float { nullable, .. } => wrap_nullable("OrderedFloat<f32>", *nullable),
        Type::Double { nullable, .. } => wrap_nullable("OrderedFloat<f64>", *nullable),
        Type::String { nullable, .. } => wrap_nullable("String", *nullable),
        Type::Tuple { elements, .. } => {
            if elements.len() == 1 {
                // Arity-1 tuples are semantically identical to their sole
                // element when emitted.
                render_type(&elements[0], options)
            } else {
                let rendered: Vec<_> = elements.iter().map(|t| render_type(t, options)).collect();
                format!("({})", rendered.join(", "))
            }
        }
        Type::Struct { name, fields, .. } => {
            let _ = fields;
            name.clone()
        }
        Type::Stream { element, .. } => format!("Stream<{}>", render_type(element, options)),
        Type::User { name, args, .. } => {
            if let Some((key, weight)) = ty.as_zset() {
                let _ = weight;
                format!("{}<{}, {}>", options.zset_type_name, render_type(key, options), options.weight_type_name)
            } else if args.is_empty() {
                name.clone()
            } else {
                let rendered: Vec<_> = args.iter().map(|t| render_type(t, options)).collect();
                format!("{}<{}>", name, rendered.join(", "))
            }
        }
    }
}

fn wrap_nullable(base: &str, nullable: bool) -> String {
    if nullable {
        format!("Option<{base}>")
    } else {
        base.to_string()
    }
}

fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Closure { body, .. } => format!("|t| {}", render_expr(body)),
        Expr::Field { index, .. } => format!("t.{index}"),
        Expr::Literal { text, .. } => text.clone(),
        Expr::Unary { op, operand, .. } => {
            let sym = match op {
                UnaryOp::Not => "!",
                UnaryOp::Plus => "+",
                UnaryOp::Neg => "-",
            };
            format!("({sym}{})", render_expr(operand))
        }
        Expr::Binary { op, left, right, .. } => {
            let sym = match op {
                BinaryOp::Mul => "*",
                BinaryOp::Div => "/",
                BinaryOp::Rem => "%",
                BinaryOp::Add => "+",
                BinaryOp::Sub => "-",
                BinaryOp::Lt => "<",
                BinaryOp::Gt => ">",
                BinaryOp::Le => "<=",
                BinaryOp::Ge => ">=",
                BinaryOp::Eq => "==",
                BinaryOp::Ne => "!=",
                BinaryOp::And => "&&",
                BinaryOp::Or => "||",
                BinaryOp::Dot => ".",
                BinaryOp::BitAnd => "&",
                BinaryOp::BitOr => "|",
                BinaryOp::BitXor => "^",
            };
            if matches!(op, BinaryOp::Dot) {
                format!("{}.{}", render_expr(left), render_expr(right))
            } else {
                format!("({} {sym} {})", render_expr(left), render_expr(right))
            }
        }
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use circuit_ir::{IntWidth, Operator};

    fn bool_zset() -> Type {
        Type::zset(Type::Tuple {
            elements: vec![Type::Bool {
                nullable: false,
                origin: None,
            }],
            origin: None,
        })
    }

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
    fn emits_all_five_parts_for_a_single_source_single_sink_circuit() {
        let mut circuit = Circuit::new("v");
        let src_id = {
            let id_gen = circuit.id_gen();
            Operator::new(id_gen, None, OperatorKind::Source, None, i32_zset(), None)
        };
        let src_id = circuit.add_operator(src_id).unwrap();
        circuit.register_endpoint("t".to_string(), src_id).unwrap();

        let sink = {
            let id_gen = circuit.id_gen();
            let mut op = Operator::new(id_gen, None, OperatorKind::Sink, None, i32_zset(), Some("v".to_string()));
            op.add_input(src_id);
            op
        };
        let sink_id = circuit.add_operator(sink).unwrap();
        circuit.register_endpoint("v".to_string(), sink_id).unwrap();

        let text = emit(&circuit, &CompileOptions::default()).unwrap();
        assert!(text.contains("pub fn build_v"));
        assert!(text.contains("Root::build"));
        assert!(text.contains("add_source"));
        assert!(text.contains(".inspect("));
        assert!(text.contains("move |arg_0|"));
    }

    #[test]
    fn renders_project_function_from_indexes_when_no_expression_is_attached() {
        let ty = bool_zset();
        assert!(render_type(&ty, &CompileOptions::default()).starts_with("ZSetHashMap"));
    }

    #[test]
    fn arity_one_tuple_renders_as_its_sole_element() {
        let tuple = Type::Tuple {
            elements: vec![Type::Bool {
                nullable: false,
                origin: None,
            }],
            origin: None,
        };
        assert_eq!(render_type(&tuple, &CompileOptions::default()), "bool");
    }
}
