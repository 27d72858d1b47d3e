//! Crate-level parser tests covering the span-containment law and a handful
//! of whole-grammar shapes too large to read comfortably as unit tests.

use wisp_par::{parse, Expr};

fn spans_are_contained(expr: &Expr) -> bool {
    let children: Vec<&Expr> = match expr {
        Expr::Number { .. } | Expr::Str { .. } | Expr::VarAccess { .. } | Expr::Continue { .. } | Expr::Break { .. } => {
            vec![]
        }
        Expr::ListLit { elements, .. } | Expr::Block { statements: elements, .. } => elements.iter().collect(),
        Expr::VarAssign { value, .. } | Expr::UnaryOp { operand: value, .. } => vec![value.as_ref()],
        Expr::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        Expr::If { cases, else_case, .. } => {
            let mut v: Vec<&Expr> = cases.iter().flat_map(|(c, b, _)| [c, b]).collect();
            if let Some((body, _)) = else_case {
                v.push(body.as_ref());
            }
            v
        }
        Expr::For { start, end, step, body, .. } => {
            let mut v = vec![start.as_ref(), end.as_ref(), body.as_ref()];
            if let Some(step) = step {
                v.push(step.as_ref());
            }
            v
        }
        Expr::While { condition, body, .. } => vec![condition.as_ref(), body.as_ref()],
        Expr::FuncDef { body, .. } => vec![body.as_ref()],
        Expr::Call { callee, args, .. } => {
            let mut v = vec![callee.as_ref()];
            v.extend(args.iter());
            v
        }
        Expr::Return { value, .. } => value.iter().map(|b| b.as_ref()).collect(),
    };

    children.iter().all(|child| expr.span().contains(child.span()) && spans_are_contained(child))
}

fn parse_ok(src: &str) -> Expr {
    parse("<test>", src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"))
}

#[test]
fn every_node_span_contains_its_children() {
    let programs = [
        "var a = 2 + 3 * 4\nprint(a)",
        "var fs = []\nfor i in 0 to 3 then append(fs, i)\nprint(fs)",
        "def add(a, b) -> a + b\nprint(add(7, 8))",
        "def f()\nif 1 == 1 then\nreturn 42\nend\nreturn 0\nend\nprint(f())",
        "var s = \"\"\nvar i = 0\nwhile i < 3 then\nvar s = s + \"x\"\nvar i = i + 1\nend\nprint(s)",
    ];
    for src in programs {
        let ast = parse_ok(src);
        assert!(spans_are_contained(&ast), "span containment violated for: {src}");
    }
}

#[test]
fn multi_line_if_elif_else_chain() {
    let ast = parse_ok("if a then\nprint(1)\nelif b then\nprint(2)\nelse\nprint(3)\nend");
    let Expr::Block { statements, .. } = ast else { panic!("expected top-level block") };
    assert_eq!(statements.len(), 1);
    let Expr::If { cases, else_case, .. } = &statements[0] else { panic!("expected if expression") };
    assert_eq!(cases.len(), 2);
    assert!(else_case.is_some());
}

#[test]
fn nested_function_definitions_parse() {
    let ast = parse_ok("def outer()\ndef inner() -> 1\nreturn inner()\nend");
    let Expr::Block { statements, .. } = ast else { panic!("expected top-level block") };
    assert!(matches!(statements[0], Expr::FuncDef { .. }));
}

#[test]
fn trailing_garbage_after_program_is_a_syntax_error() {
    let err = parse("<test>", "1 + 1 )").unwrap_err();
    assert!(matches!(err, wisp_util::WispError::InvalidSyntax { .. }));
}

#[test]
fn parser_terminates_on_deeply_nested_parens() {
    let nested = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    let ast = parse("<test>", &nested);
    assert!(ast.is_ok());
}
