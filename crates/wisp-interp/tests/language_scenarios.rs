//! Crate-level interpreter tests for the six reference-scenario scripts:
//! arithmetic, for-accumulation, function calls, nested return-unwinding,
//! while loops, and division-by-zero tracebacks.

use wisp_interp::{new_global_context, run, Value};

fn last_statement(value: &Value) -> Value {
    let Value::List(items) = value else { panic!("program result was not a list") };
    items.borrow().last().cloned().expect("program produced no statements")
}

#[test]
fn scenario_arithmetic_precedence() {
    let globals = new_global_context();
    let result = run("<test>", "var a = 2 + 3 * 4\nprint_ret(a)", &globals).unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "14");
}

#[test]
fn scenario_for_loop_accumulates_into_list() {
    let globals = new_global_context();
    let result = run(
        "<test>",
        "var fs = []\nfor i in 0 to 3 then append(fs, i)\nprint_ret(fs)",
        &globals,
    )
    .unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "[0, 1, 2]");
}

#[test]
fn scenario_function_call_returns_sum() {
    let globals = new_global_context();
    let result = run("<test>", "def add(a, b) -> a + b\nprint_ret(add(7, 8))", &globals).unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "15");
}

#[test]
fn scenario_nested_return_unwinds_through_if() {
    let globals = new_global_context();
    let result = run(
        "<test>",
        "def f()\nif 1 == 1 then\nreturn 42\nend\nreturn 0\nend\nprint_ret(f())",
        &globals,
    )
    .unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "42");
}

#[test]
fn scenario_while_loop_builds_string() {
    let globals = new_global_context();
    let result = run(
        "<test>",
        "var s = \"\"\nvar i = 0\nwhile i < 3 then\nvar s = s + \"x\"\nvar i = i + 1\nend\nprint_ret(s)",
        &globals,
    )
    .unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "xxx");
}

#[test]
fn scenario_division_by_zero_is_a_runtime_error_with_traceback() {
    let globals = new_global_context();
    let err = run("<test>", "print(1 / 0)", &globals).unwrap_err();
    let rendered = err.as_string();
    assert!(rendered.contains("Division by zero"));
    assert!(rendered.starts_with("Traceback"));
}

#[test]
fn assignment_inside_a_function_never_rebinds_the_caller_variable() {
    let globals = new_global_context();
    run("<test>", "var x = 1\ndef shadow()\nvar x = 2\nend\nshadow()", &globals).unwrap();
    let result = run("<test>", "x", &globals).unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "1");
}

#[test]
fn lexical_closure_sees_definition_time_scope() {
    let globals = new_global_context();
    run(
        "<test>",
        "def make_adder(n)\ndef adder(x) -> x + n\nreturn adder\nend",
        &globals,
    )
    .unwrap();
    run("<test>", "var add5 = make_adder(5)", &globals).unwrap();
    let result = run("<test>", "add5(10)", &globals).unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "15");
}

#[test]
fn list_assignment_shares_the_same_backing_storage() {
    let globals = new_global_context();
    run("<test>", "var a = [1, 2]\nvar b = a\nappend(b, 3)", &globals).unwrap();
    let result = run("<test>", "a", &globals).unwrap();
    assert_eq!(last_statement(&result).to_display_string(), "[1, 2, 3]");
}
