//! wisp-interp - the tree-walking evaluator: a scope model ([`Context`]), a
//! runtime value model ([`Value`]), the fixed set of global built-ins, and
//! the [`Interpreter`] that ties them together.

pub mod builtins;
pub mod context;
pub mod interpreter;
pub mod value;

pub use builtins::{Builtin, ScriptRunner};
pub use context::Context;
pub use interpreter::{Interpreter, Outcome};
pub use value::{FunctionValue, NumberValue, Value};

use std::rc::Rc;

use wisp_util::WispError;

/// Builds a fresh global scope pre-populated with `Null`/`True`/`False` and
/// every built-in, the way the original interpreter's module-level
/// `global_symbol_table` is seeded once per process.
pub fn new_global_context() -> Rc<Context> {
    let globals = Context::new("<program>", None);
    globals.set_local("Null", Value::null());
    globals.set_local("True", Value::bool_value(true));
    globals.set_local("False", Value::bool_value(false));
    for (name, builtin) in Builtin::globals() {
        globals.set_local(name, Value::BuiltIn(*builtin));
    }
    globals
}

/// Lexes, parses, and evaluates `source` against `globals`, reusing the same
/// scope across calls — including recursive calls made through the `run`
/// builtin — so top-level definitions accumulate the way a REPL session or
/// a chain of `run("other.wisp")` calls expects.
pub fn run(file_name: &str, source: &str, globals: &Rc<Context>) -> Result<Value, WispError> {
    let program = wisp_par::parse(file_name, source)?;
    let mut interpreter = Interpreter::new(globals.clone());
    interpreter.run_program(&program, globals)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A whole program is a statement list, so `run` always hands back a
    /// `List` of every top-level statement's value, never a bare scalar —
    /// even a one-statement program. Tests read the last element, the way
    /// a REPL wanting "the final result" would.
    fn last(value: &Value) -> Value {
        let Value::List(items) = value else { panic!("program result was not a list") };
        items.borrow().last().cloned().expect("program produced no statements")
    }

    #[test]
    fn arithmetic_and_variables() {
        let globals = new_global_context();
        let result = run("<test>", "var x = 2 + 3 * 4\nx", &globals).unwrap();
        assert!(matches!(last(&result), Value::Number(n) if n.to_f64() == 14.0));
    }

    #[test]
    fn division_is_always_float() {
        let globals = new_global_context();
        let result = run("<test>", "4 / 2", &globals).unwrap();
        assert_eq!(last(&result).to_display_string(), "2.0");
    }

    #[test]
    fn lists_are_always_falsy() {
        let globals = new_global_context();
        let result = run("<test>", "if [1, 2, 3] then 1 else 0", &globals).unwrap();
        assert!(matches!(last(&result), Value::Number(n) if n.to_f64() == 0.0));
    }

    #[test]
    fn top_level_variables_persist_across_calls() {
        let globals = new_global_context();
        run("<test>", "var counter = 0", &globals).unwrap();
        run("<test>", "var counter = counter + 1", &globals).unwrap();
        let result = run("<test>", "counter", &globals).unwrap();
        assert!(matches!(last(&result), Value::Number(n) if n.to_f64() == 1.0));
    }

    #[test]
    fn function_definition_and_call() {
        let globals = new_global_context();
        run("<test>", "def add(a, b) -> a + b", &globals).unwrap();
        let result = run("<test>", "add(2, 3)", &globals).unwrap();
        assert!(matches!(last(&result), Value::Number(n) if n.to_f64() == 5.0));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let globals = new_global_context();
        let err = run("<test>", "missing_name", &globals).unwrap_err();
        assert!(matches!(err, WispError::Runtime { .. }));
    }

    #[test]
    fn while_loop_accumulates_list_of_body_values() {
        let globals = new_global_context();
        let result = run(
            "<test>",
            "var i = 0\nvar out = []\nwhile i < 3 then\n  append(out, i)\n  var i = i + 1\nend\nout",
            &globals,
        )
        .unwrap();
        assert_eq!(last(&result).to_display_string(), "[0, 1, 2]");
    }

    #[test]
    fn break_and_continue_inside_for_loop() {
        let globals = new_global_context();
        run(
            "<test>",
            "var out = []\nfor i in 0 to 5 then\n  if i == 2 then continue\n  if i == 4 then break\n  append(out, i)\nend",
            &globals,
        )
        .unwrap();
        let result = run("<test>", "out", &globals).unwrap();
        assert_eq!(last(&result).to_display_string(), "[0, 1, 3]");
    }
}
