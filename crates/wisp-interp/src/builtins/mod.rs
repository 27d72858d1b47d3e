//! Built-in functions: the fixed set of names every global scope starts
//! with, dispatched by name the way the original interpreter dispatches to
//! an `execute_<name>` method.

use std::io::{self, Write};
use std::rc::Rc;

use wisp_util::Span;

use crate::value::{NumberValue, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Print,
    PrintRet,
    Input,
    InputInt,
    Clear,
    IsNumber,
    IsString,
    IsList,
    IsFunction,
    Append,
    Pop,
    Extend,
    Len,
    Insert,
    ReplaceIndex,
    Run,
}

impl Builtin {
    /// The dispatch name used for error messages and `Display`; distinct
    /// from the *global* name a builtin is bound under (`clear` and `cls`
    /// both resolve to [`Builtin::Clear`]).
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::PrintRet => "print_ret",
            Builtin::Input => "input",
            Builtin::InputInt => "input_int",
            Builtin::Clear => "clear",
            Builtin::IsNumber => "is_number",
            Builtin::IsString => "is_string",
            Builtin::IsList => "is_list",
            Builtin::IsFunction => "is_function",
            Builtin::Append => "append",
            Builtin::Pop => "pop",
            Builtin::Extend => "extend",
            Builtin::Len => "len",
            Builtin::Insert => "insert",
            Builtin::ReplaceIndex => "replace_index",
            Builtin::Run => "run",
        }
    }

    /// Parameter names, in order. `input_int`'s arity is fixed here to the
    /// empty list the original source clearly intended: it sets
    /// `execute_input.arg_names` twice and never actually binds
    /// `execute_input_int.arg_names`, a latent crash bug in the source this
    /// language was distilled from (documented in DESIGN.md).
    pub fn arg_names(&self) -> &'static [&'static str] {
        match self {
            Builtin::Print => &["value"],
            Builtin::PrintRet => &["value"],
            Builtin::Input => &[],
            Builtin::InputInt => &[],
            Builtin::Clear => &[],
            Builtin::IsNumber => &["value"],
            Builtin::IsString => &["value"],
            Builtin::IsList => &["value"],
            Builtin::IsFunction => &["value"],
            Builtin::Append => &["list", "value"],
            Builtin::Pop => &["list", "index"],
            Builtin::Extend => &["listA", "listB"],
            Builtin::Len => &["list"],
            Builtin::Insert => &["list", "index", "value"],
            Builtin::ReplaceIndex => &["list", "index", "value"],
            Builtin::Run => &["filename"],
        }
    }

    /// All global names a fresh scope should bind, paired with the builtin
    /// they dispatch to. `clear`/`cls` deliberately alias the same variant.
    pub fn globals() -> &'static [(&'static str, Builtin)] {
        &[
            ("print", Builtin::Print),
            ("print_ret", Builtin::PrintRet),
            ("input", Builtin::Input),
            ("input_int", Builtin::InputInt),
            ("clear", Builtin::Clear),
            ("cls", Builtin::Clear),
            ("is_num", Builtin::IsNumber),
            ("is_str", Builtin::IsString),
            ("is_list", Builtin::IsList),
            ("is_function", Builtin::IsFunction),
            ("append", Builtin::Append),
            ("pop", Builtin::Pop),
            ("extend", Builtin::Extend),
            ("len", Builtin::Len),
            ("insert", Builtin::Insert),
            ("replace_index", Builtin::ReplaceIndex),
            ("run", Builtin::Run),
        ]
    }
}

/// What a builtin needs to run a nested script via the `run` builtin,
/// without `wisp-interp`'s `builtins` module depending back on its own
/// `run` entry point (which lives in `lib.rs` and itself uses builtins).
pub trait ScriptRunner {
    fn run_file(&mut self, file_name: &str, source: &str) -> Result<(), String>;
}

pub fn call(
    builtin: Builtin,
    args: &[Value],
    _call_span: &Span,
    runner: &mut dyn ScriptRunner,
) -> Result<Value, String> {
    match builtin {
        Builtin::Print => {
            println!("{}", args[0].to_display_string());
            Ok(Value::null())
        }
        Builtin::PrintRet => Ok(Value::Str(Rc::from(args[0].to_display_string().as_str()))),
        Builtin::Input => {
            let mut line = String::new();
            io::stdin().read_line(&mut line).map_err(|e| e.to_string())?;
            Ok(Value::Str(Rc::from(line.trim_end_matches('\n').trim_end_matches('\r'))))
        }
        Builtin::InputInt => loop {
            let mut line = String::new();
            io::stdin().read_line(&mut line).map_err(|e| e.to_string())?;
            let trimmed = line.trim();
            match trimmed.parse::<i64>() {
                Ok(n) => return Ok(Value::int(n)),
                Err(_) => println!("'{trimmed}' must be an integer. Try again!"),
            }
        },
        Builtin::Clear => {
            print!("\x1B[2J\x1B[1;1H");
            io::stdout().flush().ok();
            Ok(Value::null())
        }
        Builtin::IsNumber => Ok(Value::bool_value(matches!(args[0], Value::Number(_)))),
        Builtin::IsString => Ok(Value::bool_value(matches!(args[0], Value::Str(_)))),
        Builtin::IsList => Ok(Value::bool_value(matches!(args[0], Value::List(_)))),
        Builtin::IsFunction => {
            Ok(Value::bool_value(matches!(args[0], Value::Function(_) | Value::BuiltIn(_))))
        }
        Builtin::Append => {
            let Value::List(list) = &args[0] else {
                return Err("First argument must be list".into());
            };
            list.borrow_mut().push(args[1].clone());
            Ok(Value::null())
        }
        Builtin::Pop => {
            let Value::List(list) = &args[0] else {
                return Err("First argument must be list".into());
            };
            let Value::Number(NumberValue::Int(index)) = args[1] else {
                return Err("Second argument must be number".into());
            };
            let mut list = list.borrow_mut();
            let index = normalize_index(index, list.len()).ok_or_else(|| {
                "Element at this index could not be removed from the list because index is out of bounds".to_string()
            })?;
            Ok(list.remove(index))
        }
        Builtin::Extend => {
            let (Value::List(a), Value::List(b)) = (&args[0], &args[1]) else {
                return Err(if !matches!(args[0], Value::List(_)) {
                    "First argument must be list".to_string()
                } else {
                    "Second argument must be list".to_string()
                });
            };
            let extension = b.borrow().clone();
            a.borrow_mut().extend(extension);
            Ok(Value::null())
        }
        Builtin::Len => {
            let Value::List(list) = &args[0] else {
                return Err("Argument must be list".into());
            };
            Ok(Value::int(list.borrow().len() as i64))
        }
        Builtin::Insert => {
            let Value::List(list) = &args[0] else {
                return Err("First argument must be list".into());
            };
            let Value::Number(NumberValue::Int(index)) = args[1] else {
                return Err("Second argument must be number".into());
            };
            let mut list = list.borrow_mut();
            let clamped = index.clamp(0, list.len() as i64) as usize;
            list.insert(clamped, args[2].clone());
            Ok(Value::null())
        }
        Builtin::ReplaceIndex => {
            let Value::List(list) = &args[0] else {
                return Err("First argument must be list".into());
            };
            let Value::Number(NumberValue::Int(index)) = args[1] else {
                return Err("Second argument must be number".into());
            };
            let mut list = list.borrow_mut();
            let index = normalize_index(index, list.len()).ok_or_else(|| {
                "Element at this index could not be removed from the list because index is out of bounds".to_string()
            })?;
            list[index] = args[2].clone();
            Ok(Value::null())
        }
        Builtin::Run => {
            let Value::Str(filename) = &args[0] else {
                return Err("Argument must be string".into());
            };
            let script = std::fs::read_to_string(filename.as_ref())
                .map_err(|e| format!("Failed to load script \"{filename}\"\n{e}"))?;
            runner
                .run_file(filename, &script)
                .map_err(|e| format!("Failed to finish executing script \"{filename}\"\n{e}"))?;
            Ok(Value::null())
        }
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoRun;
    impl ScriptRunner for NoRun {
        fn run_file(&mut self, _file_name: &str, _source: &str) -> Result<(), String> {
            Err("not supported in this test".into())
        }
    }

    fn dummy_span() -> Span {
        use std::sync::Arc;
        let pos = wisp_util::Position::new(0, 1, 0, Arc::from("<test>"), Arc::from(""));
        Span::new(pos.clone(), pos)
    }

    #[test]
    fn input_int_bug_is_fixed() {
        assert_eq!(Builtin::InputInt.arg_names(), &[] as &[&str]);
    }

    #[test]
    fn append_mutates_shared_list() {
        let list = Value::list(vec![Value::int(1)]);
        let args = [list.clone(), Value::int(2)];
        call(Builtin::Append, &args, &dummy_span(), &mut NoRun).unwrap();
        let Value::List(items) = &list else { unreachable!() };
        assert_eq!(items.borrow().len(), 2);
    }

    #[test]
    fn len_rejects_non_list() {
        let args = [Value::int(5)];
        let err = call(Builtin::Len, &args, &dummy_span(), &mut NoRun).unwrap_err();
        assert_eq!(err, "Argument must be list");
    }

    #[test]
    fn clear_and_cls_share_one_builtin() {
        let globals = Builtin::globals();
        let clear = globals.iter().find(|(n, _)| *n == "clear").unwrap().1;
        let cls = globals.iter().find(|(n, _)| *n == "cls").unwrap().1;
        assert_eq!(clear, cls);
    }
}
