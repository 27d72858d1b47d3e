//! The tree-walking evaluator. Every visit produces an [`Outcome`]: the
//! language's own control-flow signal, kept separate from `Result`, which
//! carries only pipeline failures (a `WispError`).

use std::rc::Rc;

use wisp_par::{BinOp, Expr, NumberLit, UnOp};
use wisp_util::{Span, TraceFrame, WispError};

use crate::builtins::{self, Builtin, ScriptRunner};
use crate::context::Context;
use crate::value::{FunctionValue, NumberValue, Value};

/// What evaluating one AST node produced, distinct from a pipeline error.
/// `Continue`/`Break` and `Return` unwind the statement list they were
/// raised in; a loop intercepts the first two, a function call intercepts
/// all three (see [`Interpreter::call_function`]).
pub enum Outcome {
    Normal(Value),
    Return(Value),
    Continue,
    Break,
}

impl Outcome {
    fn into_value_or_null(self) -> Value {
        match self {
            Outcome::Normal(v) | Outcome::Return(v) => v,
            Outcome::Continue | Outcome::Break => Value::null(),
        }
    }
}

pub struct Interpreter {
    globals: Rc<Context>,
    call_stack: Vec<TraceFrame>,
}

impl Interpreter {
    pub fn new(globals: Rc<Context>) -> Self {
        Self { globals, call_stack: Vec::new() }
    }

    fn current_display_name(&self) -> String {
        self.call_stack.last().map(|f| f.display_name.clone()).unwrap_or_else(|| "<program>".into())
    }

    fn runtime_error(&self, span: &Span, details: impl Into<String>) -> WispError {
        let mut traceback = self.call_stack.clone();
        traceback.push(TraceFrame {
            file_name: span.start.file_name.to_string(),
            line: span.start.line,
            display_name: self.current_display_name(),
        });
        WispError::Runtime { span: span.clone(), details: details.into(), traceback }
    }

    /// Evaluates a whole program against `ctx`, collapsing a top-level
    /// `break`/`continue` to `Null` the way the original interpreter's
    /// `run()` silently discards the loop-control flags it never reads.
    pub fn run_program(&mut self, program: &Expr, ctx: &Rc<Context>) -> Result<Value, WispError> {
        Ok(self.eval(program, ctx)?.into_value_or_null())
    }

    pub fn eval(&mut self, expr: &Expr, ctx: &Rc<Context>) -> Result<Outcome, WispError> {
        match expr {
            Expr::Number { value, .. } => Ok(Outcome::Normal(Value::Number(match value {
                NumberLit::Int(i) => NumberValue::Int(*i),
                NumberLit::Float(f) => NumberValue::Float(*f),
            }))),

            Expr::Str { value, .. } => Ok(Outcome::Normal(Value::Str(Rc::from(value.as_str())))),

            Expr::ListLit { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    match self.eval(element, ctx)? {
                        Outcome::Normal(v) => values.push(v),
                        other => return Ok(other),
                    }
                }
                Ok(Outcome::Normal(Value::list(values)))
            }

            Expr::VarAccess { name, span } => match ctx.get(name) {
                Some(value) => Ok(Outcome::Normal(value)),
                None => Err(self.runtime_error(span, format!("'{name}' is not defined"))),
            },

            Expr::VarAssign { name, value, .. } => match self.eval(value, ctx)? {
                Outcome::Normal(v) => {
                    ctx.set_local(name, v.clone());
                    Ok(Outcome::Normal(v))
                }
                other => Ok(other),
            },

            Expr::BinaryOp { left, op, right, span } => {
                let left = match self.eval(left, ctx)? {
                    Outcome::Normal(v) => v,
                    other => return Ok(other),
                };
                let right = match self.eval(right, ctx)? {
                    Outcome::Normal(v) => v,
                    other => return Ok(other),
                };
                let result = match op {
                    BinOp::Add => left.added_to(&right),
                    BinOp::Sub => left.subtracted_by(&right),
                    BinOp::Mul => left.multiplied_by(&right),
                    BinOp::Div => left.divided_by(&right),
                    BinOp::Power => left.powered_by(&right),
                    BinOp::Eq => left.comparison_eq(&right),
                    BinOp::NotEq => left.comparison_ne(&right),
                    BinOp::Lt => left.comparison_lt(&right),
                    BinOp::Gt => left.comparison_gt(&right),
                    BinOp::Lte => left.comparison_lte(&right),
                    BinOp::Gte => left.comparison_gte(&right),
                    BinOp::And => left.anded_by(&right),
                    BinOp::Or => left.ored_by(&right),
                };
                result.map(Outcome::Normal).map_err(|details| self.runtime_error(span, details))
            }

            Expr::UnaryOp { op, operand, span } => {
                let value = match self.eval(operand, ctx)? {
                    Outcome::Normal(v) => v,
                    other => return Ok(other),
                };
                let result = match op {
                    UnOp::Neg => value.multiplied_by(&Value::int(-1)),
                    UnOp::Pos => Ok(value),
                    UnOp::Not => value.notted(),
                };
                result.map(Outcome::Normal).map_err(|details| self.runtime_error(span, details))
            }

            Expr::If { cases, else_case, .. } => {
                for (condition, body, should_return_null) in cases {
                    let condition_value = match self.eval(condition, ctx)? {
                        Outcome::Normal(v) => v,
                        other => return Ok(other),
                    };
                    if condition_value.is_true() {
                        return Ok(match self.eval(body, ctx)? {
                            Outcome::Normal(v) => {
                                Outcome::Normal(if *should_return_null { Value::null() } else { v })
                            }
                            other => other,
                        });
                    }
                }
                if let Some((body, should_return_null)) = else_case {
                    return Ok(match self.eval(body, ctx)? {
                        Outcome::Normal(v) => {
                            Outcome::Normal(if *should_return_null { Value::null() } else { v })
                        }
                        other => other,
                    });
                }
                Ok(Outcome::Normal(Value::null()))
            }

            Expr::For { var_name, start, end, step, body, should_return_null, .. } => {
                let start_value = match self.eval(start, ctx)? {
                    Outcome::Normal(Value::Number(n)) => n,
                    Outcome::Normal(_) => return Err(self.runtime_error(expr.span(), "Illegal operation")),
                    other => return Ok(other),
                };
                let end_value = match self.eval(end, ctx)? {
                    Outcome::Normal(Value::Number(n)) => n,
                    Outcome::Normal(_) => return Err(self.runtime_error(expr.span(), "Illegal operation")),
                    other => return Ok(other),
                };
                let step_value = match step {
                    Some(step) => match self.eval(step, ctx)? {
                        Outcome::Normal(Value::Number(n)) => n,
                        Outcome::Normal(_) => return Err(self.runtime_error(expr.span(), "Illegal operation")),
                        other => return Ok(other),
                    },
                    None => NumberValue::Int(1),
                };

                let ascending = step_value.to_f64() >= 0.0;
                let mut i = start_value;
                let mut elements = Vec::new();

                while if ascending { i.to_f64() < end_value.to_f64() } else { i.to_f64() > end_value.to_f64() } {
                    ctx.set_local(var_name, Value::Number(i));
                    i = i.add(step_value);

                    match self.eval(body, ctx)? {
                        Outcome::Normal(v) => elements.push(v),
                        Outcome::Continue => continue,
                        Outcome::Break => break,
                        other @ Outcome::Return(_) => return Ok(other),
                    }
                }

                Ok(Outcome::Normal(if *should_return_null { Value::null() } else { Value::list(elements) }))
            }

            Expr::While { condition, body, should_return_null, .. } => {
                let mut elements = Vec::new();
                loop {
                    let condition_value = match self.eval(condition, ctx)? {
                        Outcome::Normal(v) => v,
                        other => return Ok(other),
                    };
                    if !condition_value.is_true() {
                        break;
                    }

                    match self.eval(body, ctx)? {
                        Outcome::Normal(v) => elements.push(v),
                        Outcome::Continue => continue,
                        Outcome::Break => break,
                        other @ Outcome::Return(_) => return Ok(other),
                    }
                }
                Ok(Outcome::Normal(if *should_return_null { Value::null() } else { Value::list(elements) }))
            }

            Expr::FuncDef { name, params, body, auto_return, .. } => {
                let func = Rc::new(FunctionValue {
                    name: name.clone().unwrap_or_else(|| "<anonymous>".to_string()),
                    params: params.clone(),
                    body: Rc::new((**body).clone()),
                    auto_return: *auto_return,
                    closure: ctx.clone(),
                });
                if let Some(name) = name {
                    ctx.set_local(name, Value::Function(func.clone()));
                }
                Ok(Outcome::Normal(Value::Function(func)))
            }

            Expr::Call { callee, args, span } => {
                let callee_value = match self.eval(callee, ctx)? {
                    Outcome::Normal(v) => v,
                    other => return Ok(other),
                };
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    match self.eval(arg, ctx)? {
                        Outcome::Normal(v) => arg_values.push(v),
                        other => return Ok(other),
                    }
                }
                self.call_value(&callee_value, arg_values, span).map(Outcome::Normal)
            }

            Expr::Return { value, .. } => match value {
                Some(value) => match self.eval(value, ctx)? {
                    Outcome::Normal(v) => Ok(Outcome::Return(v)),
                    other => Ok(other),
                },
                None => Ok(Outcome::Return(Value::null())),
            },

            Expr::Continue { .. } => Ok(Outcome::Continue),
            Expr::Break { .. } => Ok(Outcome::Break),

            Expr::Block { statements, .. } => {
                let mut values = Vec::with_capacity(statements.len());
                for statement in statements {
                    match self.eval(statement, ctx)? {
                        Outcome::Normal(v) => values.push(v),
                        other => return Ok(other),
                    }
                }
                Ok(Outcome::Normal(Value::list(values)))
            }
        }
    }

    fn call_value(&mut self, callee: &Value, args: Vec<Value>, span: &Span) -> Result<Value, WispError> {
        match callee {
            Value::Function(func) => self.call_function(func, args, span),
            Value::BuiltIn(builtin) => self.call_builtin(*builtin, args, span),
            _ => Err(self.runtime_error(span, "Illegal operation")),
        }
    }

    fn check_arity(&self, name: &str, expected: usize, got: usize, span: &Span) -> Result<(), WispError> {
        if got > expected {
            return Err(self.runtime_error(span, format!("{} too many arguments passed into '{name}'", got - expected)));
        }
        if got < expected {
            return Err(self.runtime_error(span, format!("{} too few arguments passed into '{name}'", expected - got)));
        }
        Ok(())
    }

    fn call_function(&mut self, func: &Rc<FunctionValue>, args: Vec<Value>, span: &Span) -> Result<Value, WispError> {
        self.check_arity(&func.name, func.params.len(), args.len(), span)?;

        let exec_ctx = Context::new(func.name.clone(), Some(func.closure.clone()));
        for (param, arg) in func.params.iter().zip(args) {
            exec_ctx.set_local(param, arg);
        }

        self.call_stack.push(TraceFrame {
            file_name: span.start.file_name.to_string(),
            line: span.start.line,
            display_name: func.name.clone(),
        });
        let outcome = self.eval(&func.body, &exec_ctx);
        self.call_stack.pop();

        Ok(match outcome? {
            Outcome::Return(v) => v,
            Outcome::Normal(v) => if func.auto_return { v } else { Value::null() },
            // A stray `continue`/`break` with no enclosing loop inside the
            // function body stops there rather than escaping the call.
            Outcome::Continue | Outcome::Break => Value::null(),
        })
    }

    fn call_builtin(&mut self, builtin: Builtin, args: Vec<Value>, span: &Span) -> Result<Value, WispError> {
        self.check_arity(builtin.name(), builtin.arg_names().len(), args.len(), span)?;

        self.call_stack.push(TraceFrame {
            file_name: span.start.file_name.to_string(),
            line: span.start.line,
            display_name: builtin.name().to_string(),
        });
        let result = builtins::call(builtin, &args, span, self);
        self.call_stack.pop();

        result.map_err(|details| self.runtime_error(span, details))
    }
}

impl ScriptRunner for Interpreter {
    fn run_file(&mut self, file_name: &str, source: &str) -> Result<(), String> {
        crate::run(file_name, source, &self.globals).map(|_| ()).map_err(|e| e.as_string())
    }
}
