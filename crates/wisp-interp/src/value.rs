//! The runtime value model. There is no distinct "null" type: absence is
//! represented the same way the interpreter this crate descends from
//! represents it, as `Number(0)` (see [`Value::null`]).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wisp_par::Expr;

use crate::builtins::Builtin;
use crate::context::Context;

/// A numeric value. Addition/subtraction/multiplication stay integral when
/// both operands are integral; division always produces a float (true
/// division), matching the source language's `/` operator.
#[derive(Clone, Copy, Debug)]
pub enum NumberValue {
    Int(i64),
    Float(f64),
}

impl NumberValue {
    pub fn to_f64(self) -> f64 {
        match self {
            NumberValue::Int(i) => i as f64,
            NumberValue::Float(f) => f,
        }
    }

    pub fn is_truthy(self) -> bool {
        self.to_f64() != 0.0
    }

    /// Truncates toward zero, the way Python's `int(...)` does.
    fn to_int(self) -> i64 {
        self.to_f64() as i64
    }

    pub fn add(self, other: NumberValue) -> NumberValue {
        match (self, other) {
            (NumberValue::Int(a), NumberValue::Int(b)) => NumberValue::Int(a + b),
            _ => NumberValue::Float(self.to_f64() + other.to_f64()),
        }
    }

    pub fn sub(self, other: NumberValue) -> NumberValue {
        match (self, other) {
            (NumberValue::Int(a), NumberValue::Int(b)) => NumberValue::Int(a - b),
            _ => NumberValue::Float(self.to_f64() - other.to_f64()),
        }
    }

    pub fn mul(self, other: NumberValue) -> NumberValue {
        match (self, other) {
            (NumberValue::Int(a), NumberValue::Int(b)) => NumberValue::Int(a * b),
            _ => NumberValue::Float(self.to_f64() * other.to_f64()),
        }
    }

    /// Always true division, even for two integers.
    pub fn div(self, other: NumberValue) -> NumberValue {
        NumberValue::Float(self.to_f64() / other.to_f64())
    }

    pub fn pow(self, other: NumberValue) -> NumberValue {
        match (self, other) {
            (NumberValue::Int(a), NumberValue::Int(b)) if b >= 0 => {
                NumberValue::Int(a.pow(b as u32))
            }
            _ => NumberValue::Float(self.to_f64().powf(other.to_f64())),
        }
    }

    fn bool_to_int(value: bool) -> NumberValue {
        NumberValue::Int(value as i64)
    }

    pub fn eq(self, other: NumberValue) -> NumberValue {
        Self::bool_to_int(self.to_f64() == other.to_f64())
    }

    pub fn ne(self, other: NumberValue) -> NumberValue {
        Self::bool_to_int(self.to_f64() != other.to_f64())
    }

    pub fn lt(self, other: NumberValue) -> NumberValue {
        Self::bool_to_int(self.to_f64() < other.to_f64())
    }

    pub fn gt(self, other: NumberValue) -> NumberValue {
        Self::bool_to_int(self.to_f64() > other.to_f64())
    }

    pub fn lte(self, other: NumberValue) -> NumberValue {
        Self::bool_to_int(self.to_f64() <= other.to_f64())
    }

    pub fn gte(self, other: NumberValue) -> NumberValue {
        Self::bool_to_int(self.to_f64() >= other.to_f64())
    }

    /// Python-style non-boolean short circuit: picks whichever operand
    /// decides the outcome, then truncates that operand to an int, rather
    /// than collapsing to a plain 0/1 boolean.
    pub fn and(self, other: NumberValue) -> NumberValue {
        NumberValue::Int(if !self.is_truthy() { self.to_int() } else { other.to_int() })
    }

    pub fn or(self, other: NumberValue) -> NumberValue {
        NumberValue::Int(if self.is_truthy() { self.to_int() } else { other.to_int() })
    }

    pub fn not(self) -> NumberValue {
        Self::bool_to_int(!self.is_truthy())
    }

    pub fn neg(self) -> NumberValue {
        self.mul(NumberValue::Int(-1))
    }
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberValue::Int(i) => write!(f, "{i}"),
            NumberValue::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{x:.1}"),
            NumberValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// A captured function body, shared between every [`Value::Function`] copy
/// that was spawned from the same `def`.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Expr>,
    pub auto_return: bool,
    /// The scope `def` was evaluated in, captured for lexical lookups of
    /// names the body doesn't bind itself.
    pub closure: Rc<Context>,
}

#[derive(Clone, Debug)]
pub enum Value {
    Number(NumberValue),
    Str(Rc<str>),
    /// Shared, mutable list storage: copying a `Value::List` clones the
    /// `Rc`, not the buffer, matching the source language's list-aliasing
    /// semantics (`list_b = list_a` makes both names see the same list).
    List(Rc<RefCell<Vec<Value>>>),
    Function(Rc<FunctionValue>),
    BuiltIn(Builtin),
}

impl Value {
    pub fn null() -> Value {
        Value::Number(NumberValue::Int(0))
    }

    pub fn bool_value(value: bool) -> Value {
        Value::Number(NumberValue::Int(value as i64))
    }

    pub fn int(value: i64) -> Value {
        Value::Number(NumberValue::Int(value))
    }

    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Function(_) | Value::BuiltIn(_) => "function",
        }
    }

    /// Every type but `Number` (nonzero) and `String` (nonempty) is falsy
    /// in a condition; lists are falsy regardless of contents, since the
    /// source language's base value type never overrides `is_true` and
    /// `List` doesn't either.
    pub fn is_true(&self) -> bool {
        match self {
            Value::Number(n) => n.is_truthy(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Function(_) | Value::BuiltIn(_) => false,
        }
    }

    /// The string a `print`/`print_ret` call produces: no quotes around
    /// strings, brackets around lists (e.g. `[0, 1, 2]`). The source
    /// language this descends from actually splits this into an unbracketed
    /// `__str__` and a bracketed `__repr__` and has `print` call `__str__`;
    /// bracketing here instead is a deliberate fix so a printed list reads
    /// unambiguously (see DESIGN.md).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Number(n) => n.to_string(),
            Value::Str(s) => s.to_string(),
            Value::List(items) => format!(
                "[{}]",
                items.borrow().iter().map(Value::to_display_string).collect::<Vec<_>>().join(", ")
            ),
            Value::Function(func) => format!("<function {}>", func.name),
            Value::BuiltIn(b) => format!("<built-in function {}>", b.name()),
        }
    }

    /// Same as [`Value::to_display_string`] but quotes strings, for echoing
    /// a standalone result (e.g. in a REPL) where a bare string value and
    /// its text content could otherwise be confused.
    pub fn to_repr_string(&self) -> String {
        match self {
            Value::Str(s) => format!("\"{s}\""),
            Value::List(items) => format!(
                "[{}]",
                items.borrow().iter().map(Value::to_repr_string).collect::<Vec<_>>().join(", ")
            ),
            other => other.to_display_string(),
        }
    }
}

/// The outcome of a binary/unary value operation: either the resulting
/// value, or a message describing why the operation isn't defined for
/// these operands (the caller attaches the span).
pub type OpResult = Result<Value, String>;

impl Value {
    pub fn added_to(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.add(*b))),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(Rc::from(format!("{a}{b}").as_str()))),
            (Value::List(items), other) => {
                let mut cloned = items.borrow().clone();
                cloned.push(other.clone());
                Ok(Value::list(cloned))
            }
            _ => Err(illegal_operation()),
        }
    }

    pub fn subtracted_by(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.sub(*b))),
            (Value::List(items), Value::Number(NumberValue::Int(index))) => {
                let mut cloned = items.borrow().clone();
                let index = normalize_index(*index, cloned.len())
                    .ok_or_else(|| "Element at this index could not be removed from list because index is out of bounds".to_string())?;
                cloned.remove(index);
                Ok(Value::list(cloned))
            }
            _ => Err(illegal_operation()),
        }
    }

    pub fn multiplied_by(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.mul(*b))),
            (Value::Str(s), Value::Number(NumberValue::Int(n))) => {
                Ok(Value::Str(Rc::from(s.repeat((*n).max(0) as usize).as_str())))
            }
            (Value::List(a), Value::List(b)) => {
                let mut cloned = a.borrow().clone();
                cloned.extend(b.borrow().iter().cloned());
                Ok(Value::list(cloned))
            }
            _ => Err(illegal_operation()),
        }
    }

    pub fn divided_by(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(_), Value::Number(NumberValue::Int(0))) => {
                Err("Division by zero".to_string())
            }
            (Value::Number(_), Value::Number(NumberValue::Float(f))) if *f == 0.0 => {
                Err("Division by zero".to_string())
            }
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.div(*b))),
            (Value::List(items), Value::Number(NumberValue::Int(index))) => {
                let items = items.borrow();
                let index = normalize_index(*index, items.len())
                    .ok_or_else(|| "Element at this index could not be retrieved from list because index is out of bounds".to_string())?;
                Ok(items[index].clone())
            }
            _ => Err(illegal_operation()),
        }
    }

    pub fn powered_by(&self, other: &Value) -> OpResult {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.pow(*b))),
            _ => Err(illegal_operation()),
        }
    }

    pub fn comparison_eq(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::eq)
    }
    pub fn comparison_ne(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::ne)
    }
    pub fn comparison_lt(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::lt)
    }
    pub fn comparison_gt(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::gt)
    }
    pub fn comparison_lte(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::lte)
    }
    pub fn comparison_gte(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::gte)
    }

    pub fn anded_by(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::and)
    }
    pub fn ored_by(&self, other: &Value) -> OpResult {
        numeric_comparison(self, other, NumberValue::or)
    }

    /// `not` only applies to numbers, matching the fact that only `Number`
    /// overrides `notted` in the value hierarchy this descends from.
    pub fn notted(&self) -> OpResult {
        match self {
            Value::Number(n) => Ok(Value::Number(n.not())),
            _ => Err(illegal_operation()),
        }
    }
}

fn numeric_comparison(a: &Value, b: &Value, op: fn(NumberValue, NumberValue) -> NumberValue) -> OpResult {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(op(*a, *b))),
        _ => Err(illegal_operation()),
    }
}

fn illegal_operation() -> String {
    "Illegal operation".to_string()
}

/// Python list indices accept negatives counting from the end; this mirrors
/// `list.pop`/`list.__getitem__`'s bounds check rather than panicking.
fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let resolved = if index < 0 { index + len as i64 } else { index };
    if resolved < 0 || resolved as usize >= len {
        None
    } else {
        Some(resolved as usize)
    }
}
