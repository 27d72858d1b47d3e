//! AST node types. Every node carries the [`Span`] it occupies in the
//! source; a parent's span always contains every one of its children's.

use wisp_util::Span;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberLit {
    Int(i64),
    Float(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Power,
    Eq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    /// Unary `-`: numeric negation.
    Neg,
    /// Unary `+`: parses but leaves the operand's value unchanged.
    Pos,
    /// `not`: truthiness inversion (yields `Number(0)` or `Number(1)`).
    Not,
}

/// One `if`/`elif` arm: condition, body, and whether the body was a
/// multi-line block (in which case the arm's own value is discarded and
/// `Null` is yielded instead, matching the block-vs-expression distinction
/// the grammar makes throughout).
pub type IfCase = (Expr, Expr, bool);

#[derive(Clone, Debug)]
pub enum Expr {
    Number { value: NumberLit, span: Span },
    Str { value: String, span: Span },
    ListLit { elements: Vec<Expr>, span: Span },
    VarAccess { name: String, span: Span },
    VarAssign { name: String, value: Box<Expr>, span: Span },
    BinaryOp { left: Box<Expr>, op: BinOp, right: Box<Expr>, span: Span },
    UnaryOp { op: UnOp, operand: Box<Expr>, span: Span },
    If { cases: Vec<IfCase>, else_case: Option<(Box<Expr>, bool)>, span: Span },
    For {
        var_name: String,
        start: Box<Expr>,
        end: Box<Expr>,
        step: Option<Box<Expr>>,
        body: Box<Expr>,
        should_return_null: bool,
        span: Span,
    },
    While { condition: Box<Expr>, body: Box<Expr>, should_return_null: bool, span: Span },
    FuncDef { name: Option<String>, params: Vec<String>, body: Box<Expr>, auto_return: bool, span: Span },
    Call { callee: Box<Expr>, args: Vec<Expr>, span: Span },
    Return { value: Option<Box<Expr>>, span: Span },
    Continue { span: Span },
    Break { span: Span },
    /// A sequence of statements, produced both for a whole program and for
    /// any multi-line block body (`if ... then \n ... end`, etc).
    Block { statements: Vec<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Str { span, .. }
            | Expr::ListLit { span, .. }
            | Expr::VarAccess { span, .. }
            | Expr::VarAssign { span, .. }
            | Expr::BinaryOp { span, .. }
            | Expr::UnaryOp { span, .. }
            | Expr::If { span, .. }
            | Expr::For { span, .. }
            | Expr::While { span, .. }
            | Expr::FuncDef { span, .. }
            | Expr::Call { span, .. }
            | Expr::Return { span, .. }
            | Expr::Continue { span }
            | Expr::Break { span }
            | Expr::Block { span, .. } => span,
        }
    }
}
