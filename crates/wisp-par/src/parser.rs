//! Recursive-descent parser with explicit backtracking at the two grammar
//! points that need it (an optional trailing statement, and the optional
//! expression after `return`). Everywhere else the grammar is LL(1): the
//! next production is chosen by peeking at the current token's keyword,
//! never by speculative parse-and-rewind.

use crate::ast::{BinOp, Expr, IfCase, NumberLit, UnOp};
use wisp_lex::{Keyword, Token, TokenKind};
use wisp_util::{Span, WispError};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        assert!(!tokens.is_empty(), "token stream must at least contain Eof");
        Self { tokens, pos: 0 }
    }

    /// Parses a whole program: a sequence of statements that must consume
    /// every token up to `Eof`.
    pub fn parse(mut self) -> Result<Expr, WispError> {
        let node = self.statements()?;
        if !matches!(self.current().kind, TokenKind::Eof) {
            return Err(self.syntax_error("Expected '+', '-', '*' or '/'"));
        }
        Ok(node)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn save(&self) -> usize {
        self.pos
    }

    fn restore(&mut self, mark: usize) {
        self.pos = mark;
    }

    fn syntax_error(&self, details: &str) -> WispError {
        WispError::InvalidSyntax { span: self.current().span.clone(), details: details.into() }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), WispError> {
        if self.current().matches_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.syntax_error(&format!("Expected '{}'", keyword.as_str())))
        }
    }

    // ------------------------------------------------------------------
    // statements / statement
    // ------------------------------------------------------------------

    fn statements(&mut self) -> Result<Expr, WispError> {
        let start = self.current().span.start.clone();
        while matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
        }

        let mut statements = vec![self.statement()?];

        loop {
            let mut newline_count = 0;
            while matches!(self.current().kind, TokenKind::Newline) {
                self.advance();
                newline_count += 1;
            }
            if newline_count == 0 {
                break;
            }
            let mark = self.save();
            match self.statement() {
                Ok(stmt) => statements.push(stmt),
                Err(_) => {
                    self.restore(mark);
                    break;
                }
            }
        }

        let end = self.current().span.end.clone();
        Ok(Expr::Block { statements, span: Span::new(start, end) })
    }

    fn statement(&mut self) -> Result<Expr, WispError> {
        let start = self.current().span.start.clone();

        if self.current().matches_keyword(Keyword::Return) {
            self.advance();
            let mark = self.save();
            let value = match self.expr() {
                Ok(expr) => Some(Box::new(expr)),
                Err(_) => {
                    self.restore(mark);
                    None
                }
            };
            let end = self.current().span.start.clone();
            return Ok(Expr::Return { value, span: Span::new(start, end) });
        }

        if self.current().matches_keyword(Keyword::Continue) {
            self.advance();
            let end = self.current().span.start.clone();
            return Ok(Expr::Continue { span: Span::new(start, end) });
        }

        if self.current().matches_keyword(Keyword::Break) {
            self.advance();
            let end = self.current().span.start.clone();
            return Ok(Expr::Break { span: Span::new(start, end) });
        }

        self.expr().map_err(|_| {
            self.syntax_error(
                "Expected 'return', 'continue', 'break', 'var', 'for', 'while', 'if', 'def', int, float, identifier, '+', '-', '(', '[' or 'not'",
            )
        })
    }

    // ------------------------------------------------------------------
    // list / if / for / while / def
    // ------------------------------------------------------------------

    fn list_expr(&mut self) -> Result<Expr, WispError> {
        let start = self.current().span.start.clone();
        if !matches!(self.current().kind, TokenKind::LSquare) {
            return Err(self.syntax_error("Expected '['"));
        }
        self.advance();

        let mut elements = Vec::new();
        if matches!(self.current().kind, TokenKind::RSquare) {
            self.advance();
        } else {
            elements.push(self.expr().map_err(|_| {
                self.syntax_error(
                    "Expected ']', 'var', 'if', 'for', 'while', 'def', int, float, identifier, '+', '-', '[' or 'not'",
                )
            })?);

            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                elements.push(self.expr()?);
            }

            if !matches!(self.current().kind, TokenKind::RSquare) {
                return Err(self.syntax_error("Expected ',' or ']'"));
            }
            self.advance();
        }

        let end = self.current().span.end.clone();
        Ok(Expr::ListLit { elements, span: Span::new(start, end) })
    }

    fn if_expr(&mut self) -> Result<Expr, WispError> {
        let (cases, else_case) = self.if_expr_cases(Keyword::If)?;
        let start = cases[0].0.span().start.clone();
        let end = else_case
            .as_ref()
            .map(|(e, _)| e.span().end.clone())
            .unwrap_or_else(|| cases.last().unwrap().1.span().end.clone());
        Ok(Expr::If { cases, else_case, span: Span::new(start, end) })
    }

    fn if_expr_b_or_c(&mut self) -> Result<(Vec<IfCase>, Option<(Box<Expr>, bool)>), WispError> {
        if self.current().matches_keyword(Keyword::Elif) {
            self.if_expr_cases(Keyword::Elif)
        } else {
            Ok((Vec::new(), self.if_expr_c()?))
        }
    }

    fn if_expr_c(&mut self) -> Result<Option<(Box<Expr>, bool)>, WispError> {
        if !self.current().matches_keyword(Keyword::Else) {
            return Ok(None);
        }
        self.advance();

        if matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
            let statements = self.statements()?;
            self.expect_keyword(Keyword::End)?;
            Ok(Some((Box::new(statements), true)))
        } else {
            let stmt = self.statement()?;
            Ok(Some((Box::new(stmt), false)))
        }
    }

    fn if_expr_cases(
        &mut self,
        case_keyword: Keyword,
    ) -> Result<(Vec<IfCase>, Option<(Box<Expr>, bool)>), WispError> {
        let mut cases = Vec::new();

        if !self.current().matches_keyword(case_keyword) {
            return Err(self.syntax_error(&format!("Expected '{}'", case_keyword.as_str())));
        }
        self.advance();

        let condition = self.expr()?;
        self.expect_keyword(Keyword::Then)?;

        let else_case;
        if matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
            let body = self.statements()?;
            cases.push((condition, body, true));

            if self.current().matches_keyword(Keyword::End) {
                self.advance();
                else_case = None;
            } else {
                let (more_cases, more_else) = self.if_expr_b_or_c()?;
                cases.extend(more_cases);
                else_case = more_else;
            }
        } else {
            let body = self.statement()?;
            cases.push((condition, body, false));
            let (more_cases, more_else) = self.if_expr_b_or_c()?;
            cases.extend(more_cases);
            else_case = more_else;
        }

        Ok((cases, else_case))
    }

    fn for_expr(&mut self) -> Result<Expr, WispError> {
        let start = self.current().span.start.clone();
        self.expect_keyword(Keyword::For)?;

        let var_name = match &self.current().kind {
            TokenKind::Identifier(name) => name.clone(),
            _ => return Err(self.syntax_error("Expected identifier")),
        };
        self.advance();

        self.expect_keyword(Keyword::In)?;
        let start_value = self.expr()?;
        self.expect_keyword(Keyword::To)?;
        let end_value = self.statement()?;

        let step_value = if self.current().matches_keyword(Keyword::Step) {
            self.advance();
            Some(Box::new(self.expr()?))
        } else {
            None
        };

        self.expect_keyword(Keyword::Then)?;

        if matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
            let body = self.statements()?;
            self.expect_keyword(Keyword::End)?;
            let end = self.current().span.end.clone();
            return Ok(Expr::For {
                var_name,
                start: Box::new(start_value),
                end: Box::new(end_value),
                step: step_value,
                body: Box::new(body),
                should_return_null: true,
                span: Span::new(start, end),
            });
        }

        let body = self.expr()?;
        let end = body.span().end.clone();
        Ok(Expr::For {
            var_name,
            start: Box::new(start_value),
            end: Box::new(end_value),
            step: step_value,
            body: Box::new(body),
            should_return_null: false,
            span: Span::new(start, end),
        })
    }

    fn while_expr(&mut self) -> Result<Expr, WispError> {
        let start = self.current().span.start.clone();
        self.expect_keyword(Keyword::While)?;
        let condition = self.expr()?;
        self.expect_keyword(Keyword::Then)?;

        if matches!(self.current().kind, TokenKind::Newline) {
            self.advance();
            let body = self.statements()?;
            self.expect_keyword(Keyword::End)?;
            let end = self.current().span.end.clone();
            return Ok(Expr::While {
                condition: Box::new(condition),
                body: Box::new(body),
                should_return_null: true,
                span: Span::new(start, end),
            });
        }

        let body = self.statement()?;
        let end = body.span().end.clone();
        Ok(Expr::While {
            condition: Box::new(condition),
            body: Box::new(body),
            should_return_null: false,
            span: Span::new(start, end),
        })
    }

    fn func_def(&mut self) -> Result<Expr, WispError> {
        let start = self.current().span.start.clone();
        self.expect_keyword(Keyword::Def)?;

        let name = if let TokenKind::Identifier(name) = &self.current().kind {
            let name = name.clone();
            self.advance();
            if !matches!(self.current().kind, TokenKind::LParen) {
                return Err(self.syntax_error("Expected '('"));
            }
            Some(name)
        } else {
            if !matches!(self.current().kind, TokenKind::LParen) {
                return Err(self.syntax_error("Expected identifier or '('"));
            }
            None
        };
        self.advance();

        let mut params = Vec::new();
        if let TokenKind::Identifier(first) = &self.current().kind {
            params.push(first.clone());
            self.advance();

            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                match &self.current().kind {
                    TokenKind::Identifier(name) => {
                        params.push(name.clone());
                        self.advance();
                    }
                    _ => return Err(self.syntax_error("Expected identifier")),
                }
            }

            if !matches!(self.current().kind, TokenKind::RParen) {
                return Err(self.syntax_error("Expected ',' or ')'"));
            }
        } else if !matches!(self.current().kind, TokenKind::RParen) {
            return Err(self.syntax_error("Expected identifier or ')'"));
        }
        self.advance();

        if matches!(self.current().kind, TokenKind::Arrow) {
            self.advance();
            let body = self.expr()?;
            let end = body.span().end.clone();
            return Ok(Expr::FuncDef {
                name,
                params,
                body: Box::new(body),
                auto_return: true,
                span: Span::new(start, end),
            });
        }

        if !matches!(self.current().kind, TokenKind::Newline) {
            return Err(self.syntax_error("Expected '->' or newline"));
        }
        self.advance();

        let body = self.statements()?;
        self.expect_keyword(Keyword::End)?;
        let end = self.current().span.end.clone();
        Ok(Expr::FuncDef { name, params, body: Box::new(body), auto_return: false, span: Span::new(start, end) })
    }

    // ------------------------------------------------------------------
    // call / atom / precedence chain
    // ------------------------------------------------------------------

    fn call(&mut self) -> Result<Expr, WispError> {
        let atom = self.atom()?;

        if !matches!(self.current().kind, TokenKind::LParen) {
            return Ok(atom);
        }
        self.advance();

        let start = atom.span().start.clone();
        let mut args = Vec::new();
        if matches!(self.current().kind, TokenKind::RParen) {
            self.advance();
        } else {
            args.push(self.expr().map_err(|_| {
                self.syntax_error(
                    "Expected ')', 'var', 'if', 'for', 'while', 'def', int, float, identifier, '+', '-', '(', '[' or 'not'",
                )
            })?);

            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                args.push(self.expr()?);
            }

            if !matches!(self.current().kind, TokenKind::RParen) {
                return Err(self.syntax_error("Expected ',' or ')'"));
            }
            self.advance();
        }

        let end = self.tokens[self.pos].span.start.clone();
        Ok(Expr::Call { callee: Box::new(atom), args, span: Span::new(start, end) })
    }

    fn atom(&mut self) -> Result<Expr, WispError> {
        let token = self.current().clone();

        match &token.kind {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Number { value: NumberLit::Int(*value), span: token.span })
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr::Number { value: NumberLit::Float(*value), span: token.span })
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Expr::Str { value: value.clone(), span: token.span })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::VarAccess { name: name.clone(), span: token.span })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expr()?;
                if !matches!(self.current().kind, TokenKind::RParen) {
                    return Err(self.syntax_error("Expected ')'"));
                }
                self.advance();
                Ok(expr)
            }
            TokenKind::LSquare => self.list_expr(),
            TokenKind::Keyword(Keyword::If) => self.if_expr(),
            TokenKind::Keyword(Keyword::For) => self.for_expr(),
            TokenKind::Keyword(Keyword::While) => self.while_expr(),
            TokenKind::Keyword(Keyword::Def) => self.func_def(),
            _ => Err(self.syntax_error(
                "Expected int, float, identifier, '+', '-', '(', '[', 'if', 'for', 'while', 'def'",
            )),
        }
    }

    fn power(&mut self) -> Result<Expr, WispError> {
        let left = self.call()?;
        if matches!(self.current().kind, TokenKind::Power) {
            self.advance();
            let right = self.factor()?;
            let span = Span::new(left.span().start.clone(), right.span().end.clone());
            return Ok(Expr::BinaryOp { left: Box::new(left), op: BinOp::Power, right: Box::new(right), span });
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, WispError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Plus | TokenKind::Minus => {
                self.advance();
                let operand = self.factor()?;
                let span = Span::new(token.span.start, operand.span().end.clone());
                let op = if matches!(token.kind, TokenKind::Minus) { UnOp::Neg } else { UnOp::Pos };
                Ok(Expr::UnaryOp { op, operand: Box::new(operand), span })
            }
            _ => self.power(),
        }
    }

    fn term(&mut self) -> Result<Expr, WispError> {
        self.binary_op_tokens(Self::factor, &[(TokenKind::Mul, BinOp::Mul), (TokenKind::Div, BinOp::Div)])
    }

    fn arith_expr(&mut self) -> Result<Expr, WispError> {
        self.binary_op_tokens(Self::term, &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)])
    }

    fn comp_expr(&mut self) -> Result<Expr, WispError> {
        if self.current().matches_keyword(Keyword::Not) {
            let token = self.current().clone();
            self.advance();
            let operand = self.comp_expr()?;
            let span = Span::new(token.span.start, operand.span().end.clone());
            return Ok(Expr::UnaryOp { op: UnOp::Not, operand: Box::new(operand), span });
        }

        self.binary_op_tokens(
            Self::arith_expr,
            &[
                (TokenKind::Ee, BinOp::Eq),
                (TokenKind::Ne, BinOp::NotEq),
                (TokenKind::Lt, BinOp::Lt),
                (TokenKind::Gt, BinOp::Gt),
                (TokenKind::Lte, BinOp::Lte),
                (TokenKind::Gte, BinOp::Gte),
            ],
        )
        .map_err(|_| {
            self.syntax_error("Expected int, float, identifier, '+', '-', '(', '[' or 'not'")
        })
    }

    fn expr(&mut self) -> Result<Expr, WispError> {
        if self.current().matches_keyword(Keyword::Var) {
            let start = self.current().span.start.clone();
            self.advance();

            let name = match &self.current().kind {
                TokenKind::Identifier(name) => name.clone(),
                _ => return Err(self.syntax_error("Expected identifier")),
            };
            self.advance();

            if !matches!(self.current().kind, TokenKind::Eq) {
                return Err(self.syntax_error("Expected '='"));
            }
            self.advance();

            let value = self.expr()?;
            let end = value.span().end.clone();
            return Ok(Expr::VarAssign { name, value: Box::new(value), span: Span::new(start, end) });
        }

        self.binary_op_keywords(Self::comp_expr, &[(Keyword::And, BinOp::And), (Keyword::Or, BinOp::Or)])
            .map_err(|_| {
                self.syntax_error(
                    "Expected 'var', 'for', 'while', 'if', 'def', int, float, identifier, '+', '-', '(', '[' or 'not'",
                )
            })
    }

    fn binary_op_tokens(
        &mut self,
        mut operand: impl FnMut(&mut Self) -> Result<Expr, WispError>,
        ops: &[(TokenKind, BinOp)],
    ) -> Result<Expr, WispError> {
        let mut left = operand(self)?;
        loop {
            let matched = ops.iter().find(|(kind, _)| &self.current().kind == kind);
            let Some((_, op)) = matched else { break };
            let op = *op;
            self.advance();
            let right = operand(self)?;
            let span = Span::new(left.span().start.clone(), right.span().end.clone());
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }

    fn binary_op_keywords(
        &mut self,
        mut operand: impl FnMut(&mut Self) -> Result<Expr, WispError>,
        ops: &[(Keyword, BinOp)],
    ) -> Result<Expr, WispError> {
        let mut left = operand(self)?;
        loop {
            let matched = ops.iter().find(|(keyword, _)| self.current().matches_keyword(*keyword));
            let Some((_, op)) = matched else { break };
            let op = *op;
            self.advance();
            let right = operand(self)?;
            let span = Span::new(left.span().start.clone(), right.span().end.clone());
            left = Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right), span };
        }
        Ok(left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_lex::Lexer;

    fn parse(src: &str) -> Result<Expr, WispError> {
        let tokens = Lexer::new("<test>", src).make_tokens().unwrap();
        Parser::new(tokens).parse()
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let ast = parse("1 + 2 * 3").unwrap();
        match ast {
            Expr::Block { statements, .. } => match &statements[0] {
                Expr::BinaryOp { op: BinOp::Add, right, .. } => {
                    assert!(matches!(**right, Expr::BinaryOp { op: BinOp::Mul, .. }));
                }
                other => panic!("expected Add at top, got {other:?}"),
            },
            other => panic!("expected Block, got {other:?}"),
        }
    }

    #[test]
    fn parses_var_assignment() {
        let ast = parse("var x = 5").unwrap();
        let Expr::Block { statements, .. } = ast else { panic!() };
        assert!(matches!(statements[0], Expr::VarAssign { .. }));
    }

    #[test]
    fn parses_if_then_end_block() {
        let ast = parse("if 1 then\nvar x = 1\nend").unwrap();
        let Expr::Block { statements, .. } = ast else { panic!() };
        assert!(matches!(statements[0], Expr::If { .. }));
    }

    #[test]
    fn parses_function_definition_with_auto_return() {
        let ast = parse("def add(a, b) -> a + b").unwrap();
        let Expr::Block { statements, .. } = ast else { panic!() };
        match &statements[0] {
            Expr::FuncDef { name, params, auto_return, .. } => {
                assert_eq!(name.as_deref(), Some("add"));
                assert_eq!(params, &["a".to_string(), "b".to_string()]);
                assert!(auto_return);
            }
            other => panic!("expected FuncDef, got {other:?}"),
        }
    }

    #[test]
    fn missing_equals_in_var_assignment_is_a_syntax_error() {
        let err = parse("var x 5").unwrap_err();
        assert!(matches!(err, WispError::InvalidSyntax { .. }));
    }

    #[test]
    fn span_of_parent_contains_span_of_children() {
        let ast = parse("1 + 2").unwrap();
        let Expr::Block { statements, span: block_span } = ast else { panic!() };
        assert!(block_span.contains(statements[0].span()));
    }

    #[test]
    fn parses_call_with_arguments() {
        let ast = parse("foo(1, 2)").unwrap();
        let Expr::Block { statements, .. } = ast else { panic!() };
        match &statements[0] {
            Expr::Call { args, .. } => assert_eq!(args.len(), 2),
            other => panic!("expected Call, got {other:?}"),
        }
    }
}
