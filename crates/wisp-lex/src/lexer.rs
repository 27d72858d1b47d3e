use crate::cursor::Cursor;
use crate::token::{Keyword, Token, TokenKind};
use std::sync::Arc;
use wisp_util::{Position, Span, WispError};

/// Turns source text into a token stream. Dispatches on the current
/// character the way a direct-coded (hand-written, non-table-driven) lexer
/// does: each punctuation/operator character gets its own small lookahead
/// function, and whitespace/comments are skipped inline in the main loop.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    file_name: Arc<str>,
    source: Arc<str>,
}

impl<'a> Lexer<'a> {
    pub fn new(file_name: &str, source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            file_name: Arc::from(file_name),
            source: Arc::from(source),
        }
    }

    fn pos(&self) -> Position {
        Position::new(
            self.cursor.position(),
            self.cursor.line(),
            self.cursor.column(),
            self.file_name.clone(),
            self.source.clone(),
        )
    }

    /// Tokenizes the entire source. Stops and returns the first lexical
    /// error encountered; the language aborts on first error rather than
    /// collecting several.
    pub fn make_tokens(mut self) -> Result<Vec<Token>, WispError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.cursor.current_char() {
            match c {
                ' ' | '\t' => self.cursor.advance(),
                '#' => self.skip_comment(),
                ';' | '\n' => {
                    let start = self.pos();
                    self.cursor.advance();
                    tokens.push(Token::new(TokenKind::Newline, Span::new(start.clone(), self.pos())));
                }
                c if c.is_ascii_digit() => tokens.push(self.make_number()),
                c if c.is_ascii_alphabetic() => tokens.push(self.make_identifier()),
                '"' => tokens.push(self.make_string()),
                '+' => tokens.push(self.single(TokenKind::Plus)),
                '-' => tokens.push(self.make_minus_or_arrow()),
                '*' => tokens.push(self.single(TokenKind::Mul)),
                '/' => tokens.push(self.single(TokenKind::Div)),
                '^' => tokens.push(self.single(TokenKind::Power)),
                '(' => tokens.push(self.single(TokenKind::LParen)),
                ')' => tokens.push(self.single(TokenKind::RParen)),
                '[' => tokens.push(self.single(TokenKind::LSquare)),
                ']' => tokens.push(self.single(TokenKind::RSquare)),
                '!' => tokens.push(self.make_not_equals()?),
                '=' => tokens.push(self.make_equals()),
                '<' => tokens.push(self.make_less_than()),
                '>' => tokens.push(self.make_greater_than()),
                ',' => tokens.push(self.single(TokenKind::Comma)),
                other => {
                    let start = self.pos();
                    self.cursor.advance();
                    return Err(WispError::IllegalChar {
                        span: Span::new(start.clone(), self.pos()),
                        details: format!("'{other}'"),
                    });
                }
            }
        }

        let eof_pos = self.pos();
        tokens.push(Token::new(TokenKind::Eof, Span::new(eof_pos.clone(), eof_pos)));
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos();
        self.cursor.advance();
        Token::new(kind, Span::new(start.clone(), self.pos()))
    }

    fn make_number(&mut self) -> Token {
        let start = self.pos();
        let mut text = String::new();
        let mut dot_count = 0;

        while let Some(c) = self.cursor.current_char() {
            if c == '.' {
                if dot_count == 1 {
                    break;
                }
                dot_count += 1;
                text.push('.');
            } else if c.is_ascii_digit() {
                text.push(c);
            } else {
                break;
            }
            self.cursor.advance();
        }

        let end = self.pos();
        let kind = if dot_count == 0 {
            TokenKind::Int(text.parse().unwrap_or(0))
        } else {
            TokenKind::Float(text.parse().unwrap_or(0.0))
        };
        Token::new(kind, Span::new(start, end))
    }

    /// An unterminated string literal simply stops at end-of-input instead
    /// of being an error; this matches what the interpreter this lexer
    /// descends from actually does.
    fn make_string(&mut self) -> Token {
        let start = self.pos();
        self.cursor.advance();
        let mut text = String::new();
        let mut escape = false;

        while let Some(c) = self.cursor.current_char() {
            if c == '"' && !escape {
                break;
            }
            if escape {
                text.push(match c {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                escape = false;
            } else if c == '\\' {
                escape = true;
            } else {
                text.push(c);
            }
            self.cursor.advance();
        }
        self.cursor.advance();

        Token::new(TokenKind::String(text), Span::new(start, self.pos()))
    }

    fn make_identifier(&mut self) -> Token {
        let start = self.pos();
        let mut text = String::new();

        while let Some(c) = self.cursor.current_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.cursor.advance();
            } else {
                break;
            }
        }

        let end = self.pos();
        let kind = match Keyword::from_str(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(text),
        };
        Token::new(kind, Span::new(start, end))
    }

    fn make_minus_or_arrow(&mut self) -> Token {
        let start = self.pos();
        self.cursor.advance();
        let kind = if self.cursor.match_char('>') { TokenKind::Arrow } else { TokenKind::Minus };
        Token::new(kind, Span::new(start, self.pos()))
    }

    fn make_not_equals(&mut self) -> Result<Token, WispError> {
        let start = self.pos();
        self.cursor.advance();
        if self.cursor.match_char('=') {
            return Ok(Token::new(TokenKind::Ne, Span::new(start, self.pos())));
        }
        self.cursor.advance();
        Err(WispError::ExpectedChar {
            span: Span::new(start, self.pos()),
            details: "'=' (after '!')".into(),
        })
    }

    fn make_equals(&mut self) -> Token {
        let start = self.pos();
        self.cursor.advance();
        let kind = if self.cursor.match_char('=') { TokenKind::Ee } else { TokenKind::Eq };
        Token::new(kind, Span::new(start, self.pos()))
    }

    fn make_less_than(&mut self) -> Token {
        let start = self.pos();
        self.cursor.advance();
        let kind = if self.cursor.match_char('=') { TokenKind::Lte } else { TokenKind::Lt };
        Token::new(kind, Span::new(start, self.pos()))
    }

    fn make_greater_than(&mut self) -> Token {
        let start = self.pos();
        self.cursor.advance();
        let kind = if self.cursor.match_char('=') { TokenKind::Gte } else { TokenKind::Gt };
        Token::new(kind, Span::new(start, self.pos()))
    }

    fn skip_comment(&mut self) {
        self.cursor.advance();
        while self.cursor.current_char().is_some() && self.cursor.current_char() != Some('\n') {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert_eq;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new("<test>", src).make_tokens().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_arithmetic_expression() {
        assert_eq!(
            kinds("1 + 2 * 3"),
            vec![
                TokenKind::Int(1),
                TokenKind::Plus,
                TokenKind::Int(2),
                TokenKind::Mul,
                TokenKind::Int(3),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_float_with_single_dot() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
    }

    #[test]
    fn lexes_keyword_vs_identifier() {
        assert_eq!(
            kinds("var x"),
            vec![TokenKind::Keyword(Keyword::Var), TokenKind::Identifier("x".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_string_with_escapes() {
        assert_eq!(kinds(r#""a\nb""#), vec![TokenKind::String("a\nb".into()), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_closes_silently_at_eof() {
        assert_eq!(kinds(r#""abc"#), vec![TokenKind::String("abc".into()), TokenKind::Eof]);
    }

    #[test]
    fn comment_is_skipped_to_end_of_line() {
        assert_eq!(kinds("1 # comment\n2"), vec![
            TokenKind::Int(1),
            TokenKind::Newline,
            TokenKind::Int(2),
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn two_character_operators() {
        assert_eq!(kinds("== != <= >= ->"), vec![
            TokenKind::Ee,
            TokenKind::Ne,
            TokenKind::Lte,
            TokenKind::Gte,
            TokenKind::Arrow,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn bang_without_equals_is_an_error() {
        let err = Lexer::new("<test>", "!").make_tokens().unwrap_err();
        assert!(matches!(err, WispError::ExpectedChar { .. }));
    }

    #[test]
    fn unknown_character_is_illegal() {
        let err = Lexer::new("<test>", "@").make_tokens().unwrap_err();
        assert!(matches!(err, WispError::IllegalChar { .. }));
    }

    #[test]
    fn lexer_always_terminates_with_eof_or_error() {
        for src in ["", "   ", "\n\n\n", "var x = 1 + 2", "\"unterminated"] {
            let result = Lexer::new("<test>", src).make_tokens();
            match result {
                Ok(tokens) => assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof),
                Err(_) => {}
            }
        }
    }

    proptest::proptest! {
        /// The cursor only ever moves forward, so for any input — including
        /// strings no hand-picked example would think to try — `make_tokens`
        /// must return in finite time with either an `Eof`-terminated stream
        /// or an error, never hang or panic.
        #[test]
        fn never_hangs_and_always_ends_in_eof_or_error(src in ".{0,200}") {
            let result = Lexer::new("<test>", &src).make_tokens();
            match result {
                Ok(tokens) => prop_assert_eq!(tokens.last().unwrap().kind.clone(), TokenKind::Eof),
                Err(_) => {}
            }
        }
    }
}
