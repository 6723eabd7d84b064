//! Grammar and disambiguation (C4, half two), per spec.md §4.4.
//!
//! Hand-written recursive-descent, not a PEG/combinator grammar file: the
//! disambiguation rule (compound literal vs. built-in vs. 0-arity atom)
//! is a small imperative lookahead, and spec.md's grammar is only five
//! productions — not worth a grammar DSL dependency the teacher workspace
//! doesn't otherwise use for this.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::error::{DatalogError, DatalogResult};
use crate::lexer::{tokenize, Token};
use crate::rule::Rule;
use crate::statement::Statement;
use crate::term::Expr;

struct Parser {
    tokens: Peekable<IntoIter<(Token, usize)>>,
    last_line: usize,
}

impl Parser {
    fn new(tokens: Vec<(Token, usize)>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
            last_line: 1,
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek().map(|(t, _)| t)
    }

    fn bump(&mut self) -> Option<Token> {
        let (t, line) = self.tokens.next()?;
        self.last_line = line;
        Some(t)
    }

    fn expect(&mut self, expected: &Token, what: &str) -> DatalogResult<()> {
        match self.bump() {
            Some(ref t) if t == expected => Ok(()),
            Some(other) => Err(DatalogError::ParseError {
                line: self.last_line,
                message: format!("expected {what}, found {other:?}"),
            }),
            None => Err(DatalogError::ParseError {
                line: self.last_line,
                message: format!("expected {what}, found end of input"),
            }),
        }
    }

    /// `term := bareword | quoted | number`
    fn parse_term_token(&mut self) -> DatalogResult<String> {
        match self.bump() {
            Some(Token::Ident(s)) => Ok(s),
            Some(Token::Quoted(s)) => Ok(s),
            Some(Token::Number(s)) => Ok(s),
            Some(other) => Err(DatalogError::ParseError {
                line: self.last_line,
                message: format!("expected a term, found {other:?}"),
            }),
            None => Err(DatalogError::ParseError {
                line: self.last_line,
                message: "expected a term, found end of input".to_string(),
            }),
        }
    }

    fn operator_text(token: &Token) -> Option<String> {
        match token {
            Token::Op(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// `expr := [ "not" ] (bareword | quoted | number) ( "(" term ("," term)* ")" | operator term )`
    ///
    /// Disambiguation per spec.md §4.4: `(` after the head token means a
    /// compound literal; an operator token means a built-in binary
    /// literal; anything else means a 0-arity atom.
    fn parse_expr(&mut self) -> DatalogResult<Expr> {
        let mut negated = false;
        if matches!(self.peek(), Some(Token::Ident(s)) if s == "not") {
            self.bump();
            negated = true;
        }

        let head = self.parse_term_token()?;

        match self.peek() {
            Some(Token::LParen) => {
                self.bump();
                let mut terms = Vec::new();
                if !matches!(self.peek(), Some(Token::RParen)) {
                    terms.push(self.parse_term_token()?);
                    while matches!(self.peek(), Some(Token::Comma)) {
                        self.bump();
                        terms.push(self.parse_term_token()?);
                    }
                }
                self.expect(&Token::RParen, "')'")?;
                Ok(Expr::new(head, terms, negated))
            }
            Some(t) if Self::operator_text(t).is_some() => {
                let op = Self::operator_text(self.bump().as_ref().unwrap()).unwrap();
                let rhs = self.parse_term_token()?;
                Ok(Expr::new(op, vec![head, rhs], negated))
            }
            _ => Ok(Expr::new(head, Vec::new(), negated)),
        }
    }

    /// `statement := expr (":-" expr ("," expr)* "." | "." | query-tail | delete-tail)`
    fn parse_statement(&mut self) -> DatalogResult<Statement> {
        let first = self.parse_expr()?;

        match self.peek() {
            Some(Token::Dot) => {
                self.bump();
                Ok(Statement::InsertFact(first))
            }
            Some(Token::Arrow) => {
                self.bump();
                let mut body = vec![self.parse_expr()?];
                while matches!(self.peek(), Some(Token::Comma)) {
                    self.bump();
                    body.push(self.parse_expr()?);
                }
                self.expect(&Token::Dot, "'.'")?;
                Ok(Statement::InsertRule(Rule::new(first, body)))
            }
            Some(Token::Comma) | Some(Token::Question) | Some(Token::Tilde) => {
                let mut goals = vec![first];
                while matches!(self.peek(), Some(Token::Comma)) {
                    self.bump();
                    goals.push(self.parse_expr()?);
                }
                match self.bump() {
                    Some(Token::Question) => Ok(Statement::Query(goals)),
                    Some(Token::Tilde) => Ok(Statement::Delete(goals)),
                    Some(other) => Err(DatalogError::ParseError {
                        line: self.last_line,
                        message: format!("expected '?' or '~' to close statement, found {other:?}"),
                    }),
                    None => Err(DatalogError::ParseError {
                        line: self.last_line,
                        message: "expected '?' or '~' to close statement, found end of input"
                            .to_string(),
                    }),
                }
            }
            Some(other) => Err(DatalogError::ParseError {
                line: self.last_line,
                message: format!(
                    "expected '.', ':-', ',', '?', or '~' after expression, found {other:?}"
                ),
            }),
            None => Err(DatalogError::ParseError {
                line: self.last_line,
                message: "unexpected end of input while reading a statement".to_string(),
            }),
        }
    }

    /// `program := statement+`
    fn parse_program(&mut self) -> DatalogResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while self.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }
}

/// Parse `source` into a sequence of statements.
pub fn parse_program(source: &str) -> DatalogResult<Vec<Statement>> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_program()
}

/// Parse `source` as exactly one statement.
pub fn parse_statement(source: &str) -> DatalogResult<Statement> {
    let tokens = tokenize(source)?;
    let mut parser = Parser::new(tokens);
    let statement = parser.parse_statement()?;
    if parser.peek().is_some() {
        return Err(DatalogError::ParseError {
            line: parser.last_line,
            message: "trailing input after statement".to_string(),
        });
    }
    Ok(statement)
}
