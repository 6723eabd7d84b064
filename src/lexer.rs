//! Tokenizer (C4, half one), per spec.md §4.4.
//!
//! Grounded on the shape of the teacher's `rdf-io::ntriples` reader (a
//! `Parser` struct carrying a line counter, `ParseError` reporting that
//! line), generalized here to the Datalog surface syntax's token set. The
//! teacher workspace has no text-based Datalog syntax of its own — the
//! grammar and disambiguation rules are implemented directly from
//! spec.md §4.4, not copied from any single teacher file.

use crate::error::{DatalogError, DatalogResult};
use crate::term::QUOTE_MARKER;

/// A lexical token. `Op` carries the matched operator spelling verbatim
/// (`=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`); normalization of `!=` to `<>`
/// happens at [`crate::term::Expr`] construction time, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A bareword: identifier, keyword (`not`), or 0-arity/compound
    /// predicate name.
    Ident(String),
    /// A quoted string constant, already carrying the internal
    /// [`QUOTE_MARKER`] prefix.
    Quoted(String),
    /// A numeric literal, stored as its original text.
    Number(String),
    LParen,
    RParen,
    Comma,
    Dot,
    Question,
    Tilde,
    Colon,
    Dash,
    Op(String),
    /// `:-`
    Arrow,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    source: &'a str,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            source,
            line: 1,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('%') => {
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_ident(&mut self, start: usize) -> Token {
        let mut end = start + 1;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                end += c.len_utf8();
                self.bump();
            } else {
                break;
            }
        }
        Token::Ident(self.source[start..end].to_string())
    }

    fn lex_number(&mut self, start: usize) -> DatalogResult<Token> {
        let mut end = start;
        if self.source[start..].starts_with('-') {
            end += 1;
        }
        let digits_start = end;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                end += 1;
                self.bump();
            } else {
                break;
            }
        }
        if end == digits_start {
            return Err(DatalogError::ParseError {
                line: self.line,
                message: "expected at least one digit in number".to_string(),
            });
        }
        if self.peek_char() == Some('.') {
            end += 1;
            self.bump();
            let frac_start = end;
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    end += 1;
                    self.bump();
                } else {
                    break;
                }
            }
            if end == frac_start {
                return Err(DatalogError::ParseError {
                    line: self.line,
                    message: "expected digits after decimal point".to_string(),
                });
            }
        }
        if matches!(self.peek_char(), Some('e') | Some('E')) {
            end += 1;
            self.bump();
            if matches!(self.peek_char(), Some('+') | Some('-')) {
                end += 1;
                self.bump();
            }
            let exp_start = end;
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    end += 1;
                    self.bump();
                } else {
                    break;
                }
            }
            if end == exp_start {
                return Err(DatalogError::ParseError {
                    line: self.line,
                    message: "expected digits in exponent".to_string(),
                });
            }
        }
        Ok(Token::Number(self.source[start..end].to_string()))
    }

    fn lex_quoted(&mut self, quote: char) -> DatalogResult<Token> {
        let mut content = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => {
                    return Ok(Token::Quoted(format!("{QUOTE_MARKER}{content}")))
                }
                Some('\\') => {
                    if let Some(escaped) = self.bump() {
                        content.push(escaped);
                    }
                }
                Some(c) => content.push(c),
                None => {
                    return Err(DatalogError::ParseError {
                        line: self.line,
                        message: "unterminated quoted string".to_string(),
                    })
                }
            }
        }
    }

    fn next_token(&mut self) -> DatalogResult<Option<(Token, usize)>> {
        self.skip_trivia();
        let line = self.line;
        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };

        let token = match c {
            '(' => {
                self.bump();
                Token::LParen
            }
            ')' => {
                self.bump();
                Token::RParen
            }
            ',' => {
                self.bump();
                Token::Comma
            }
            '.' => {
                self.bump();
                Token::Dot
            }
            '?' => {
                self.bump();
                Token::Question
            }
            '~' => {
                self.bump();
                Token::Tilde
            }
            '\'' | '"' => {
                self.bump();
                self.lex_quoted(c)?
            }
            ':' => {
                self.bump();
                if self.peek_char() == Some('-') {
                    self.bump();
                    Token::Arrow
                } else {
                    Token::Colon
                }
            }
            '-' => {
                if self
                    .source
                    .get(start + 1..)
                    .and_then(|s| s.chars().next())
                    .is_some_and(|c2| c2.is_ascii_digit())
                {
                    self.lex_number(start)?
                } else {
                    self.bump();
                    Token::Dash
                }
            }
            '=' => {
                self.bump();
                Token::Op("=".to_string())
            }
            '!' => {
                self.bump();
                if self.peek_char() == Some('=') {
                    self.bump();
                    Token::Op("!=".to_string())
                } else {
                    return Err(DatalogError::ParseError {
                        line,
                        message: "expected '=' after '!'".to_string(),
                    });
                }
            }
            '<' => {
                self.bump();
                match self.peek_char() {
                    Some('>') => {
                        self.bump();
                        Token::Op("<>".to_string())
                    }
                    Some('=') => {
                        self.bump();
                        Token::Op("<=".to_string())
                    }
                    _ => Token::Op("<".to_string()),
                }
            }
            '>' => {
                self.bump();
                if self.peek_char() == Some('=') {
                    self.bump();
                    Token::Op(">=".to_string())
                } else {
                    Token::Op(">".to_string())
                }
            }
            c if c.is_ascii_digit() => self.lex_number(start)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_ident(start),
            other => {
                return Err(DatalogError::ParseError {
                    line,
                    message: format!("unexpected character '{other}'"),
                })
            }
        };
        Ok(Some((token, line)))
    }
}

/// Tokenize `source` in full, returning `(token, line)` pairs.
pub fn tokenize(source: &str) -> DatalogResult<Vec<(Token, usize)>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(pair) = lexer.next_token()? {
        tokens.push(pair);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(source: &str) -> Vec<Token> {
        tokenize(source).unwrap().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn tokenizes_fact() {
        assert_eq!(
            toks("parent(a, b)."),
            vec![
                Token::Ident("parent".into()),
                Token::LParen,
                Token::Ident("a".into()),
                Token::Comma,
                Token::Ident("b".into()),
                Token::RParen,
                Token::Dot,
            ]
        );
    }

    #[test]
    fn tokenizes_rule_arrow_and_comma() {
        assert_eq!(
            toks("ancestor(X,Y) :- parent(X,Y)."),
            vec![
                Token::Ident("ancestor".into()),
                Token::LParen,
                Token::Ident("X".into()),
                Token::Comma,
                Token::Ident("Y".into()),
                Token::RParen,
                Token::Arrow,
                Token::Ident("parent".into()),
                Token::LParen,
                Token::Ident("X".into()),
                Token::Comma,
                Token::Ident("Y".into()),
                Token::RParen,
                Token::Dot,
            ]
        );
    }

    #[test]
    fn tokenizes_operators() {
        assert_eq!(toks("A <> B"), vec![
            Token::Ident("A".into()),
            Token::Op("<>".into()),
            Token::Ident("B".into()),
        ]);
        assert_eq!(toks("A != B"), vec![
            Token::Ident("A".into()),
            Token::Op("!=".into()),
            Token::Ident("B".into()),
        ]);
        assert_eq!(toks("A <= 3"), vec![
            Token::Ident("A".into()),
            Token::Op("<=".into()),
            Token::Number("3".into()),
        ]);
    }

    #[test]
    fn tokenizes_quoted_string_with_marker() {
        let t = toks("\"hello world\"");
        assert_eq!(t, vec![Token::Quoted(format!("{QUOTE_MARKER}hello world"))]);
    }

    #[test]
    fn tokenizes_negative_and_decimal_numbers() {
        assert_eq!(toks("-3.5"), vec![Token::Number("-3.5".into())]);
        assert_eq!(toks("2e10"), vec![Token::Number("2e10".into())]);
    }

    #[test]
    fn skips_percent_comments_and_tracks_lines() {
        let tokens = tokenize("foo(a). % a comment\nbar(b).").unwrap();
        assert_eq!(tokens[0].1, 1);
        let bar_tok = tokens.iter().find(|(t, _)| *t == Token::Ident("bar".into())).unwrap();
        assert_eq!(bar_tok.1, 2);
    }

    #[test]
    fn unterminated_string_is_parse_error() {
        assert!(tokenize("\"oops").is_err());
    }
}
