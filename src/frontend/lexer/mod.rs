//! Reference scanner
//!
//! Tokenization proper belongs to the upstream collaborator; this module is the
//! straightforward character-class scanner used to drive the front end from
//! source text. It produces the flat lexeme array the pre-scanner and parser
//! consume and never looks at grammar.

pub mod tokens;

#[cfg(test)]
mod tests;

pub use tokens::{Lexeme, LexemeKind, LexemeStream, KEYWORDS, OPERATORS};

use crate::util::diagnostic::Wreck;
use crate::util::span::{Position, Span};

/// Tokenize source text into lexemes
pub fn scan(source: &str) -> Result<Vec<Lexeme>, Wreck> {
    tracing::debug!("scanning {} bytes", source.len());
    let mut scanner = Scanner::new(source);
    let mut lexemes = Vec::new();
    while let Some(lexeme) = scanner.next_lexeme()? {
        lexemes.push(lexeme);
    }
    tracing::debug!("scanned {} lexemes", lexemes.len());
    Ok(lexemes)
}

/// Tokenize and wrap into the upstream stream shape
pub fn scan_stream(source: &str) -> Result<LexemeStream, Wreck> {
    Ok(LexemeStream::new(scan(source)?, source))
}

struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(
        &self,
        offset: usize,
    ) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn here(&self) -> Span {
        Span::point(Position::new(self.line, self.column))
    }

    fn skip_trivia(&mut self) -> Result<(), Wreck> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.here();
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => {
                                return Err(Wreck::at(start, "unterminated block comment"));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_lexeme(&mut self) -> Result<Option<Lexeme>, Wreck> {
        self.skip_trivia()?;
        let (line, column) = (self.line, self.column);
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(None),
        };

        let lexeme = if ch == '_' || unicode_ident::is_xid_start(ch) {
            let mut text = String::new();
            while let Some(c) = self.peek() {
                if c == '_' || unicode_ident::is_xid_continue(c) {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = if KEYWORDS.contains(text.as_str()) {
                LexemeKind::Keyword
            } else {
                LexemeKind::Identifier
            };
            Lexeme::new(text, kind, line, column)
        } else if ch.is_ascii_digit() {
            self.number(line, column)?
        } else if ch == '"' {
            self.string(line, column)?
        } else if ch == '\'' {
            self.character(line, column)?
        } else {
            self.operator(line, column)?
        };
        Ok(Some(lexeme))
    }

    fn number(
        &mut self,
        line: usize,
        column: usize,
    ) -> Result<Lexeme, Wreck> {
        let mut text = String::new();
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X')) {
            self.bump();
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() || c == '_' {
                    if c != '_' {
                        text.push(c);
                    }
                    self.bump();
                } else {
                    break;
                }
            }
            if text.is_empty() {
                return Err(Wreck::at(
                    Span::point(Position::new(line, column)),
                    "hexadecimal literal has no digits",
                ));
            }
            let value = u128::from_str_radix(&text, 16).unwrap_or(u128::MAX);
            return Ok(self.integer_suffix(value.to_string(), line, column));
        }

        let mut is_real = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                if c != '_' {
                    text.push(c);
                }
                self.bump();
            } else if c == '.'
                && !is_real
                && self.peek_at(1).map_or(false, |n| n.is_ascii_digit())
            {
                is_real = true;
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = self.peek_at(1);
            let digit_at = if matches!(sign, Some('+') | Some('-')) { 2 } else { 1 };
            if self.peek_at(digit_at).map_or(false, |d| d.is_ascii_digit()) {
                is_real = true;
                text.push('e');
                self.bump();
                if digit_at == 2 {
                    if let Some(s) = self.bump() {
                        text.push(s);
                    }
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }
        if is_real {
            return Ok(Lexeme::new(text, LexemeKind::Real, line, column));
        }
        Ok(self.integer_suffix(text, line, column))
    }

    fn integer_suffix(
        &mut self,
        text: String,
        line: usize,
        column: usize,
    ) -> Lexeme {
        if matches!(self.peek(), Some('L') | Some('l'))
            && !self
                .peek_at(1)
                .map_or(false, |c| c == '_' || unicode_ident::is_xid_continue(c))
        {
            self.bump();
            return Lexeme::new(text, LexemeKind::LongInt, line, column);
        }
        Lexeme::new(text, LexemeKind::Int, line, column)
    }

    fn escape(
        &mut self,
        start: Span,
    ) -> Result<char, Wreck> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('0') => Ok('\0'),
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some(other) => Err(Wreck::at(
                start,
                format!("invalid escape sequence '\\{}'", other),
            )),
            None => Err(Wreck::at(start, "unterminated literal")),
        }
    }

    fn string(
        &mut self,
        line: usize,
        column: usize,
    ) -> Result<Lexeme, Wreck> {
        let start = Span::point(Position::new(line, column));
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => text.push(self.escape(start)?),
                Some('\n') | None => {
                    return Err(Wreck::at(start, "unterminated string literal"));
                }
                Some(c) => text.push(c),
            }
        }
        Ok(Lexeme::new(text, LexemeKind::StringLiteral, line, column))
    }

    fn character(
        &mut self,
        line: usize,
        column: usize,
    ) -> Result<Lexeme, Wreck> {
        let start = Span::point(Position::new(line, column));
        self.bump();
        let value = match self.bump() {
            Some('\\') => self.escape(start)?,
            Some('\'') | Some('\n') | None => {
                return Err(Wreck::at(start, "empty or unterminated character literal"));
            }
            Some(c) => c,
        };
        if self.bump() != Some('\'') {
            return Err(Wreck::at(start, "unterminated character literal"));
        }
        Ok(Lexeme::new(
            format!("'{}'", value),
            LexemeKind::Other,
            line,
            column,
        ))
    }

    fn operator(
        &mut self,
        line: usize,
        column: usize,
    ) -> Result<Lexeme, Wreck> {
        for op in OPERATORS {
            let matches = op
                .chars()
                .enumerate()
                .all(|(i, c)| self.peek_at(i) == Some(c));
            if matches {
                for _ in 0..op.chars().count() {
                    self.bump();
                }
                return Ok(Lexeme::new(*op, LexemeKind::Operator, line, column));
            }
        }
        let ch = self.peek().unwrap_or('\0');
        Err(Wreck::at(
            Span::point(Position::new(line, column)),
            format!("unexpected character '{}'", ch),
        ))
    }
}
