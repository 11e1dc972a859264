//! Lexeme types

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;

use crate::util::span::{Position, Span};

/// Lexeme classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LexemeKind {
    Int,
    LongInt,
    Real,
    Identifier,
    Keyword,
    Operator,
    StringLiteral,
    Other,
}

/// One classified token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lexeme {
    pub text: String,
    pub kind: LexemeKind,
    pub line: usize,
    pub column: usize,
}

impl Lexeme {
    pub fn new(
        text: impl Into<String>,
        kind: LexemeKind,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            text: text.into(),
            kind,
            line,
            column,
        }
    }

    /// Operator or punctuation with exactly this text
    #[inline]
    pub fn is_op(
        &self,
        text: &str,
    ) -> bool {
        self.kind == LexemeKind::Operator && self.text == text
    }

    /// Keyword with exactly this text
    #[inline]
    pub fn is_keyword(
        &self,
        text: &str,
    ) -> bool {
        self.kind == LexemeKind::Keyword && self.text == text
    }

    #[inline]
    pub fn is_identifier(&self) -> bool {
        self.kind == LexemeKind::Identifier
    }

    pub fn is_modifier(&self) -> bool {
        self.kind == LexemeKind::Keyword && MODIFIERS.contains(self.text.as_str())
    }

    pub fn is_primitive_type(&self) -> bool {
        self.kind == LexemeKind::Keyword && PRIMITIVE_TYPES.contains(self.text.as_str())
    }

    pub fn is_declaration_keyword(&self) -> bool {
        self.kind == LexemeKind::Keyword && DECLARATION_KEYWORDS.contains(self.text.as_str())
    }

    /// Position of this lexeme, bound to its index in the stream
    pub fn position(
        &self,
        index: usize,
    ) -> Position {
        Position::at_lexeme(self.line, self.column, index)
    }

    pub fn span(
        &self,
        index: usize,
    ) -> Span {
        Span::point(self.position(index))
    }
}

/// Upstream input: the ordered lexemes plus the text they came from
#[derive(Debug, Clone, Default)]
pub struct LexemeStream {
    pub lexemes: Vec<Lexeme>,
    pub source_text: String,
}

impl LexemeStream {
    pub fn new(
        lexemes: Vec<Lexeme>,
        source_text: impl Into<String>,
    ) -> Self {
        Self {
            lexemes,
            source_text: source_text.into(),
        }
    }
}

pub static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "namespace",
        "class",
        "struct",
        "interface",
        "function",
        "constructor",
        "public",
        "private",
        "protected",
        "static",
        "abstract",
        "virtual",
        "override",
        "sealed",
        "new",
        "multiconst",
        "params",
        "if",
        "else",
        "while",
        "for",
        "return",
        "break",
        "continue",
        "var",
        "this",
        "base",
        "true",
        "false",
        "null",
        "void",
        "bool",
        "sbyte",
        "byte",
        "short",
        "ushort",
        "int",
        "uint",
        "long",
        "ulong",
        "char",
        "real",
        "string",
    ]
    .into_iter()
    .collect()
});

pub static MODIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "public",
        "private",
        "protected",
        "static",
        "abstract",
        "virtual",
        "override",
        "sealed",
        "new",
        "multiconst",
    ]
    .into_iter()
    .collect()
});

pub static DECLARATION_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "namespace",
        "class",
        "struct",
        "interface",
        "function",
        "constructor",
    ]
    .into_iter()
    .collect()
});

pub static PRIMITIVE_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "void", "bool", "sbyte", "byte", "short", "ushort", "int", "uint", "long", "ulong", "char",
        "real", "string",
    ]
    .into_iter()
    .collect()
});

/// Operators, longest first so the scanner can take the longest match
pub const OPERATORS: &[&str] = &[
    "<<=", ">>=", "^^", "**", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "++", "--", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "+", "-", "*", "/", "%", "<", ">", "=", "!", "~",
    "&", "|", "^", "?", ":", ".", ",", ";", "(", ")", "[", "]", "{", "}",
];

/// Assignment operators recognised by the action rule
pub const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
];
