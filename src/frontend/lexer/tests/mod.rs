//! Lexer 单元测试
//!
//! 测试参考扫描器的分词功能

use crate::frontend::lexer::{scan, LexemeKind};

fn kinds(source: &str) -> Vec<LexemeKind> {
    scan(source).unwrap().into_iter().map(|l| l.kind).collect()
}

fn texts(source: &str) -> Vec<String> {
    scan(source).unwrap().into_iter().map(|l| l.text).collect()
}

#[cfg(test)]
mod lexer_basic_tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        assert!(scan("").unwrap().is_empty());
        assert!(scan("   \t\n\r   ").unwrap().is_empty());
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("class Point"),
            vec![LexemeKind::Keyword, LexemeKind::Identifier]
        );
        assert_eq!(kinds("multiconst"), vec![LexemeKind::Keyword]);
        assert_eq!(kinds("_private9"), vec![LexemeKind::Identifier]);
    }

    #[test]
    fn test_unicode_identifier() {
        let lexemes = scan("größe = 1;").unwrap();
        assert_eq!(lexemes[0].kind, LexemeKind::Identifier);
        assert_eq!(lexemes[0].text, "größe");
    }

    #[test]
    fn test_line_and_column() {
        let lexemes = scan("int x;\n  return x;").unwrap();
        let ret = lexemes.iter().find(|l| l.text == "return").unwrap();
        assert_eq!(ret.line, 2);
        assert_eq!(ret.column, 3);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(texts("a // comment\n/* block\n */ b"), vec!["a", "b"]);
    }
}

#[cfg(test)]
mod lexer_literal_tests {
    use super::*;

    #[test]
    fn test_integer_kinds() {
        assert_eq!(
            kinds("42 42L 0xff"),
            vec![LexemeKind::Int, LexemeKind::LongInt, LexemeKind::Int]
        );
        assert_eq!(texts("0xff 7L"), vec!["255", "7"]);
    }

    #[test]
    fn test_real_literals() {
        assert_eq!(
            kinds("1.5 2e3 4.0e-2"),
            vec![LexemeKind::Real, LexemeKind::Real, LexemeKind::Real]
        );
    }

    #[test]
    fn test_member_dot_is_not_real() {
        assert_eq!(texts("xs.length"), vec!["xs", ".", "length"]);
        assert_eq!(
            kinds("1.x"),
            vec![LexemeKind::Int, LexemeKind::Operator, LexemeKind::Identifier]
        );
    }

    #[test]
    fn test_string_escapes() {
        let lexemes = scan(r#""a\n\"b\"""#).unwrap();
        assert_eq!(lexemes[0].kind, LexemeKind::StringLiteral);
        assert_eq!(lexemes[0].text, "a\n\"b\"");
    }

    #[test]
    fn test_char_literal() {
        let lexemes = scan("'x'").unwrap();
        assert_eq!(lexemes[0].kind, LexemeKind::Other);
        assert_eq!(lexemes[0].text, "'x'");
    }

    #[test]
    fn test_unterminated_string_is_wreck() {
        let err = scan("\"abc").unwrap_err();
        assert!(err.to_string().contains("unterminated string literal"));
    }
}

#[cfg(test)]
mod lexer_operator_tests {
    use super::*;

    #[test]
    fn test_longest_match() {
        assert_eq!(
            texts("a <<= b ** c ^^ d"),
            vec!["a", "<<=", "b", "**", "c", "^^", "d"]
        );
        assert_eq!(texts("i++;"), vec!["i", "++", ";"]);
    }

    #[test]
    fn test_unknown_character() {
        let err = scan("a @ b").unwrap_err();
        assert!(err.to_string().contains("unexpected character '@'"));
        assert!(err.to_string().starts_with("Wreck in line 1 at position 3"));
    }
}
