//! Tests for the lexer's public token stream
//!
//! Token spans, line tracking and the rescanning entry points the parser
//! drives for regular expressions and template continuations.

use esfront::lexer::{Lexer, Span, TemplatePart, Token, TokenKind, keyword_kind};
use esfront::{Atom, ErrorKind, ParseError, StringDict};

fn s(value: &str) -> Atom {
    Atom::from(value)
}

fn tokens(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut dict = StringDict::new();
    let mut lexer = Lexer::new(source, &mut dict);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token);
    }
    Ok(tokens)
}

#[allow(clippy::unwrap_used)]
fn lex(source: &str) -> Vec<TokenKind> {
    tokens(source)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_spans_cover_token_text() {
    let source = "let answer = 42;";
    let tokens = tokens(source).unwrap();
    let texts: Vec<&str> = tokens
        .iter()
        .map(|token| source.get(token.span.start..token.span.end).unwrap())
        .collect();
    assert_eq!(texts, vec!["let", "answer", "=", "42", ";"]);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_line_and_column_tracking() {
    let tokens = tokens("a\n  b\u{2028}c").unwrap();
    assert_eq!(tokens[0].span, Span::new(0, 1, 1, 1));
    assert_eq!((tokens[1].span.line, tokens[1].span.column), (2, 3));
    assert_eq!(tokens[2].span.line, 3);
    assert!(tokens[2].newline_before);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_lone_carriage_return_is_a_line_break() {
    let tokens = tokens("a\rb\r\nc").unwrap();
    assert_eq!(tokens[1].span.line, 2);
    assert_eq!(tokens[2].span.line, 3);
}

#[test]
fn test_unicode_identifiers() {
    assert_eq!(
        lex("café π $_"),
        vec![
            TokenKind::Identifier(s("café")),
            TokenKind::Identifier(s("π")),
            TokenKind::Identifier(s("$_")),
        ]
    );
    assert_eq!(lex(r"\u{61}b"), vec![TokenKind::Identifier(s("ab"))]);
}

#[test]
fn test_slash_is_division_until_rescanned() {
    assert_eq!(
        lex("a / b /= c"),
        vec![
            TokenKind::Identifier(s("a")),
            TokenKind::Slash,
            TokenKind::Identifier(s("b")),
            TokenKind::SlashEq,
            TokenKind::Identifier(s("c")),
        ]
    );
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_regexp_rescan_from_slash_eq() {
    let mut dict = StringDict::new();
    let mut lexer = Lexer::new("/=a/g.test", &mut dict);
    let slash = lexer.next_token().unwrap();
    assert_eq!(slash.kind, TokenKind::SlashEq);
    let regexp = lexer.rescan_as_regexp(slash.span).unwrap();
    assert_eq!(
        regexp.kind,
        TokenKind::RegExp {
            pattern: s("=a"),
            flags: s("g"),
        }
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Dot);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_unterminated_regexp() {
    let mut dict = StringDict::new();
    let mut lexer = Lexer::new("/abc\n/", &mut dict);
    let slash = lexer.next_token().unwrap();
    let err = lexer.rescan_as_regexp(slash.span).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_template_with_two_substitutions() {
    let mut dict = StringDict::new();
    let mut lexer = Lexer::new("`a${x}b${y}c`", &mut dict);
    assert!(matches!(lexer.next_token().unwrap().kind, TokenKind::TemplateHead(_)));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier(s("x")));
    let rbrace = lexer.next_token().unwrap();
    let middle = lexer.rescan_template_continuation(rbrace.span).unwrap();
    assert_eq!(
        middle.kind,
        TokenKind::TemplateMiddle(TemplatePart {
            cooked: Some(s("b")),
            raw: s("b"),
        })
    );
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier(s("y")));
    let rbrace = lexer.next_token().unwrap();
    let tail = lexer.rescan_template_continuation(rbrace.span).unwrap();
    assert!(matches!(tail.kind, TokenKind::TemplateTail(_)));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_template_raw_keeps_escapes() {
    assert_eq!(
        lex(r"`a\nb`"),
        vec![TokenKind::TemplateNoSub(TemplatePart {
            cooked: Some(s("a\nb")),
            raw: s(r"a\nb"),
        })]
    );
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_error_location_points_at_token() {
    let err = tokens("a\n  @").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
    assert_eq!(err.location.offset, 4);
    assert_eq!(err.location.line, 2);
    assert_eq!(err.location.column, 3);
}

#[test]
fn test_keyword_round_trip() {
    for word in ["if", "class", "enum", "typeof", "null"] {
        let kind = keyword_kind(word);
        assert_eq!(kind.as_ref().and_then(|kind| kind.keyword_str()), Some(word));
    }
    assert_eq!(keyword_kind("let"), None);
    assert_eq!(keyword_kind("yield"), None);
    assert_eq!(keyword_kind("await"), None);
}

#[test]
#[allow(clippy::unwrap_used)]
fn test_newline_inside_multiline_comment_counts() {
    let tokens = tokens("a /*\n*/ b /* */ c").unwrap();
    assert!(tokens[1].newline_before);
    assert!(!tokens[2].newline_before);
}

#[test]
fn test_eof_on_empty_and_trivia_only_input() {
    assert!(lex("").is_empty());
    assert!(lex("  // only a comment").is_empty());
    assert!(lex("/* block */\n").is_empty());
}
