use crate::{BareToken::*, Lexer, Token};
use diagnostics::{Buffer, ErrorCode, Reporter, UntaggedDiagnostic};
use span::{span, FileName::Anonymous, SourceMap, Span};

fn lex(source: &str) -> (Vec<Token>, Vec<UntaggedDiagnostic>) {
    let mut map = SourceMap::default();
    let file = map.add_str(Anonymous, source);
    let buffer = Buffer::default();
    let reporter = Reporter::buffer(buffer.clone());

    let outcome = super::lex(&map[file], &reporter);
    let diagnostics = std::mem::take(&mut *buffer.lock().unwrap());

    assert_eq!(outcome.health.is_tainted(), !diagnostics.is_empty());

    (outcome.bare, diagnostics)
}

#[track_caller]
fn assert_lex_eq(source: &str, expected: Vec<Token>) {
    let (actual, diagnostics) = lex(source);

    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics:#?}"
    );
    assert_eq!(actual, expected);
}

#[track_caller]
fn assert_errors(diagnostics: &[UntaggedDiagnostic], expected: &[(ErrorCode, Span)]) {
    let actual: Vec<_> = diagnostics
        .iter()
        .map(|diagnostic| (diagnostic.code, diagnostic.primary_span()))
        .collect();
    let expected: Vec<_> = expected
        .iter()
        .map(|&(code, span)| (Some(code), Some(span)))
        .collect();

    assert_eq!(actual, expected);
}

#[test]
fn variable_declaration() {
    assert_lex_eq(
        "var a = 12\r\n",
        vec![
            Token::new(span(1, 4), Var),
            Token::new(span(4, 5), Whitespace),
            Token::new(span(5, 6), Word("a".into())),
            Token::new(span(6, 7), Whitespace),
            Token::new(span(7, 8), Equals),
            Token::new(span(8, 9), Whitespace),
            Token::new(span(9, 11), Number(12)),
            Token::new(span(11, 13), LineBreak),
            Token::new(span(13, 13), EndOfInput),
        ],
    );
}

#[test]
fn empty_input() {
    assert_lex_eq("", vec![Token::new(span(1, 1), EndOfInput)]);
}

#[test]
fn two_character_operators_are_greedy() {
    assert_lex_eq(
        "a<=b&&!c==d",
        vec![
            Token::new(span(1, 2), Word("a".into())),
            Token::new(span(2, 4), LessThanEquals),
            Token::new(span(4, 5), Word("b".into())),
            Token::new(span(5, 7), DoubleAmpersand),
            Token::new(span(7, 8), ExclamationMark),
            Token::new(span(8, 9), Word("c".into())),
            Token::new(span(9, 11), DoubleEquals),
            Token::new(span(11, 12), Word("d".into())),
            Token::new(span(12, 12), EndOfInput),
        ],
    );
}

#[test]
fn one_character_operators() {
    assert_lex_eq(
        "6/3|x!=~y",
        vec![
            Token::new(span(1, 2), Number(6)),
            Token::new(span(2, 3), Slash),
            Token::new(span(3, 4), Number(3)),
            Token::new(span(4, 5), VerticalBar),
            Token::new(span(5, 6), Word("x".into())),
            Token::new(span(6, 8), ExclamationMarkEquals),
            Token::new(span(8, 9), Tilde),
            Token::new(span(9, 10), Word("y".into())),
            Token::new(span(10, 10), EndOfInput),
        ],
    );
}

#[test]
fn keywords_and_words() {
    assert_lex_eq(
        "function to whilst_1",
        vec![
            Token::new(span(1, 9), Function),
            Token::new(span(9, 10), Whitespace),
            Token::new(span(10, 12), To),
            Token::new(span(12, 13), Whitespace),
            Token::new(span(13, 21), Word("whilst_1".into())),
            Token::new(span(21, 21), EndOfInput),
        ],
    );
}

#[test]
fn comments_end_before_line_breaks() {
    assert_lex_eq(
        "x // note\ny",
        vec![
            Token::new(span(1, 2), Word("x".into())),
            Token::new(span(2, 3), Whitespace),
            Token::new(span(3, 10), Comment),
            Token::new(span(10, 11), LineBreak),
            Token::new(span(11, 12), Word("y".into())),
            Token::new(span(12, 12), EndOfInput),
        ],
    );
}

#[test]
fn text_literal_with_escaped_quotation_marks() {
    assert_lex_eq(
        r#""say ""hi""""#,
        vec![
            Token::new(span(1, 13), Text("say \"hi\"".into())),
            Token::new(span(13, 13), EndOfInput),
        ],
    );
}

#[test]
fn unterminated_text_literal_closes_before_line_break() {
    let (tokens, diagnostics) = lex("\"open\nx");

    assert_eq!(
        tokens,
        vec![
            Token::new(span(1, 6), Text("open".into())),
            Token::new(span(6, 7), LineBreak),
            Token::new(span(7, 8), Word("x".into())),
            Token::new(span(8, 8), EndOfInput),
        ]
    );
    assert_errors(&diagnostics, &[(ErrorCode::E004, span(1, 6))]);
}

#[test]
fn overflowing_number_literal() {
    let (tokens, diagnostics) = lex("2147483648 2147483647");

    assert_eq!(
        tokens,
        vec![
            Token::new(span(1, 11), Number(0)),
            Token::new(span(11, 12), Whitespace),
            Token::new(span(12, 22), Number(i32::MAX)),
            Token::new(span(22, 22), EndOfInput),
        ]
    );
    assert_errors(&diagnostics, &[(ErrorCode::E001, span(1, 11))]);
}

#[test]
fn invalid_character() {
    let (tokens, diagnostics) = lex("1 $ 2");

    assert_eq!(
        tokens,
        vec![
            Token::new(span(1, 2), Number(1)),
            Token::new(span(2, 3), Whitespace),
            Token::new(span(3, 4), Unknown),
            Token::new(span(4, 5), Whitespace),
            Token::new(span(5, 6), Number(2)),
            Token::new(span(6, 6), EndOfInput),
        ]
    );
    assert_errors(&diagnostics, &[(ErrorCode::E002, span(3, 4))]);
}

#[test]
fn null_terminator_forces_end_of_input() {
    let (tokens, diagnostics) = lex("a\0b");

    assert_eq!(
        tokens,
        vec![
            Token::new(span(1, 2), Word("a".into())),
            Token::new(span(2, 2), EndOfInput),
        ]
    );
    assert_errors(&diagnostics, &[(ErrorCode::E003, span(2, 3))]);
}

#[test]
fn lexer_is_lazy_and_fused() {
    let mut map = SourceMap::default();
    let file = map.add_str(Anonymous, "1 + 2");
    let reporter = Reporter::silent();

    let mut lexer = Lexer::new(&map[file], &reporter);

    assert_eq!(lexer.next(), Some(Token::new(span(1, 2), Number(1))));
    assert_eq!(lexer.by_ref().count(), 5);
    assert_eq!(lexer.next(), None);
}
