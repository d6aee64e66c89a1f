use crate::{Diagnostic, ErrorCode, UnboxedUntaggedDiagnostic};
use span::{span, FileName::Anonymous, SourceMap};
use utility::{
    paint::{epaint, ColorChoice},
    Changeset, ChangesetExt,
};

#[track_caller]
fn assert_format(diagnostic: &UnboxedUntaggedDiagnostic, map: Option<&SourceMap>, expected: &str) {
    // We are not interested in checking the coloring.
    let actual = diagnostic.format(map);

    if actual != expected {
        // We also lock stdout since the test runner would otherwise interfere.
        let stdout = std::io::stdout().lock();
        let _ = epaint(
            |painter| Changeset::new(expected, &actual, "\n").render_with_ledge(painter),
            ColorChoice::Auto,
        );
        drop(stdout);

        panic!("the output differs");
    }
}

#[test]
fn format_no_highlights() {
    let diagnostic = Diagnostic::error().code(ErrorCode::E010).message("summary");

    assert_format(&diagnostic, None, "error[E010]: summary");
}

#[test]
fn format_highlights_are_omitted_without_source_map() {
    let diagnostic = Diagnostic::error()
        .message("summary")
        .unlabeled_span(span(1, 4));

    assert_format(&diagnostic, None, "error: summary");
}

#[test]
fn format_single_line_primary_highlight() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "alpha\nbeta\ngamma\n");

    let diagnostic = Diagnostic::error()
        .message("message")
        .unlabeled_span(span(8, 11));

    assert_format(
        &diagnostic,
        Some(&map),
        "\
error: message
  ┌─ <anonymous>:2:2
  │
2 │ beta
  │  ═══",
    );
}

#[test]
fn format_two_line_primary_highlight() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "alpha\nbeta\n");

    let diagnostic = Diagnostic::error().span(span(1, 9), "label");

    assert_format(
        &diagnostic,
        Some(&map),
        "\
error
  ┌─ <anonymous>:1:1
  │
1 │ alpha
  │ ═════
2 │ beta
  │ ══ label",
    );
}

#[test]
fn format_zero_length_highlight_with_help() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "add(1");

    let diagnostic = Diagnostic::error()
        .code(ErrorCode::E010)
        .message("expected ‘)’ but was end of input")
        .unlabeled_span(span(6, 6))
        .help("close the call");

    assert_format(
        &diagnostic,
        Some(&map),
        "\
error[E010]: expected ‘)’ but was end of input
  ┌─ <anonymous>:1:6
  │
1 │ add(1
  │     ⟩⟨
 help: close the call",
    );
}

#[test]
fn format_wide_line_numbers() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "1\n2\n3\n4\n5\n6\n7\n8\n9\n10 + x\n");

    let diagnostic = Diagnostic::error()
        .code(ErrorCode::E020)
        .message("undefined identifier ‘x’")
        .span(span(24, 25), "not found in this scope");

    assert_format(
        &diagnostic,
        Some(&map),
        "\
error[E020]: undefined identifier ‘x’
   ┌─ <anonymous>:10:6
   │
10 │ 10 + x
   │      ═ not found in this scope",
    );
}

#[test]
fn format_multiple_highlights() {
    let mut map = SourceMap::default();
    map.add_str(Anonymous, "var a = 1\nvar a = 2\n");

    let diagnostic = Diagnostic::error()
        .code(ErrorCode::E025)
        .message("the variable ‘a’ is already declared")
        .span(span(15, 16), "redeclaration")
        .label(span(5, 6), "previous declaration");

    assert_format(
        &diagnostic,
        Some(&map),
        "\
error[E025]: the variable ‘a’ is already declared
  ┌─ <anonymous>:2:5
  │
2 │ var a = 2
  │     ═ redeclaration
  ├─ <anonymous>:1:5
  │
1 │ var a = 1
  │     ─ previous declaration",
    );
}

#[test]
fn format_bug() {
    let diagnostic = Diagnostic::bug()
        .message("unexpected statement")
        .note("the compiler unexpectedly panicked\nthis is a bug");

    assert_format(
        &diagnostic,
        None,
        "\
internal compiler error: unexpected statement
 note: the compiler unexpectedly panicked
       this is a bug",
    );
}
