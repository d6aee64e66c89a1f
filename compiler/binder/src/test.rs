use super::{bind_global_scope, bind_program};
use diagnostics::{Buffer, ErrorCode, Reporter, UntaggedDiagnostic};
use hir::{BareExpression, GlobalScope, Program, Statement};
use span::{FileName::Anonymous, SourceMap};
use std::sync::Arc;
use symbol::{Type, VariableKind};

struct Bound {
    global_scope: Arc<GlobalScope>,
    program: Program,
    diagnostics: Vec<UntaggedDiagnostic>,
}

fn bind(source: &str) -> Bound {
    bind_after(None, source)
}

fn bind_after(previous: Option<&Bound>, source: &str) -> Bound {
    let mut map = SourceMap::default();
    let file = map.add_str(Anonymous, source);
    let buffer = Buffer::default();
    let reporter = Reporter::buffer(buffer.clone());

    let unit = parser::parse_file(&map[file], &reporter).bare;
    let global_scope = Arc::new(
        bind_global_scope(
            previous.map(|bound| bound.global_scope.clone()),
            &[unit],
            &reporter,
        )
        .bare,
    );
    let program = bind_program(None, global_scope.clone(), &reporter).bare;
    let diagnostics = std::mem::take(&mut *buffer.lock().unwrap());

    Bound {
        global_scope,
        program,
        diagnostics,
    }
}

fn codes(bound: &Bound) -> Vec<ErrorCode> {
    bound
        .diagnostics
        .iter()
        .filter_map(|diagnostic| diagnostic.code)
        .collect()
}

#[track_caller]
fn assert_binds(source: &str) -> Bound {
    let bound = bind(source);
    assert!(
        bound.diagnostics.is_empty(),
        "unexpected diagnostics: {:#?}",
        bound.diagnostics
    );
    bound
}

#[test]
fn undefined_identifier_is_recovered() {
    let bound = bind("undeclared + 1");

    assert_eq!(codes(&bound), [ErrorCode::E020]);
    assert!(matches!(
        &bound.program.statements[..],
        [Statement::Expression(expression)] if expression.type_() == Type::Int
    ));
}

#[test]
fn undefined_identifier_suggests_similar_name() {
    let bound = bind("var count = 1\ncont + 1");

    assert_eq!(codes(&bound), [ErrorCode::E020]);
    let help = bound.diagnostics[0]
        .subdiagnostics
        .iter()
        .any(|subdiagnostic| subdiagnostic.message.contains("‘count’"));
    assert!(help);
}

#[test]
fn assignment_of_different_type_retypes_variable() {
    let bound = assert_binds("var x = 1\nx = \"a\"\nlet y = x + \"b\"");

    let types: Vec<_> = bound
        .global_scope
        .variables
        .iter()
        .map(|variable| (variable.name.to_str(), variable.type_))
        .collect();
    assert_eq!(
        types,
        [("x", Type::Int), ("x", Type::String), ("y", Type::String)]
    );
}

#[test]
fn assignment_to_any_converts_instead_of_retyping() {
    let bound = assert_binds("var x: any = 1\nx = true");

    assert_eq!(bound.global_scope.variables.len(), 1);
    let Some(Statement::Expression(expression)) = bound.global_scope.statements.last() else {
        panic!("expected an expression statement");
    };
    let BareExpression::Assignment(assignment) = &expression.bare else {
        panic!("expected an assignment");
    };
    assert!(matches!(assignment.value.bare, BareExpression::Conversion(_)));
}

#[test]
fn assignment_to_read_only_variable() {
    let bound = bind("let x = 1\nx = 2");

    assert_eq!(codes(&bound), [ErrorCode::E027]);
}

#[test]
fn inner_declarations_shadow_outer_ones() {
    let bound = assert_binds("var x = 1\n{ var x = true\nlet y = !x }\nlet z = x + 1");

    let kinds: Vec<_> = bound
        .global_scope
        .variables
        .iter()
        .map(|variable| (variable.name.to_str(), variable.kind))
        .collect();
    assert_eq!(
        kinds,
        [("x", VariableKind::Global), ("z", VariableKind::Global)]
    );
}

#[test]
fn redeclaration_in_same_scope() {
    let bound = bind("var x = 1\nvar x = 2");

    assert_eq!(codes(&bound), [ErrorCode::E025]);
}

#[test]
fn functions_may_be_called_before_their_declaration() {
    assert_binds(
        "\
print(string(add(1, 2)))
function add(a: int, b: int): int {
    return a + b
}",
    );
}

#[test]
fn recursion() {
    assert_binds(
        "\
function fib(n: int): int {
    if n < 2 return n
    return fib(n - 1) + fib(n - 2)
}",
    );
}

#[test]
fn not_all_paths_return() {
    let bound = bind("function f(c: bool): int { if c return 1 }");

    assert_eq!(codes(&bound), [ErrorCode::E024]);
}

#[test]
fn all_paths_return_with_alternative() {
    assert_binds("function f(c: bool): int { if c return 1 else return 2 }");
}

#[test]
fn constant_conditions_are_folded_for_return_analysis() {
    assert_binds("function f(): int { if true return 1 }");
    assert_binds("function f(): int { while true { } }");
}

#[test]
fn only_literal_conditions_are_folded_for_return_analysis() {
    let bound = bind("function f(): int { if 1 < 2 return 1 }");

    assert_eq!(codes(&bound), [ErrorCode::E024]);
}

#[test]
fn break_outside_of_loop() {
    let bound = bind("break\nwhile true { continue }");

    assert_eq!(codes(&bound), [ErrorCode::E023]);
}

#[test]
fn undefined_operators() {
    assert_eq!(codes(&bind("-true")), [ErrorCode::E021]);
    assert_eq!(codes(&bind("1 + true")), [ErrorCode::E022]);
    assert_eq!(codes(&bind("\"a\" < \"b\"")), [ErrorCode::E022]);
}

#[test]
fn errors_do_not_cascade() {
    assert_eq!(codes(&bind("-(1 + true) * 2")), [ErrorCode::E022]);
}

#[test]
fn conversions() {
    assert_binds("let a = string(1)\nlet b = int(\"2\")\nlet c = bool(\"true\")\nlet d: any = 3");

    assert_eq!(codes(&bind("let x: int = \"1\"")), [ErrorCode::E029]);
    assert_eq!(codes(&bind("let x = int(true)")), [ErrorCode::E028]);
}

#[test]
fn calls_are_checked() {
    assert_eq!(codes(&bind("undefined()")), [ErrorCode::E030]);
    assert_eq!(codes(&bind("print(\"a\", \"b\")")), [ErrorCode::E031]);
    assert_eq!(codes(&bind("print(1)")), [ErrorCode::E032]);
    assert_eq!(codes(&bind("var f = 1\nf()")), [ErrorCode::E038]);
    assert_eq!(codes(&bind("let x = print")), [ErrorCode::E039]);
}

#[test]
fn void_values_are_rejected() {
    assert_eq!(codes(&bind("let x = print(\"a\")")), [ErrorCode::E033]);
    assert_binds("print(\"a\")");
}

#[test]
fn function_declarations_are_checked() {
    assert_eq!(codes(&bind("function f(a: int, a: int) {}")), [ErrorCode::E026]);
    assert_eq!(codes(&bind("function f(a: float) {}")), [ErrorCode::E034]);
    assert_eq!(codes(&bind("function f() {}\nfunction f() {}")), [ErrorCode::E025]);
}

#[test]
fn return_statements_are_checked() {
    assert_eq!(codes(&bind("return 1")), [ErrorCode::E035]);
    assert_eq!(codes(&bind("function f() { return 1 }")), [ErrorCode::E036]);
    assert_eq!(codes(&bind("function f(): int { return }")), [ErrorCode::E037]);
}

#[test]
fn for_loop_variable_is_read_only() {
    assert_binds("for i = 1 to 10 print(string(i))");
    assert_eq!(codes(&bind("for i = 1 to 10 i = 2")), [ErrorCode::E027]);
}

#[test]
fn later_submissions_see_earlier_declarations() {
    let first = assert_binds("var x = 1\nfunction double(n: int): int { return n * 2 }");
    let second = bind_after(Some(&first), "x = double(x)");

    assert!(second.diagnostics.is_empty());
    assert!(second.global_scope.variables.is_empty());
}

#[test]
fn lowered_bodies_are_flat() {
    let bound = assert_binds(
        "\
function count(n: int): int {
    var sum = 0
    for i = 1 to n {
        if i == 3 continue
        sum = sum + i
    }
    return sum
}",
    );

    let (_, body) = bound.program.function_bodies().next().unwrap();
    assert!(body.iter().all(|statement| !statement.is_structured()));
}
