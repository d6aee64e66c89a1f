//! Positive and negative behavior tests for the parser.

use super::parse_file;
use ast::{BareExpression, BareMember, BareStatement, CompilationUnit, Expression, Node};
use diagnostics::{Buffer, ErrorCode, Reporter, UntaggedDiagnostic};
use span::{span, FileName::Anonymous, SourceMap, Span, Spanned};
use utility::{
    paint::{epaint, paint_to_string, ColorChoice},
    Changeset, ChangesetExt,
};

fn parse(source: &str) -> (CompilationUnit, Vec<UntaggedDiagnostic>) {
    let mut map = SourceMap::default();
    let file = map.add_str(Anonymous, source);
    let buffer = Buffer::default();
    let reporter = Reporter::buffer(buffer.clone());

    let outcome = parse_file(&map[file], &reporter);
    let diagnostics = std::mem::take(&mut *buffer.lock().unwrap());

    assert_eq!(outcome.health.is_tainted(), !diagnostics.is_empty());

    (outcome.bare, diagnostics)
}

#[track_caller]
fn parse_statements(source: &str) -> Vec<BareStatement> {
    let (unit, diagnostics) = parse(source);

    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {diagnostics:#?}"
    );

    unit.members
        .into_iter()
        .map(|member| match member.bare {
            BareMember::GlobalStatement(statement) => statement.bare,
            BareMember::Function(_) => panic!("expected a global statement"),
        })
        .collect()
}

#[track_caller]
fn parse_expression(source: &str) -> Expression {
    match &parse_statements(source)[..] {
        [BareStatement::Expression(expression)] => expression.clone(),
        statements => panic!("expected a single expression statement, got {statements:#?}"),
    }
}

/// Render the expression fully parenthesized.
fn bracket(expression: &Expression) -> String {
    fn operator(operator: Spanned<lexer::TokenName>) -> String {
        operator.bare.to_string().trim_matches(&['‘', '’'][..]).to_owned()
    }

    match &expression.bare {
        BareExpression::BooleanLiteral(value) => value.to_string(),
        BareExpression::NumberLiteral(value) => value.to_string(),
        BareExpression::TextLiteral(text) => format!("\"{text}\""),
        BareExpression::Name(identifier) => identifier.to_string(),
        BareExpression::Unary(unary) => {
            format!("({}{})", operator(unary.operator), bracket(&unary.operand))
        }
        BareExpression::Binary(binary) => format!(
            "({} {} {})",
            bracket(&binary.left),
            operator(binary.operator),
            bracket(&binary.right)
        ),
        BareExpression::Assignment(assignment) => {
            format!("({} = {})", assignment.binder, bracket(&assignment.value))
        }
        BareExpression::Call(call) => format!(
            "{}({})",
            call.callee,
            call.arguments
                .iter()
                .map(bracket)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        BareExpression::Parenthesized(inner) => format!("[{}]", bracket(inner)),
    }
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

#[track_caller]
fn assert_renders_as(unit: &CompilationUnit, expected: &str) {
    let actual = paint_to_string(|p| Node::CompilationUnit(unit).render(p), ColorChoice::Never)
        .unwrap_or_default();

    if actual != expected {
        // We also lock stdout since the test runner would otherwise interfere.
        let stdout = std::io::stdout().lock();
        let _ = epaint(
            |p| Changeset::new(expected, &actual, "\n").render_with_ledge(p),
            ColorChoice::Auto,
        );
        drop(stdout);

        panic!("the actual syntax tree differs from the expected one");
    }
}

const BINARY_OPERATORS: [(&str, u8); 15] = [
    ("*", 5),
    ("/", 5),
    ("+", 4),
    ("-", 4),
    ("==", 3),
    ("!=", 3),
    ("<", 3),
    ("<=", 3),
    (">", 3),
    (">=", 3),
    ("&", 2),
    ("&&", 2),
    ("|", 1),
    ("||", 1),
    ("^", 1),
];

#[test]
fn binary_operator_precedence() {
    for (first, first_precedence) in BINARY_OPERATORS {
        for (second, second_precedence) in BINARY_OPERATORS {
            let expression = parse_expression(&format!("a {first} b {second} c"));

            let expected = if first_precedence >= second_precedence {
                format!("((a {first} b) {second} c)")
            } else {
                format!("(a {first} (b {second} c))")
            };

            assert_eq!(bracket(&expression), expected);
        }
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(bracket(&parse_expression("1 + 2 * 3")), "(1 + (2 * 3))");
}

#[test]
fn unary_operators_bind_tightest() {
    assert_eq!(bracket(&parse_expression("-1 * 2")), "((-1) * 2)");
    assert_eq!(bracket(&parse_expression("!a == b")), "((!a) == b)");
    assert_eq!(bracket(&parse_expression("a * ~-b")), "(a * (~(-b)))");
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(bracket(&parse_expression("a = b = 3 + 1")), "(a = (b = (3 + 1)))");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(bracket(&parse_expression("(1 + 2) * 3")), "([(1 + 2)] * 3)");
}

#[test]
fn calls() {
    assert_eq!(bracket(&parse_expression("add(1, f())")), "add(1, f())");
    assert_eq!(
        bracket(&parse_expression("print(\"say \"\"hi\"\"\")")),
        "print(\"say \"hi\"\")"
    );
}

#[test]
fn trailing_comma_in_arguments() {
    let (_, diagnostics) = parse("add(1, )");

    // The comma is the sixth byte and the first file starts at offset one.
    assert_errors(&diagnostics, &[(ErrorCode::E010, span(6, 7))]);
}

#[test]
fn trailing_comma_in_parameters() {
    let (_, diagnostics) = parse("function f(a: int, ) {}");

    assert_errors(&diagnostics, &[(ErrorCode::E010, span(18, 19))]);
}

#[test]
fn missing_closing_round_bracket() {
    let (unit, diagnostics) = parse("add(1");

    assert_errors(&diagnostics, &[(ErrorCode::E010, span(6, 6))]);
    assert_eq!(
        diagnostics[0].message.as_deref(),
        Some("expected ‘)’ but was end of input")
    );
    assert_eq!(unit.members.len(), 1);
}

#[test]
fn stray_tokens_do_not_stall_the_parser() {
    let (unit, diagnostics) = parse(") 1");

    assert_errors(&diagnostics, &[(ErrorCode::E010, span(1, 2))]);
    assert_eq!(unit.members.len(), 2);
}

#[test]
fn unknown_characters_are_only_reported_by_the_lexer() {
    let (unit, diagnostics) = parse("1 $ 2");

    assert_errors(&diagnostics, &[(ErrorCode::E002, span(3, 4))]);
    assert_eq!(unit.members.len(), 2);
}

#[test]
fn missing_block_terminator() {
    let (unit, diagnostics) = parse("{ var x = 1");

    assert_errors(&diagnostics, &[(ErrorCode::E010, span(12, 12))]);
    assert!(matches!(
        &unit.members[..],
        [member] if matches!(&member.bare, BareMember::GlobalStatement(statement)
            if matches!(&statement.bare, BareStatement::Block(statements) if statements.len() == 1))
    ));
}

#[test]
fn return_value_has_to_start_on_the_same_line() {
    let (unit, diagnostics) = parse("function f() {\n    return\n    1\n}");
    assert!(diagnostics.is_empty());

    let Some(function) = unit.functions().next() else {
        panic!("expected a function");
    };
    let BareStatement::Block(statements) = &function.body.bare else {
        panic!("expected a block");
    };

    assert!(matches!(
        &statements[..],
        [
            Spanned { bare: BareStatement::Return(None), .. },
            Spanned { bare: BareStatement::Expression(_), .. },
        ]
    ));
}

#[test]
fn return_value_on_the_same_line() {
    let statements = parse_statements("{ return 1 + 2 }");

    assert!(matches!(
        &statements[..],
        [BareStatement::Block(statements)]
            if matches!(&statements[..], [Spanned { bare: BareStatement::Return(Some(_)), .. }])
    ));
}

#[test]
fn dangling_else_belongs_to_the_innermost_if() {
    let statements = parse_statements("if a if b x else y");

    let [BareStatement::If(outer)] = &statements[..] else {
        panic!("expected an if-statement");
    };
    assert!(outer.alternative.is_none());

    let BareStatement::If(inner) = &outer.consequent.bare else {
        panic!("expected a nested if-statement");
    };
    assert!(inner.alternative.is_some());
}

#[test]
fn do_while_and_for() {
    let statements = parse_statements("do x = x + 1 while x < 10\nfor i = 1 to 10 print(\"\")");

    assert!(matches!(
        &statements[..],
        [BareStatement::DoWhile(_), BareStatement::For(_)]
    ));
}

#[test]
fn function_declaration() {
    let (unit, diagnostics) = parse(
        "\
function add(a: int, b: int): int {
    return a + b
}
let sum = add(1, 2)",
    );
    assert!(diagnostics.is_empty());

    assert_renders_as(
        &unit,
        "\
CompilationUnit 1..75
├── Function add(a, b) 10..55
│   ├── Identifier add 10..13
│   ├── Parameter 14..20
│   │   ├── Identifier a 14..15
│   │   └── Identifier int 17..20
│   ├── Parameter 22..28
│   │   ├── Identifier b 22..23
│   │   └── Identifier int 25..28
│   ├── Identifier int 31..34
│   └── Block 35..55
│       └── Return 41..53
│           └── Binary ‘+’ 48..53
│               ├── Name a 48..49
│               └── Name b 52..53
└── VariableDeclaration let 56..75
    ├── Identifier sum 60..63
    └── Call 66..75
        ├── Identifier add 66..69
        ├── NumberLiteral 1 70..71
        └── NumberLiteral 2 73..74
",
    );
}
