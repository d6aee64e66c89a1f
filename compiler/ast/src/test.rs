use super::*;
use lexer::BareToken;
use span::span;
use utility::paint::{paint_to_string, ColorChoice};

fn identifier(start: u32, name: &str) -> Identifier {
    let end = start + name.len() as u32;
    Identifier::new(Token::new(span(start, end), BareToken::Word(name.into())))
}

fn number(start: u32, value: i32) -> Expression {
    let end = start + value.to_string().len() as u32;
    Expression::new(span(start, end), BareExpression::NumberLiteral(value))
}

/// `print(1 + 2)`
fn call() -> Statement {
    let sum = Expression::new(
        span(7, 12),
        BareExpression::Binary(Box::new(Binary {
            left: number(7, 1),
            operator: Spanned::new(span(9, 10), TokenName::Plus),
            right: number(11, 2),
        })),
    );
    let call = Expression::new(
        span(1, 13),
        BareExpression::Call(Box::new(Call {
            callee: identifier(1, "print"),
            arguments: vec![sum],
        })),
    );

    Statement::new(span(1, 13), BareStatement::Expression(call))
}

#[test]
fn children_are_in_source_order() {
    let statement = call();
    let children = Node::Statement(&statement).children();
    assert_eq!(children.len(), 1);

    let children = children[0].children();
    assert!(matches!(children[0], Node::Identifier(identifier) if identifier.bare == Atom::PRINT));
    assert_eq!(children[1].span(), span(7, 12));

    let operands = children[1].children();
    assert_eq!(
        operands.iter().map(|operand| operand.span()).collect::<Vec<_>>(),
        vec![span(7, 8), span(11, 12)]
    );
    assert!(operands[0].children().is_empty());
}

#[test]
fn missing_identifiers_are_empty() {
    let identifier = Identifier::new(Token::missing(span(4, 4), TokenName::Word));
    assert!(identifier.is_missing());
    assert_eq!(identifier.bare, Atom::EMPTY);
}

#[test]
fn compilation_unit_separates_functions_from_global_statements() {
    let function = Function {
        binder: identifier(10, "main"),
        parameters: Vec::new(),
        type_: None,
        body: Statement::new(span(17, 19), BareStatement::Block(Vec::new())),
    };
    let unit = CompilationUnit {
        members: vec![
            Member::new(span(1, 13), BareMember::GlobalStatement(call())),
            Member::new(span(14, 19), BareMember::Function(Arc::new(function))),
        ],
        span: span(1, 19),
    };

    assert_eq!(unit.functions().count(), 1);
    assert_eq!(unit.global_statements().count(), 1);
    assert!(matches!(
        Node::CompilationUnit(&unit).children()[..],
        [Node::Statement(_), Node::Function(_)]
    ));
}

#[test]
fn render_tree() {
    let statement = call();
    let output = paint_to_string(|p| Node::Statement(&statement).render(p), ColorChoice::Never)
        .unwrap_or_default();

    assert_eq!(
        output,
        "\
ExpressionStatement 1..13
└── Call 1..13
    ├── Identifier print 1..6
    └── Binary ‘+’ 7..12
        ├── NumberLiteral 1 7..8
        └── NumberLiteral 2 11..12
"
    );
}
