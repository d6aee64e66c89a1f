use super::{all_paths_return, BlockKind, ControlFlowGraph};
use hir::{BareExpression, Expression, LoopLabels, Statement, Value};
use span::Span;
use symbol::{LabelGenerator, LabelKind, Type, Variable, VariableKind, VariableSymbol};
use utility::Atom;

fn variable(name: &str, type_: Type) -> Variable {
    VariableSymbol::new(Atom::from(name), type_, false, VariableKind::Local)
}

fn read(variable: &Variable) -> Expression {
    Expression::new(Span::default(), BareExpression::Variable(variable.clone()))
}

fn literal(value: impl Into<Value>) -> Expression {
    Expression::new(Span::default(), BareExpression::Literal(value.into()))
}

fn return_(value: i32) -> Statement {
    Statement::Return(Some(literal(value)))
}

fn if_(condition: Expression, consequent: Statement, alternative: Option<Statement>) -> Statement {
    hir::If {
        condition,
        consequent,
        alternative,
    }
    .into()
}

fn body(statements: Vec<Statement>) -> Vec<Statement> {
    lowerer::lower(Statement::Block(statements))
}

#[track_caller]
fn assert_well_formed(graph: &ControlFlowGraph) {
    for (index, block) in &graph.blocks {
        match block.kind {
            BlockKind::Start => assert_eq!(index, graph.start()),
            BlockKind::End => assert_eq!(index, graph.end()),
            BlockKind::Body => {
                assert!(!block.statements.is_empty());
                assert!(graph.incoming(index).next().is_some());
            }
        }
    }
}

#[test]
fn both_branches_return() {
    let condition = variable("c", Type::Bool);
    let statements = body(vec![if_(read(&condition), return_(1), Some(return_(2)))]);

    assert!(all_paths_return(&statements));
}

#[test]
fn fall_through_reaches_the_end() {
    let condition = variable("c", Type::Bool);
    let statements = body(vec![if_(read(&condition), return_(1), None)]);

    assert!(!all_paths_return(&statements));
}

#[test]
fn literal_conditions_are_folded() {
    let statements = body(vec![if_(literal(true), return_(1), Some(return_(2)))]);
    assert!(all_paths_return(&statements));

    let statements = body(vec![if_(literal(true), return_(1), None)]);
    assert!(all_paths_return(&statements));

    let statements = body(vec![if_(literal(false), return_(1), None)]);
    assert!(!all_paths_return(&statements));
}

#[test]
fn empty_body_does_not_return() {
    assert!(!all_paths_return(&[]));
    assert!(all_paths_return(&[Statement::Return(None)]));
}

#[test]
fn code_after_return_is_pruned() {
    let statements = body(vec![
        return_(1),
        Statement::Expression(literal(2)),
        Statement::Expression(literal(3)),
    ]);
    let graph = ControlFlowGraph::build(&statements);

    assert_eq!(graph.blocks.len(), 3);
    assert_well_formed(&graph);
}

#[test]
fn loops_are_well_formed() {
    let condition = variable("c", Type::Bool);
    let mut labels = LabelGenerator::default();
    let labels = LoopLabels {
        break_: labels.fresh(LabelKind::Break),
        continue_: labels.fresh(LabelKind::Continue),
    };

    let statements = body(vec![
        hir::While {
            condition: read(&condition),
            body: if_(
                read(&condition),
                Statement::Goto(labels.break_),
                Some(Statement::Goto(labels.continue_)),
            ),
            labels,
        }
        .into(),
        return_(0),
    ]);
    let graph = ControlFlowGraph::build(&statements);

    assert_well_formed(&graph);
    assert!(graph.all_paths_return());
}

#[test]
fn infinite_loop_never_reaches_the_end() {
    let mut labels = LabelGenerator::default();
    let statements = body(vec![hir::While {
        condition: literal(true),
        body: Statement::Expression(literal(1)),
        labels: LoopLabels {
            break_: labels.fresh(LabelKind::Break),
            continue_: labels.fresh(LabelKind::Continue),
        },
    }
    .into()]);
    let graph = ControlFlowGraph::build(&statements);

    assert_well_formed(&graph);
    assert_eq!(graph.incoming(graph.end()).count(), 0);
    assert!(graph.all_paths_return());
}

#[test]
fn unreachable_blocks_are_not_rendered() {
    let condition = variable("c", Type::Bool);
    let statements = body(vec![if_(read(&condition), return_(1), Some(return_(2)))]);
    let graph = ControlFlowGraph::build(&statements);

    assert_eq!(
        graph.graphviz().to_string(),
        r#"digraph G {
    N0 [label = "<Start>", shape = box]
    N1 [label = "goto else-0 unless c\l", shape = box]
    N2 [label = "return 1\l", shape = box]
    N3 [label = "else-0:\lreturn 2\l", shape = box]
    N4 [label = "<End>", shape = box]
    N0 -> N1 [label = ""]
    N1 -> N3 [label = "!c"]
    N1 -> N2 [label = "c"]
    N2 -> N4 [label = ""]
    N3 -> N4 [label = ""]
}
"#
    );
}
