//! The lowering stage.
//!
//! Structured control flow in the bound tree is rewritten in terms of labels and
//! (conditional) jumps and blocks are flattened. The result is a flat sequence of
//! statements for which [`hir::Statement::is_structured`] never holds.
//!
//! This pass does the following:
//!
//! * lower if-statements to conditional jumps over the consequent and the alternative
//! * lower while- and do-while-loops to jumps targeting the labels the binder assigned to them
//! * desugar for-loops to while-loops over a read-only upper bound
//! * flatten blocks

use hir::{BareExpression, BinaryOperator, ConditionalGoto, Expression, LoopLabels, Statement};
use symbol::{LabelGenerator, LabelKind, Type, VariableSymbol};
use utility::Atom;


/// Lower a function body or the global statements to a flat sequence of statements.
pub fn lower(statement: Statement) -> Vec<Statement> {
    let mut lowerer = Lowerer::default();
    let statement = lowerer.lower_statement(statement);

    let mut statements = Vec::new();
    flatten(statement, &mut statements);
    statements
}

#[derive(Default)]
struct Lowerer {
    labels: LabelGenerator,
}

impl Lowerer {
    fn lower_statement(&mut self, statement: Statement) -> Statement {
        match statement {
            Statement::Block(statements) => Statement::Block(
                statements
                    .into_iter()
                    .map(|statement| self.lower_statement(statement))
                    .collect(),
            ),
            // goto end unless condition
            // consequent
            // end:
            //
            // goto else unless condition
            // consequent
            // goto end
            // else:
            // alternative
            // end:
            Statement::If(if_) => {
                let hir::If {
                    condition,
                    consequent,
                    alternative,
                } = *if_;
                let consequent = self.lower_statement(consequent);

                match alternative {
                    None => {
                        let end = self.labels.fresh(LabelKind::End);

                        Statement::Block(vec![
                            jump_unless(end, condition),
                            consequent,
                            Statement::Label(end),
                        ])
                    }
                    Some(alternative) => {
                        let alternative = self.lower_statement(alternative);
                        let else_ = self.labels.fresh(LabelKind::Else);
                        let end = self.labels.fresh(LabelKind::End);

                        Statement::Block(vec![
                            jump_unless(else_, condition),
                            consequent,
                            Statement::Goto(end),
                            Statement::Label(else_),
                            alternative,
                            Statement::Label(end),
                        ])
                    }
                }
            }
            // continue:
            // goto break unless condition
            // body
            // goto continue
            // break:
            Statement::While(while_) => {
                let hir::While {
                    condition,
                    body,
                    labels: LoopLabels { break_, continue_ },
                } = *while_;

                Statement::Block(vec![
                    Statement::Label(continue_),
                    jump_unless(break_, condition),
                    self.lower_statement(body),
                    Statement::Goto(continue_),
                    Statement::Label(break_),
                ])
            }
            // body:
            // body
            // continue:
            // goto body if condition
            // break:
            Statement::DoWhile(do_while) => {
                let hir::DoWhile {
                    body,
                    condition,
                    labels: LoopLabels { break_, continue_ },
                } = *do_while;
                let start = self.labels.fresh(LabelKind::Body);

                Statement::Block(vec![
                    Statement::Label(start),
                    self.lower_statement(body),
                    Statement::Label(continue_),
                    ConditionalGoto {
                        label: start,
                        condition,
                        jump_if_true: true,
                    }
                    .into(),
                    Statement::Label(break_),
                ])
            }
            Statement::For(for_) => {
                let while_ = self.desugar_for(*for_);
                self.lower_statement(while_)
            }
            statement => statement,
        }
    }

    // {
    //     var variable = lower
    //     let upperBound = upper
    //     while variable <= upperBound {
    //         body
    //         continue:
    //         variable = variable + 1
    //     }
    // }
    fn desugar_for(&mut self, for_: hir::For) -> Statement {
        let hir::For {
            variable,
            lower,
            upper,
            body,
            labels,
        } = for_;
        let span = upper.span;

        let upper_bound = VariableSymbol::new(Atom::UPPER_BOUND, Type::Int, true, variable.kind);
        let read = |variable| Expression::new(span, BareExpression::Variable(variable));

        let condition = Expression::new(
            span,
            hir::Binary {
                left: read(variable.clone()),
                operator: BinaryOperator::int_less_or_equals(),
                right: read(upper_bound.clone()),
            }
            .into(),
        );
        let increment = Expression::new(
            span,
            hir::Assignment {
                variable: variable.clone(),
                value: Expression::new(
                    span,
                    hir::Binary {
                        left: read(variable.clone()),
                        operator: BinaryOperator::int_addition(),
                        right: Expression::new(span, hir::Value::Int(1).into()),
                    }
                    .into(),
                ),
            }
            .into(),
        );

        Statement::Block(vec![
            hir::VariableDeclaration {
                variable,
                value: lower,
            }
            .into(),
            hir::VariableDeclaration {
                variable: upper_bound,
                value: upper,
            }
            .into(),
            hir::While {
                condition,
                body: Statement::Block(vec![
                    body,
                    Statement::Label(labels.continue_),
                    increment.into(),
                ]),
                labels: LoopLabels {
                    break_: labels.break_,
                    continue_: self.labels.fresh(LabelKind::Check),
                },
            }
            .into(),
        ])
    }
}

fn jump_unless(label: symbol::Label, condition: Expression) -> Statement {
    ConditionalGoto {
        label,
        condition,
        jump_if_true: false,
    }
    .into()
}

fn flatten(statement: Statement, statements: &mut Vec<Statement>) {
    match statement {
        Statement::Block(block) => {
            for statement in block {
                flatten(statement, statements);
            }
        }
        statement => {
            debug_assert!(!statement.is_structured());
            statements.push(statement);
        }
    }
}
