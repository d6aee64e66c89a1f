//! A generic view on the syntax tree and a renderer printing it as an indented tree.

use super::*;
use joinery::JoinableIterator;
use std::io::{self, Write};
use utility::paint::{AnsiColor, Painter};

/// A reference to any kind of syntax node.
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    CompilationUnit(&'a CompilationUnit),
    Function(&'a Function),
    Parameter(&'a Parameter),
    Statement(&'a Statement),
    Expression(&'a Expression),
    /// A binder or a type annotation.
    Identifier(&'a Identifier),
}

impl<'a> Node<'a> {
    /// The direct children of the node in source order.
    pub fn children(self) -> Vec<Node<'a>> {
        let mut children = Vec::new();

        match self {
            Self::CompilationUnit(unit) => {
                for member in &unit.members {
                    children.push(match &member.bare {
                        BareMember::Function(function) => Node::Function(function),
                        BareMember::GlobalStatement(statement) => Node::Statement(statement),
                    });
                }
            }
            Self::Function(function) => {
                children.push(Node::Identifier(&function.binder));
                children.extend(function.parameters.iter().map(Node::Parameter));
                children.extend(function.type_.as_ref().map(Node::Identifier));
                children.push(Node::Statement(&function.body));
            }
            Self::Parameter(parameter) => {
                children.push(Node::Identifier(&parameter.binder));
                children.push(Node::Identifier(&parameter.type_));
            }
            Self::Statement(statement) => match &statement.bare {
                BareStatement::Block(statements) => {
                    children.extend(statements.iter().map(Node::Statement));
                }
                BareStatement::VariableDeclaration(declaration) => {
                    children.push(Node::Identifier(&declaration.binder));
                    children.extend(declaration.type_.as_ref().map(Node::Identifier));
                    children.push(Node::Expression(&declaration.value));
                }
                BareStatement::If(if_) => {
                    children.push(Node::Expression(&if_.condition));
                    children.push(Node::Statement(&if_.consequent));
                    children.extend(if_.alternative.as_ref().map(Node::Statement));
                }
                BareStatement::While(while_) => {
                    children.push(Node::Expression(&while_.condition));
                    children.push(Node::Statement(&while_.body));
                }
                BareStatement::DoWhile(do_while) => {
                    children.push(Node::Statement(&do_while.body));
                    children.push(Node::Expression(&do_while.condition));
                }
                BareStatement::For(for_) => {
                    children.push(Node::Identifier(&for_.binder));
                    children.push(Node::Expression(&for_.lower));
                    children.push(Node::Expression(&for_.upper));
                    children.push(Node::Statement(&for_.body));
                }
                BareStatement::Break | BareStatement::Continue => {}
                BareStatement::Return(value) => {
                    children.extend(value.as_ref().map(Node::Expression));
                }
                BareStatement::Expression(expression) => {
                    children.push(Node::Expression(expression));
                }
            },
            Self::Expression(expression) => match &expression.bare {
                BareExpression::BooleanLiteral(_)
                | BareExpression::NumberLiteral(_)
                | BareExpression::TextLiteral(_)
                | BareExpression::Name(_) => {}
                BareExpression::Unary(unary) => children.push(Node::Expression(&unary.operand)),
                BareExpression::Binary(binary) => {
                    children.push(Node::Expression(&binary.left));
                    children.push(Node::Expression(&binary.right));
                }
                BareExpression::Assignment(assignment) => {
                    children.push(Node::Identifier(&assignment.binder));
                    children.push(Node::Expression(&assignment.value));
                }
                BareExpression::Call(call) => {
                    children.push(Node::Identifier(&call.callee));
                    children.extend(call.arguments.iter().map(Node::Expression));
                }
                BareExpression::Parenthesized(inner) => children.push(Node::Expression(inner)),
            },
            Self::Identifier(_) => {}
        }

        children
    }

    pub fn span(self) -> Span {
        match self {
            Self::CompilationUnit(unit) => unit.span,
            Self::Function(function) => function.binder.span.merge(&function.body),
            Self::Parameter(parameter) => parameter.span(),
            Self::Statement(statement) => statement.span,
            Self::Expression(expression) => expression.span,
            Self::Identifier(identifier) => identifier.span,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::CompilationUnit(_) => "CompilationUnit",
            Self::Function(_) => "Function",
            Self::Parameter(_) => "Parameter",
            Self::Statement(statement) => match statement.bare {
                BareStatement::Block(_) => "Block",
                BareStatement::VariableDeclaration(_) => "VariableDeclaration",
                BareStatement::If(_) => "If",
                BareStatement::While(_) => "While",
                BareStatement::DoWhile(_) => "DoWhile",
                BareStatement::For(_) => "For",
                BareStatement::Break => "Break",
                BareStatement::Continue => "Continue",
                BareStatement::Return(_) => "Return",
                BareStatement::Expression(_) => "ExpressionStatement",
            },
            Self::Expression(expression) => match expression.bare {
                BareExpression::BooleanLiteral(_) => "BooleanLiteral",
                BareExpression::NumberLiteral(_) => "NumberLiteral",
                BareExpression::TextLiteral(_) => "TextLiteral",
                BareExpression::Name(_) => "Name",
                BareExpression::Unary(_) => "Unary",
                BareExpression::Binary(_) => "Binary",
                BareExpression::Assignment(_) => "Assignment",
                BareExpression::Call(_) => "Call",
                BareExpression::Parenthesized(_) => "Parenthesized",
            },
            Self::Identifier(_) => "Identifier",
        }
    }

    /// Node-specific information printed next to the name of the node.
    fn detail(self) -> Option<String> {
        Some(match self {
            Self::Function(function) => format!(
                "{}({})",
                function.binder,
                function
                    .parameters
                    .iter()
                    .map(|parameter| parameter.binder)
                    .join_with(", ")
            ),
            Self::Statement(statement) => match &statement.bare {
                BareStatement::VariableDeclaration(declaration) => {
                    declaration.mutability.keyword().to_owned()
                }
                _ => return None,
            },
            Self::Expression(expression) => match &expression.bare {
                BareExpression::BooleanLiteral(value) => value.to_string(),
                BareExpression::NumberLiteral(value) => value.to_string(),
                BareExpression::TextLiteral(text) => {
                    format!("\"{}\"", text.to_str().replace('"', "\"\""))
                }
                BareExpression::Name(identifier) => identifier.to_string(),
                BareExpression::Unary(unary) => unary.operator.to_string(),
                BareExpression::Binary(binary) => binary.operator.to_string(),
                _ => return None,
            },
            Self::Identifier(identifier) => match identifier.is_missing() {
                true => "<missing>".to_owned(),
                false => identifier.to_string(),
            },
            Self::CompilationUnit(_) | Self::Parameter(_) => return None,
        })
    }

    /// Render the subtree rooted at this node, one node per line.
    pub fn render(self, p: &mut Painter) -> io::Result<()> {
        self.render_with_prefix("", None, p)
    }

    fn render_with_prefix(self, prefix: &str, is_last: Option<bool>, p: &mut Painter) -> io::Result<()> {
        let marker = match is_last {
            Some(true) => "└── ",
            Some(false) => "├── ",
            None => "",
        };
        write!(p, "{prefix}{marker}")?;

        p.set(palette::NAME)?;
        write!(p, "{}", self.name())?;
        p.unset()?;

        if let Some(detail) = self.detail() {
            write!(p, " {detail}")?;
        }

        p.set(palette::SPAN)?;
        write!(p, " {:?}", self.span())?;
        p.unset()?;
        writeln!(p)?;

        let prefix = match is_last {
            Some(true) => format!("{prefix}    "),
            Some(false) => format!("{prefix}│   "),
            None => prefix.to_owned(),
        };

        let children = self.children();
        let count = children.len();

        for (index, child) in children.into_iter().enumerate() {
            child.render_with_prefix(&prefix, Some(index + 1 == count), p)?;
        }

        Ok(())
    }
}

mod palette {
    use super::AnsiColor;

    pub(super) const NAME: AnsiColor = AnsiColor::Red;
    pub(super) const SPAN: AnsiColor = AnsiColor::BrightBlack;
}
