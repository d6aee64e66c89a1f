//! A textual representation of the bound tree.

use super::*;
use joinery::JoinableIterator;

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bare {
            BareExpression::Error => f.write_str("?"),
            BareExpression::Literal(Value::Text(text)) => {
                write!(f, "\"{}\"", text.replace('"', "\"\""))
            }
            BareExpression::Literal(value) => write!(f, "{value}"),
            BareExpression::Variable(variable) => write!(f, "{variable}"),
            BareExpression::Assignment(assignment) => {
                write!(f, "{} = {}", assignment.variable, assignment.value)
            }
            BareExpression::Unary(unary) => {
                f.write_str(unary.operator.kind.symbol())?;
                write_operand(&unary.operand, f)
            }
            BareExpression::Binary(binary) => {
                write_operand(&binary.left, f)?;
                write!(f, " {} ", binary.operator.kind.symbol())?;
                write_operand(&binary.right, f)
            }
            BareExpression::Call(call) => write!(
                f,
                "{}({})",
                call.function,
                call.arguments.iter().join_with(", ")
            ),
            BareExpression::Conversion(conversion) => {
                write!(f, "{}({})", conversion.type_, conversion.expression)
            }
        }
    }
}

fn write_operand(operand: &Expression, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match operand.bare {
        BareExpression::Binary(_) | BareExpression::Assignment(_) => write!(f, "({operand})"),
        _ => write!(f, "{operand}"),
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_statement(self, 0, f)
    }
}

/// Display a sequence of statements, one per line.
pub fn display_statements(statements: &[Statement]) -> impl fmt::Display + '_ {
    utility::displayed(move |f| {
        statements
            .iter()
            .try_for_each(|statement| write_statement(statement, 0, f))
    })
}

fn write_statement(statement: &Statement, level: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let indentation = Indentation(level);

    match statement {
        Statement::Block(statements) => {
            writeln!(f, "{indentation}{{")?;
            for statement in statements {
                write_statement(statement, level + 1, f)?;
            }
            writeln!(f, "{indentation}}}")
        }
        Statement::VariableDeclaration(declaration) => {
            let keyword = match declaration.variable.is_read_only {
                true => "let",
                false => "var",
            };
            writeln!(
                f,
                "{indentation}{keyword} {} = {}",
                declaration.variable, declaration.value
            )
        }
        Statement::If(if_) => {
            writeln!(f, "{indentation}if {}", if_.condition)?;
            write_nested_statement(&if_.consequent, level, f)?;

            if let Some(alternative) = &if_.alternative {
                writeln!(f, "{indentation}else")?;
                write_nested_statement(alternative, level, f)?;
            }

            Ok(())
        }
        Statement::While(while_) => {
            writeln!(f, "{indentation}while {}", while_.condition)?;
            write_nested_statement(&while_.body, level, f)
        }
        Statement::DoWhile(do_while) => {
            writeln!(f, "{indentation}do")?;
            write_nested_statement(&do_while.body, level, f)?;
            writeln!(f, "{indentation}while {}", do_while.condition)
        }
        Statement::For(for_) => {
            writeln!(
                f,
                "{indentation}for {} = {} to {}",
                for_.variable, for_.lower, for_.upper
            )?;
            write_nested_statement(&for_.body, level, f)
        }
        Statement::Label(label) => writeln!(f, "{}{label}:", Indentation(level.saturating_sub(1))),
        Statement::Goto(label) => writeln!(f, "{indentation}goto {label}"),
        Statement::ConditionalGoto(goto) => {
            let condition = match goto.jump_if_true {
                true => "if",
                false => "unless",
            };
            writeln!(
                f,
                "{indentation}goto {} {condition} {}",
                goto.label, goto.condition
            )
        }
        Statement::Return(None) => writeln!(f, "{indentation}return"),
        Statement::Return(Some(value)) => writeln!(f, "{indentation}return {value}"),
        Statement::Expression(expression) => writeln!(f, "{indentation}{expression}"),
    }
}

fn write_nested_statement(
    statement: &Statement,
    level: usize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    match statement {
        Statement::Block(_) => write_statement(statement, level, f),
        _ => write_statement(statement, level + 1, f),
    }
}

struct Indentation(usize);

impl fmt::Display for Indentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            f.write_str("    ")?;
        }
        Ok(())
    }
}
