//! The evaluator.
//!
//! It interprets lowered programs statement by statement, following jumps through a
//! table from labels to statement indices. Global variables outlive a single
//! evaluation and are kept in the [`Context`] across chained submissions.
//!
//! Integer arithmetic wraps on overflow. Runtime errors like a division by zero are
//! reported as diagnostics and abort the evaluation.

use diagnostics::{error::Result, Diagnostic, ErrorCode, Reporter};
use hir::{
    BareExpression, BinaryOperator, BinaryOperatorKind, Expression, Program, Statement,
    UnaryOperatorKind, Value,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use span::Span;
use std::sync::Arc;
use symbol::{Builtin, Function, Label, Type, Variable, VariableKind};
use utility::{FormatError, HashMap, QuoteExt};

pub use host::{Console, Host};

mod host;

#[cfg(test)]
mod test;

/// The values of global variables.
pub type Globals = HashMap<Variable, Value>;

/// The state that persists across the evaluation of chained submissions.
pub struct Context<H> {
    pub globals: Globals,
    pub host: H,
    random: StdRng,
}

impl<H: Host> Context<H> {
    /// Create a context whose random number generator is seeded with the given seed if present
    /// and by the operating system otherwise.
    pub fn new(host: H, seed: Option<u64>) -> Self {
        Self {
            globals: Globals::default(),
            host,
            random: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            },
        }
    }
}

/// Evaluate the global statements of the program.
///
/// Returns the value of the last evaluated expression statement or variable declaration.
pub fn evaluate<H: Host>(
    program: &Program,
    context: &mut Context<H>,
    reporter: &Reporter,
) -> Result<Option<Value>> {
    let mut evaluator = Evaluator {
        program,
        context,
        reporter,
        last_value: None,
    };

    let mut frame = Frame {
        is_global: true,
        ..Frame::default()
    };
    evaluator.execute(&program.statements, &mut frame)?;

    Ok(evaluator.last_value)
}

struct Evaluator<'a, H> {
    program: &'a Program,
    context: &'a mut Context<H>,
    reporter: &'a Reporter,
    last_value: Option<Value>,
}

/// The local variables and parameters of a function invocation or of the global statements.
#[derive(Default)]
struct Frame {
    locals: HashMap<Variable, Value>,
    /// Whether the frame belongs to the global statements whose values form the result.
    is_global: bool,
}

impl<H: Host> Evaluator<'_, H> {
    /// Execute a lowered body and return the returned value if any.
    fn execute(&mut self, statements: &[Statement], frame: &mut Frame) -> Result<Option<Value>> {
        let labels: HashMap<Label, usize> = statements
            .iter()
            .enumerate()
            .filter_map(|(index, statement)| match statement {
                &Statement::Label(label) => Some((label, index)),
                _ => None,
            })
            .collect();
        let target = |label: &Label| match labels.get(label) {
            Some(&index) => index,
            None => unreachable!("jump to the undeclared label {label}"),
        };

        let mut index = 0;

        while let Some(statement) = statements.get(index) {
            index += 1;

            match statement {
                Statement::VariableDeclaration(declaration) => {
                    let value = self.evaluate_expression(&declaration.value, frame)?;
                    self.assign(&declaration.variable, value.clone(), frame);

                    if frame.is_global {
                        self.last_value = Some(value);
                    }
                }
                Statement::Expression(expression) => {
                    let value = self.evaluate_expression_allowing_void(expression, frame)?;

                    if frame.is_global {
                        self.last_value = value;
                    }
                }
                Statement::Label(_) => {}
                Statement::Goto(label) => index = target(label),
                Statement::ConditionalGoto(goto) => {
                    let condition = self.evaluate_expression(&goto.condition, frame)?;

                    if truth(&condition) == goto.jump_if_true {
                        index = target(&goto.label);
                    }
                }
                Statement::Return(value) => {
                    return value
                        .as_ref()
                        .map(|value| self.evaluate_expression(value, frame))
                        .transpose();
                }
                Statement::Block(_)
                | Statement::If(_)
                | Statement::While(_)
                | Statement::DoWhile(_)
                | Statement::For(_) => {
                    unreachable!("structured statement in a lowered body: {statement}")
                }
            }
        }

        Ok(None)
    }

    fn assign(&mut self, variable: &Variable, value: Value, frame: &mut Frame) {
        match variable.kind {
            VariableKind::Global => self.context.globals.insert(variable.clone(), value),
            VariableKind::Local | VariableKind::Parameter => {
                frame.locals.insert(variable.clone(), value)
            }
        };
    }

    fn read(&self, variable: &Variable, frame: &Frame) -> Value {
        let value = match variable.kind {
            VariableKind::Global => self.context.globals.get(variable),
            VariableKind::Local | VariableKind::Parameter => frame.locals.get(variable),
        };

        // A function may read a global variable before its declaration was evaluated.
        match value {
            Some(value) => value.clone(),
            None => default_value(variable.type_),
        }
    }

    fn evaluate_expression(&mut self, expression: &Expression, frame: &mut Frame) -> Result<Value> {
        match self.evaluate_expression_allowing_void(expression, frame)? {
            Some(value) => Ok(value),
            None => unreachable!("expression without a value: {expression}"),
        }
    }

    fn evaluate_expression_allowing_void(
        &mut self,
        expression: &Expression,
        frame: &mut Frame,
    ) -> Result<Option<Value>> {
        let value = match &expression.bare {
            BareExpression::Error => unreachable!("evaluating an erroneous program"),
            BareExpression::Literal(value) => value.clone(),
            BareExpression::Variable(variable) => self.read(variable, frame),
            BareExpression::Assignment(assignment) => {
                let value = self.evaluate_expression(&assignment.value, frame)?;
                self.assign(&assignment.variable, value.clone(), frame);
                value
            }
            BareExpression::Unary(unary) => {
                let operand = self.evaluate_expression(&unary.operand, frame)?;

                match (unary.operator.kind, operand) {
                    (UnaryOperatorKind::Identity, Value::Int(operand)) => Value::Int(operand),
                    (UnaryOperatorKind::Negation, Value::Int(operand)) => {
                        Value::Int(operand.wrapping_neg())
                    }
                    (UnaryOperatorKind::OnesComplement, Value::Int(operand)) => Value::Int(!operand),
                    (UnaryOperatorKind::LogicalNegation, Value::Bool(operand)) => {
                        Value::Bool(!operand)
                    }
                    (kind, operand) => unreachable!(
                        "the unary operator {} is not defined for {operand:?}",
                        kind.symbol()
                    ),
                }
            }
            BareExpression::Binary(binary) => {
                let left = self.evaluate_expression(&binary.left, frame)?;
                let right = self.evaluate_expression(&binary.right, frame)?;

                self.apply(binary.operator, left, right, expression.span)?
            }
            BareExpression::Call(call) => {
                let arguments = call
                    .arguments
                    .iter()
                    .map(|argument| self.evaluate_expression(argument, frame))
                    .collect::<Result<Vec<_>>>()?;

                return self.call(&call.function, arguments, expression.span);
            }
            BareExpression::Conversion(conversion) => {
                let value = self.evaluate_expression(&conversion.expression, frame)?;
                self.convert(value, conversion.type_, expression.span)?
            }
        };

        Ok(Some(value))
    }

    fn apply(
        &self,
        operator: &BinaryOperator,
        left: Value,
        right: Value,
        span: Span,
    ) -> Result<Value> {
        use BinaryOperatorKind::*;

        Ok(match (operator.kind, left, right) {
            (Equals, left, right) => Value::Bool(left == right),
            (NotEquals, left, right) => Value::Bool(left != right),
            (Addition, Value::Text(left), Value::Text(right)) => {
                Value::Text(Arc::from(format!("{left}{right}")))
            }
            (kind, Value::Int(left), Value::Int(right)) => match kind {
                Addition => Value::Int(left.wrapping_add(right)),
                Subtraction => Value::Int(left.wrapping_sub(right)),
                Multiplication => Value::Int(left.wrapping_mul(right)),
                Division => {
                    if right == 0 {
                        return Err(Diagnostic::error()
                            .code(ErrorCode::E050)
                            .message("attempt to divide by zero")
                            .unlabeled_span(span)
                            .report(self.reporter));
                    }
                    Value::Int(left.wrapping_div(right))
                }
                BitwiseAnd => Value::Int(left & right),
                BitwiseOr => Value::Int(left | right),
                BitwiseXor => Value::Int(left ^ right),
                Less => Value::Bool(left < right),
                LessOrEquals => Value::Bool(left <= right),
                Greater => Value::Bool(left > right),
                GreaterOrEquals => Value::Bool(left >= right),
                LogicalAnd | LogicalOr | Equals | NotEquals => {
                    unreachable!("the binary operator {} is not defined for integers", kind.symbol())
                }
            },
            (LogicalAnd | BitwiseAnd, Value::Bool(left), Value::Bool(right)) => {
                Value::Bool(left & right)
            }
            (LogicalOr | BitwiseOr, Value::Bool(left), Value::Bool(right)) => {
                Value::Bool(left | right)
            }
            (BitwiseXor, Value::Bool(left), Value::Bool(right)) => Value::Bool(left ^ right),
            (kind, left, right) => unreachable!(
                "the binary operator {} is not defined for {left:?} and {right:?}",
                kind.symbol()
            ),
        })
    }

    fn call(&mut self, function: &Function, arguments: Vec<Value>, span: Span) -> Result<Option<Value>> {
        if let Some(builtin) = function.builtin {
            return self.call_builtin(builtin, arguments, span);
        }

        let Some(body) = self.program.body(function) else {
            unreachable!("the function {function} does not have a body");
        };

        let mut frame = Frame {
            locals: function
                .parameters
                .iter()
                .cloned()
                .zip(arguments)
                .collect(),
            is_global: false,
        };

        self.execute(body, &mut frame)
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        arguments: Vec<Value>,
        span: Span,
    ) -> Result<Option<Value>> {
        match (builtin, &arguments[..]) {
            (Builtin::Print, [text]) => {
                let text = text.to_string();
                self.context
                    .host
                    .print(&text)
                    .map_err(|error| self.io_error(error, span))?;
                Ok(None)
            }
            (Builtin::Input, []) => {
                let line = self
                    .context
                    .host
                    .input()
                    .map_err(|error| self.io_error(error, span))?;
                Ok(Some(Value::from(line)))
            }
            (Builtin::Rand, &[Value::Int(max)]) => {
                if max <= 0 {
                    return Err(Diagnostic::error()
                        .code(ErrorCode::E053)
                        .message(format!(
                            "the upper bound passed to {} has to be positive but it is {max}",
                            "rand".quote()
                        ))
                        .unlabeled_span(span)
                        .report(self.reporter));
                }

                Ok(Some(Value::Int(self.context.random.random_range(0..max))))
            }
            (builtin, arguments) => unreachable!(
                "invalid arguments passed to the builtin {}: {arguments:?}",
                builtin.name()
            ),
        }
    }

    fn io_error(&self, error: std::io::Error, span: Span) -> diagnostics::reporter::ErasedReportedError {
        Diagnostic::error()
            .code(ErrorCode::E052)
            .message(error.format())
            .unlabeled_span(span)
            .report(self.reporter)
    }

    fn convert(&self, value: Value, type_: Type, span: Span) -> Result<Value> {
        let converted = match (type_, &value) {
            (Type::Any, _) => Some(value.clone()),
            (Type::String, _) => Some(Value::from(value.to_string())),
            (Type::Bool, Value::Bool(_)) | (Type::Int, Value::Int(_)) => Some(value.clone()),
            (Type::Bool, Value::Text(text)) => match &**text {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            (Type::Int, Value::Text(text)) => text.parse().ok().map(Value::Int),
            _ => None,
        };

        match converted {
            Some(value) => Ok(value),
            None => Err(Diagnostic::error()
                .code(ErrorCode::E051)
                .message(format!(
                    "the value {} of type {} cannot be converted to {}",
                    value.to_string().quote(),
                    value.type_().quote(),
                    type_.quote()
                ))
                .unlabeled_span(span)
                .report(self.reporter)),
        }
    }
}

fn truth(value: &Value) -> bool {
    match value {
        &Value::Bool(value) => value,
        value => unreachable!("non-boolean condition {value:?}"),
    }
}

fn default_value(type_: Type) -> Value {
    match type_ {
        Type::Bool => Value::Bool(false),
        Type::String => Value::from(""),
        _ => Value::Int(0),
    }
}
