//! The high-level intermediate representation (HIR), also known as the bound tree.
//!
//! It is the typed counterpart of the syntax tree: names are resolved to [symbols](symbol),
//! operators to entries of the operator tables and every expression has a [`Type`].
//! After lowering, a body is a flat sequence of statements without nested control flow.

use span::Span;
use std::{fmt, sync::Arc};
use symbol::{Function, Label, Type, Variable};

pub use operator::{
    BinaryOperator, BinaryOperatorKind, UnaryOperator, UnaryOperatorKind, BINARY_OPERATORS,
    UNARY_OPERATORS,
};
pub use format::display_statements;
pub use program::{GlobalScope, Program};

mod format;
mod operator;
mod program;


/// A statement.
#[derive(Clone, PartialEq, Debug)]
pub enum Statement {
    Block(Vec<Statement>),
    VariableDeclaration(Box<VariableDeclaration>),
    If(Box<If>),
    While(Box<While>),
    DoWhile(Box<DoWhile>),
    For(Box<For>),
    /// A jump target. Introduced by lowering.
    Label(Label),
    /// An unconditional jump. Introduced by lowering.
    Goto(Label),
    /// A conditional jump. Introduced by lowering.
    ConditionalGoto(Box<ConditionalGoto>),
    Return(Option<Expression>),
    Expression(Expression),
}

impl Statement {
    /// Whether the statement contains structured control flow that has to be lowered.
    pub fn is_structured(&self) -> bool {
        matches!(
            self,
            Self::Block(_) | Self::If(_) | Self::While(_) | Self::DoWhile(_) | Self::For(_)
        )
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct VariableDeclaration {
    pub variable: Variable,
    pub value: Expression,
}

impl From<VariableDeclaration> for Statement {
    fn from(declaration: VariableDeclaration) -> Self {
        Self::VariableDeclaration(Box::new(declaration))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct If {
    pub condition: Expression,
    pub consequent: Statement,
    pub alternative: Option<Statement>,
}

impl From<If> for Statement {
    fn from(if_: If) -> Self {
        Self::If(Box::new(if_))
    }
}

/// The targets of `break` and `continue` inside of a loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LoopLabels {
    pub break_: Label,
    pub continue_: Label,
}

#[derive(Clone, PartialEq, Debug)]
pub struct While {
    pub condition: Expression,
    pub body: Statement,
    pub labels: LoopLabels,
}

impl From<While> for Statement {
    fn from(while_: While) -> Self {
        Self::While(Box::new(while_))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct DoWhile {
    pub body: Statement,
    pub condition: Expression,
    pub labels: LoopLabels,
}

impl From<DoWhile> for Statement {
    fn from(do_while: DoWhile) -> Self {
        Self::DoWhile(Box::new(do_while))
    }
}

/// A counting loop with inclusive bounds.
#[derive(Clone, PartialEq, Debug)]
pub struct For {
    pub variable: Variable,
    pub lower: Expression,
    pub upper: Expression,
    pub body: Statement,
    pub labels: LoopLabels,
}

impl From<For> for Statement {
    fn from(for_: For) -> Self {
        Self::For(Box::new(for_))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct ConditionalGoto {
    pub label: Label,
    pub condition: Expression,
    /// Whether to jump if the condition holds or if it does not hold.
    pub jump_if_true: bool,
}

impl From<ConditionalGoto> for Statement {
    fn from(goto: ConditionalGoto) -> Self {
        Self::ConditionalGoto(Box::new(goto))
    }
}

impl From<Expression> for Statement {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

/// A typed expression.
#[derive(Clone, PartialEq, Debug)]
pub struct Expression {
    pub bare: BareExpression,
    pub span: Span,
}

impl Expression {
    pub fn new(span: Span, bare: BareExpression) -> Self {
        Self { bare, span }
    }

    pub fn type_(&self) -> Type {
        match &self.bare {
            BareExpression::Error => Type::Error,
            BareExpression::Literal(value) => value.type_(),
            BareExpression::Variable(variable) => variable.type_,
            BareExpression::Assignment(assignment) => assignment.variable.type_,
            BareExpression::Unary(unary) => unary.operator.result,
            BareExpression::Binary(binary) => binary.operator.result,
            BareExpression::Call(call) => call.function.type_,
            BareExpression::Conversion(conversion) => conversion.type_,
        }
    }

    /// The value of the expression if it is a literal.
    pub fn constant(&self) -> Option<&Value> {
        utility::obtain!(&self.bare, BareExpression::Literal(value) => value)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum BareExpression {
    /// An expression that could not be bound. An error was reported for it.
    Error,
    Literal(Value),
    Variable(Variable),
    Assignment(Box<Assignment>),
    Unary(Box<Unary>),
    Binary(Box<Binary>),
    Call(Box<Call>),
    Conversion(Box<Conversion>),
}

impl From<Value> for BareExpression {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Assignment {
    pub variable: Variable,
    pub value: Expression,
}

impl From<Assignment> for BareExpression {
    fn from(assignment: Assignment) -> Self {
        Self::Assignment(Box::new(assignment))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Unary {
    pub operator: &'static UnaryOperator,
    pub operand: Expression,
}

impl From<Unary> for BareExpression {
    fn from(unary: Unary) -> Self {
        Self::Unary(Box::new(unary))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Binary {
    pub left: Expression,
    pub operator: &'static BinaryOperator,
    pub right: Expression,
}

impl From<Binary> for BareExpression {
    fn from(binary: Binary) -> Self {
        Self::Binary(Box::new(binary))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Call {
    pub function: Function,
    pub arguments: Vec<Expression>,
}

impl From<Call> for BareExpression {
    fn from(call: Call) -> Self {
        Self::Call(Box::new(call))
    }
}

/// A conversion of a value to another type.
#[derive(Clone, PartialEq, Debug)]
pub struct Conversion {
    pub type_: Type,
    pub expression: Expression,
}

impl From<Conversion> for BareExpression {
    fn from(conversion: Conversion) -> Self {
        Self::Conversion(Box::new(conversion))
    }
}

/// A runtime value.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Text(Arc<str>),
}

impl Value {
    pub fn type_(&self) -> Type {
        match self {
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Text(_) => Type::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value.into())
    }
}
