//! The abstract syntax tree (AST).
//!
//! The most important definitions are [`Member`], [`Statement`] and [`Expression`].
//! A generic view on the tree for traversal and printing is provided by [`Node`].

use lexer::{Provenance, Token, TokenName};
use span::{Span, Spanned, Spanning};
use std::{fmt, sync::Arc};
use utility::{obtain, Atom};

pub use render::Node;

mod render;

#[cfg(test)]
mod test;

/// The root of a syntax tree: the syntactic content of one source file or submission.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CompilationUnit {
    pub members: Vec<Member>,
    pub span: Span,
}

impl CompilationUnit {
    pub fn functions(&self) -> impl Iterator<Item = &Arc<Function>> {
        self.members
            .iter()
            .filter_map(|member| obtain!(&member.bare, BareMember::Function(function) => function))
    }

    pub fn global_statements(&self) -> impl Iterator<Item = &Statement> {
        self.members.iter().filter_map(
            |member| obtain!(&member.bare, BareMember::GlobalStatement(statement) => statement),
        )
    }
}

/// A top-level item of a compilation unit.
pub type Member = Spanned<BareMember>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BareMember {
    Function(Arc<Function>),
    GlobalStatement(Statement),
}

/// A function declaration.
///
/// # Examples
///
/// ```cinder
/// function add(a: int, b: int): int {
///     return a + b
/// }
/// ```
///
/// * `add` is the *binder*
/// * `a: int` and `b: int` are the *parameters*
/// * `int` following the closing round bracket is the *type*
/// * the block is the *body*
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Function {
    pub binder: Identifier,
    pub parameters: Vec<Parameter>,
    pub type_: Option<Identifier>,
    pub body: Statement,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Parameter {
    pub binder: Identifier,
    pub type_: Identifier,
}

impl Spanning for Parameter {
    fn span(&self) -> Span {
        self.binder.span.merge(self.type_)
    }
}

/// A statement.
pub type Statement = Spanned<BareStatement>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BareStatement {
    Block(Vec<Statement>),
    VariableDeclaration(Box<VariableDeclaration>),
    If(Box<If>),
    While(Box<While>),
    DoWhile(Box<DoWhile>),
    For(Box<For>),
    Break,
    Continue,
    Return(Option<Expression>),
    Expression(Expression),
}

/// A variable declaration.
///
/// # Examples
///
/// ```cinder
/// let limit: int = 10
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct VariableDeclaration {
    pub mutability: Mutability,
    pub binder: Identifier,
    pub type_: Option<Identifier>,
    pub value: Expression,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mutability {
    /// Declared with `var`.
    Mutable,
    /// Declared with `let`.
    Immutable,
}

impl Mutability {
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Mutable => "var",
            Self::Immutable => "let",
        }
    }
}

/// An if-statement with an optional else-clause.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct If {
    pub condition: Expression,
    pub consequent: Statement,
    pub alternative: Option<Statement>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct While {
    pub condition: Expression,
    pub body: Statement,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DoWhile {
    pub body: Statement,
    pub condition: Expression,
}

/// A counting loop.
///
/// # Examples
///
/// ```cinder
/// for i = 1 to 10 print(string(i))
/// ```
///
/// Both bounds are inclusive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct For {
    pub binder: Identifier,
    pub lower: Expression,
    pub upper: Expression,
    pub body: Statement,
}

/// An expression.
pub type Expression = Spanned<BareExpression>;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BareExpression {
    BooleanLiteral(bool),
    NumberLiteral(i32),
    TextLiteral(Atom),
    Name(Identifier),
    Unary(Box<Unary>),
    Binary(Box<Binary>),
    Assignment(Box<Assignment>),
    Call(Box<Call>),
    Parenthesized(Box<Expression>),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Unary {
    pub operator: Spanned<TokenName>,
    pub operand: Expression,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Binary {
    pub left: Expression,
    pub operator: Spanned<TokenName>,
    pub right: Expression,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Assignment {
    pub binder: Identifier,
    pub value: Expression,
}

/// A function call or, if the callee names a type, a conversion.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Call {
    pub callee: Identifier,
    pub arguments: Vec<Expression>,
}

/// A name of a variable, function, parameter or type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Identifier {
    pub bare: Atom,
    pub span: Span,
    pub provenance: Provenance,
}

impl Identifier {
    /// Create an identifier from a word token.
    ///
    /// Fabricated tokens yield an empty identifier.
    pub fn new(token: Token) -> Self {
        Self {
            bare: obtain!(token.bare, lexer::BareToken::Word(word) => word).unwrap_or(Atom::EMPTY),
            span: token.span,
            provenance: token.provenance,
        }
    }

    pub fn to_str(self) -> &'static str {
        self.bare.to_str()
    }

    /// Whether the identifier was fabricated by the parser during error recovery.
    pub fn is_missing(self) -> bool {
        self.provenance == Provenance::Missing
    }
}

impl Spanning for Identifier {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bare)
    }
}
