//! The tables of legal operator applications.
//!
//! Binding an operator is an exact lookup by token and operand types.

use lexer::TokenName::{self, *};
use symbol::Type::{self, *};

#[derive(PartialEq, Eq, Debug)]
pub struct UnaryOperator {
    pub token: TokenName,
    pub kind: UnaryOperatorKind,
    pub operand: Type,
    pub result: Type,
}

impl UnaryOperator {
    const fn new(token: TokenName, kind: UnaryOperatorKind, operand: Type, result: Type) -> Self {
        Self {
            token,
            kind,
            operand,
            result,
        }
    }

    pub fn bind(token: TokenName, operand: Type) -> Option<&'static Self> {
        UNARY_OPERATORS
            .iter()
            .find(|operator| operator.token == token && operator.operand == operand)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
}

impl UnaryOperatorKind {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Identity => "+",
            Self::Negation => "-",
            Self::LogicalNegation => "!",
            Self::OnesComplement => "~",
        }
    }
}

pub static UNARY_OPERATORS: [UnaryOperator; 4] = {
    use UnaryOperatorKind::*;

    [
        UnaryOperator::new(Plus, Identity, Int, Int),
        UnaryOperator::new(Minus, Negation, Int, Int),
        UnaryOperator::new(Tilde, OnesComplement, Int, Int),
        UnaryOperator::new(ExclamationMark, LogicalNegation, Bool, Bool),
    ]
};

#[derive(PartialEq, Eq, Debug)]
pub struct BinaryOperator {
    pub token: TokenName,
    pub kind: BinaryOperatorKind,
    pub left: Type,
    pub right: Type,
    pub result: Type,
}

impl BinaryOperator {
    const fn new(
        token: TokenName,
        kind: BinaryOperatorKind,
        operands: Type,
        result: Type,
    ) -> Self {
        Self {
            token,
            kind,
            left: operands,
            right: operands,
            result,
        }
    }

    pub fn bind(token: TokenName, left: Type, right: Type) -> Option<&'static Self> {
        BINARY_OPERATORS.iter().find(|operator| {
            operator.token == token && operator.left == left && operator.right == right
        })
    }

    /// The operator `<=` on integers.
    pub fn int_less_or_equals() -> &'static Self {
        &BINARY_OPERATORS[10]
    }

    /// The operator `+` on integers.
    pub fn int_addition() -> &'static Self {
        &BINARY_OPERATORS[0]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    LogicalAnd,
    LogicalOr,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

impl BinaryOperatorKind {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Addition => "+",
            Self::Subtraction => "-",
            Self::Multiplication => "*",
            Self::Division => "/",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::BitwiseAnd => "&",
            Self::BitwiseOr => "|",
            Self::BitwiseXor => "^",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::Less => "<",
            Self::LessOrEquals => "<=",
            Self::Greater => ">",
            Self::GreaterOrEquals => ">=",
        }
    }
}

pub static BINARY_OPERATORS: [BinaryOperator; 23] = {
    use BinaryOperatorKind::*;

    [
        BinaryOperator::new(Plus, Addition, Int, Int),
        BinaryOperator::new(Minus, Subtraction, Int, Int),
        BinaryOperator::new(Asterisk, Multiplication, Int, Int),
        BinaryOperator::new(Slash, Division, Int, Int),
        BinaryOperator::new(Ampersand, BitwiseAnd, Int, Int),
        BinaryOperator::new(VerticalBar, BitwiseOr, Int, Int),
        BinaryOperator::new(Caret, BitwiseXor, Int, Int),
        BinaryOperator::new(DoubleEquals, Equals, Int, Bool),
        BinaryOperator::new(ExclamationMarkEquals, NotEquals, Int, Bool),
        BinaryOperator::new(LessThan, Less, Int, Bool),
        BinaryOperator::new(LessThanEquals, LessOrEquals, Int, Bool),
        BinaryOperator::new(GreaterThan, Greater, Int, Bool),
        BinaryOperator::new(GreaterThanEquals, GreaterOrEquals, Int, Bool),
        BinaryOperator::new(DoubleAmpersand, LogicalAnd, Bool, Bool),
        BinaryOperator::new(DoubleVerticalBar, LogicalOr, Bool, Bool),
        BinaryOperator::new(Ampersand, BitwiseAnd, Bool, Bool),
        BinaryOperator::new(VerticalBar, BitwiseOr, Bool, Bool),
        BinaryOperator::new(Caret, BitwiseXor, Bool, Bool),
        BinaryOperator::new(DoubleEquals, Equals, Bool, Bool),
        BinaryOperator::new(ExclamationMarkEquals, NotEquals, Bool, Bool),
        BinaryOperator::new(Plus, Addition, String, String),
        BinaryOperator::new(DoubleEquals, Equals, String, Bool),
        BinaryOperator::new(ExclamationMarkEquals, NotEquals, String, Bool),
    ]
};
