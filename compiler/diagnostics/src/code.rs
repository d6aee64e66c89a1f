use std::fmt;

/// An error code.
///
/// Codes are grouped into ranges by the [phase](Phase) that reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[forbid(missing_docs)]
pub enum ErrorCode {
    /// Number literal does not fit a 32-bit signed integer.
    E001,
    /// Invalid character.
    E002,
    /// Unexpected null terminator.
    E003,
    /// Unterminated text literal.
    E004,
    /// Unexpected token.
    E010,
    /// Undefined identifier.
    E020,
    /// Undefined unary operator for the given operand type.
    E021,
    /// Undefined binary operator for the given operand types.
    E022,
    /// `break` or `continue` outside of a loop.
    E023,
    /// Not all code paths of a function return a value.
    E024,
    /// Symbol already declared in the same scope.
    E025,
    /// Duplicate parameter name.
    E026,
    /// Assignment to a read-only variable.
    E027,
    /// Impossible conversion.
    E028,
    /// Conversion that has to be made explicit.
    E029,
    /// Undefined function.
    E030,
    /// Wrong number of arguments.
    E031,
    /// Wrong argument type.
    E032,
    /// Expression without a value used where a value is required.
    E033,
    /// Undefined type.
    E034,
    /// `return` outside of a function.
    E035,
    /// `return` with an expression in a function without a return type.
    E036,
    /// `return` without an expression in a function with a return type.
    E037,
    /// Call of something that is not a function.
    E038,
    /// Use of something that is not a variable as a value.
    E039,
    /// Division by zero.
    E050,
    /// Text that cannot be converted at runtime.
    E051,
    /// Failure to read from standard input or to write to standard output.
    E052,
    /// Non-positive upper bound passed to `rand`.
    E053,
}

impl ErrorCode {
    pub const fn phase(self) -> Phase {
        use ErrorCode::*;

        match self {
            E001 | E002 | E003 | E004 => Phase::Lexer,
            E010 => Phase::Syntax,
            E020 | E021 | E022 | E023 | E024 | E025 | E026 | E027 | E028 | E029 | E030 | E031
            | E032 | E033 | E034 | E035 | E036 | E037 | E038 | E039 => Phase::Binding,
            E050 | E051 | E052 | E053 => Phase::Evaluation,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The stage of the pipeline a diagnostic stems from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Syntax,
    Binding,
    /// Code generation. Not performed by this compiler but reserved for backends.
    Emit,
    Evaluation,
}

impl Phase {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lexer => "lexer",
            Self::Syntax => "syntax",
            Self::Binding => "binding",
            Self::Emit => "emit",
            Self::Evaluation => "evaluation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
