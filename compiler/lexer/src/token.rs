//! The tokens emitted by the lexer.

use span::{Span, Spanning};
use std::fmt;
use utility::{quoted, Atom};

/// A token together with its location and its provenance.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    pub bare: BareToken,
    pub span: Span,
    pub provenance: Provenance,
}

impl Token {
    pub const fn new(span: Span, bare: BareToken) -> Self {
        Self {
            bare,
            span,
            provenance: Provenance::Source,
        }
    }

    /// Fabricate a token that is absent from the source code.
    ///
    /// Used by the parser to recover from syntax errors.
    pub fn missing(span: Span, name: TokenName) -> Self {
        Self {
            bare: name.fabricate(),
            span,
            provenance: Provenance::Missing,
        }
    }

    pub const fn name(&self) -> TokenName {
        self.bare.name()
    }

    pub fn is_missing(&self) -> bool {
        self.provenance == Provenance::Missing
    }
}

impl Spanning for Token {
    fn span(&self) -> Span {
        self.span
    }
}

/// Whether a token stems from the source code or was fabricated during error recovery.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Provenance {
    Source,
    /// The span of such a token is the location where the token was expected.
    Missing,
}

macro_rules! tokens {
    (
        data {
            $( $Data:ident($Type:ty) = $default:expr => $data:literal ),* $(,)?
        }
        keywords {
            $( $Keyword:ident => $keyword:literal ),* $(,)?
        }
        punctuation {
            $( $Punctuation:ident => $punctuation:literal ),* $(,)?
        }
        other {
            $( $( #[$attribute:meta] )* $Other:ident => $other:literal ),* $(,)?
        }
    ) => {
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub enum BareToken {
            $( $Data($Type), )*
            $( $Keyword, )*
            $( $Punctuation, )*
            $( $( #[$attribute] )* $Other, )*
        }

        impl BareToken {
            pub const fn name(self) -> TokenName {
                match self {
                    $( Self::$Data(_) => TokenName::$Data, )*
                    $( Self::$Keyword => TokenName::$Keyword, )*
                    $( Self::$Punctuation => TokenName::$Punctuation, )*
                    $( Self::$Other => TokenName::$Other, )*
                }
            }
        }

        /// The kind of a token stripped from any data it carries.
        #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
        pub enum TokenName {
            $( $Data, )*
            $( $Keyword, )*
            $( $Punctuation, )*
            $( $Other, )*
        }

        impl TokenName {
            /// A token of this kind carrying placeholder data if any.
            fn fabricate(self) -> BareToken {
                match self {
                    $( Self::$Data => BareToken::$Data($default), )*
                    $( Self::$Keyword => BareToken::$Keyword, )*
                    $( Self::$Punctuation => BareToken::$Punctuation, )*
                    $( Self::$Other => BareToken::$Other, )*
                }
            }
        }

        impl fmt::Display for TokenName {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $( Self::$Data => $data, )*
                    $( Self::$Keyword => quoted!($keyword), )*
                    $( Self::$Punctuation => quoted!($punctuation), )*
                    $( Self::$Other => $other, )*
                })
            }
        }

        pub(crate) fn parse_keyword(source: &str) -> Option<BareToken> {
            Some(match source {
                $( $keyword => BareToken::$Keyword, )*
                _ => return None,
            })
        }
    };
}

tokens! {
    data {
        Number(i32) = 0 => "number literal",
        Text(Atom) = Atom::EMPTY => "text literal",
        Word(Atom) = Atom::EMPTY => "word",
    }
    keywords {
        Break => "break",
        Continue => "continue",
        Do => "do",
        Else => "else",
        False => "false",
        For => "for",
        Function => "function",
        If => "if",
        Let => "let",
        Return => "return",
        To => "to",
        True => "true",
        Var => "var",
        While => "while",
    }
    punctuation {
        Plus => "+",
        Minus => "-",
        Asterisk => "*",
        Slash => "/",
        ExclamationMark => "!",
        Tilde => "~",
        Ampersand => "&",
        DoubleAmpersand => "&&",
        VerticalBar => "|",
        DoubleVerticalBar => "||",
        Caret => "^",
        Equals => "=",
        DoubleEquals => "==",
        ExclamationMarkEquals => "!=",
        LessThan => "<",
        LessThanEquals => "<=",
        GreaterThan => ">",
        GreaterThanEquals => ">=",
        OpeningRoundBracket => "(",
        ClosingRoundBracket => ")",
        OpeningCurlyBracket => "{",
        ClosingCurlyBracket => "}",
        Comma => ",",
        Colon => ":",
    }
    other {
        /// Spaces and tabs.
        Whitespace => "whitespace",
        /// `\n`, `\r\n` or `\r`.
        LineBreak => "line break",
        /// A line comment introduced by `//`.
        Comment => "comment",
        /// A character that does not start any token.
        Unknown => "unknown character",
        EndOfInput => "end of input",
    }
}

impl BareToken {
    /// Whether the parser skips over the token.
    pub const fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace | Self::LineBreak | Self::Comment)
    }
}

impl fmt::Display for BareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "number literal ‘{value}’"),
            Self::Word(word) => write!(f, "word ‘{word}’"),
            _ => write!(f, "{}", self.name()),
        }
    }
}
