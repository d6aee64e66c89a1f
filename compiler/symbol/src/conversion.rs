use crate::Type;

/// The kind of conversion between two types.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Conversion {
    /// The types cannot be converted into each other.
    None,
    Identity,
    /// A conversion that is inserted where needed.
    Implicit,
    /// A conversion that has to be written out, e.g. `string(1)`.
    Explicit,
}

impl Conversion {
    pub fn classify(from: Type, to: Type) -> Self {
        use Type::*;

        match (from, to) {
            _ if from == to => Self::Identity,
            (_, Any) if from != Void => Self::Implicit,
            (Any, _) if to != Void => Self::Explicit,
            (Bool | Int, String) | (String, Bool | Int) => Self::Explicit,
            _ => Self::None,
        }
    }

    pub const fn exists(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Whether the conversion may be inserted without being written out.
    pub const fn is_implicit(self) -> bool {
        matches!(self, Self::Identity | Self::Implicit)
    }
}
