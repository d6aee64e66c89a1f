//! Interned strings.

use crate::HashMap;
use index_map::{Index, IndexMap};
use std::{
    fmt,
    iter::zip,
    sync::{LazyLock, Mutex, MutexGuard, PoisonError},
};

/// An interned string.
///
/// Comparing and hashing atoms is as cheap as comparing and hashing integers.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(u32);

impl Atom {
    pub fn to_str(self) -> &'static str {
        Interner::the().get(self)
    }
}

impl From<&str> for Atom {
    fn from(value: &str) -> Self {
        Interner::the().intern_borrowed(value)
    }
}

impl From<String> for Atom {
    fn from(value: String) -> Self {
        Interner::the().intern_owned(value)
    }
}

impl Index for Atom {
    fn new(index: usize) -> Self {
        Self(index.try_into().unwrap_or(u32::MAX))
    }

    fn value(self) -> usize {
        self.0 as _
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_str())
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

// No ordering impls for Atom: comparison by index would be unintuitive while
// comparison by string would be slow. Use `Atom::to_str` to opt into the latter.

struct Interner {
    atoms: HashMap<&'static str, Atom>,
    strings: IndexMap<Atom, &'static str>,
}

impl Interner {
    fn the() -> MutexGuard<'static, Self> {
        static SELF: LazyLock<Mutex<Interner>> = LazyLock::new(|| Mutex::new(Interner::new()));

        // The interner stays consistent even if a thread panicked while holding the lock.
        SELF.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with(values: Vec<&'static str>) -> Self {
        Self {
            atoms: zip(&values, 0..)
                .map(|(&string, atom)| (string, Atom(atom)))
                .collect(),
            strings: IndexMap::bare(values),
        }
    }

    fn intern_borrowed(&mut self, value: &str) -> Atom {
        if let Some(&atom) = self.atoms.get(value) {
            return atom;
        }

        self.insert(Box::leak(Box::from(value)))
    }

    fn intern_owned(&mut self, value: String) -> Atom {
        if let Some(&atom) = self.atoms.get(&*value) {
            return atom;
        }

        self.insert(String::leak(value))
    }

    fn insert(&mut self, value: &'static str) -> Atom {
        let atom = self.strings.insert(value);
        self.atoms.insert(value, atom);
        atom
    }

    fn get(&self, atom: Atom) -> &'static str {
        self.strings[atom]
    }
}

macro_rules! atoms {
    ($( $atom:ident => $string:literal ),* $(,)?) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[repr(u32)]
        enum Predefined {
            $( $atom ),*
        }

        impl Atom {
            $(
                pub const $atom: Self = Self(Predefined::$atom as u32);
            )*
        }

        impl Interner {
            fn new() -> Self {
                Self::with(vec![
                    $( $string ),*
                ])
            }
        }
    };
}

atoms! {
    EMPTY => "",
    ANY => "any",
    BOOL => "bool",
    ERROR => "?",
    INPUT => "input",
    INT => "int",
    MAX => "max",
    PRINT => "print",
    RAND => "rand",
    STRING => "string",
    TEXT => "text",
    UPPER_BOUND => "upperBound",
    VOID => "void",
}

#[cfg(test)]
mod test {
    use super::Atom;

    #[test]
    fn predefined_atoms_resolve_to_their_strings() {
        assert_eq!(Atom::PRINT.to_str(), "print");
        assert_eq!(Atom::EMPTY.to_str(), "");
        assert_eq!(Atom::from("string"), Atom::STRING);
    }

    #[test]
    fn interning_is_idempotent() {
        let first = Atom::from("hypotenuse");
        let second = Atom::from(String::from("hypotenuse"));

        assert_eq!(first, second);
        assert_eq!(first.to_str(), "hypotenuse");
        assert_ne!(first, Atom::from("cathetus"));
    }
}
