//! Symbols: the entities names resolve to.
//!
//! Variables and functions are compared by identity, types by value.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, LazyLock,
    },
};
use utility::Atom;

pub use conversion::Conversion;
pub use label::{Label, LabelGenerator, LabelKind};

mod conversion;
mod label;

#[cfg(test)]
mod test;

/// A type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Type {
    /// The type of erroneous expressions.
    ///
    /// It is compatible with every other type to prevent cascading errors.
    Error,
    Any,
    Bool,
    Int,
    String,
    /// The absence of a value. Only found as the return type of functions.
    Void,
}

impl Type {
    pub const fn name(self) -> Atom {
        match self {
            Self::Error => Atom::ERROR,
            Self::Any => Atom::ANY,
            Self::Bool => Atom::BOOL,
            Self::Int => Atom::INT,
            Self::String => Atom::STRING,
            Self::Void => Atom::VOID,
        }
    }

    /// Look up a type by the name it has in source code.
    pub fn lookup(name: Atom) -> Option<Self> {
        [Self::Any, Self::Bool, Self::Int, Self::String]
            .into_iter()
            .find(|type_| type_.name() == name)
    }

    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

fn fresh_id() -> u32 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A variable.
pub type Variable = Arc<VariableSymbol>;

#[derive(Debug)]
pub struct VariableSymbol {
    id: u32,
    pub name: Atom,
    pub type_: Type,
    pub is_read_only: bool,
    pub kind: VariableKind,
}

impl VariableSymbol {
    pub fn new(name: Atom, type_: Type, is_read_only: bool, kind: VariableKind) -> Variable {
        Arc::new(Self {
            id: fresh_id(),
            name,
            type_,
            is_read_only,
            kind,
        })
    }
}

impl PartialEq for VariableSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for VariableSymbol {}

impl Hash for VariableSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for VariableSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Where a variable lives at runtime.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VariableKind {
    /// Declared outside of any function. Survives chained submissions.
    Global,
    /// Declared inside of a function body.
    Local,
    Parameter,
}

/// A function.
pub type Function = Arc<FunctionSymbol>;

#[derive(Debug)]
pub struct FunctionSymbol {
    id: u32,
    pub name: Atom,
    pub parameters: Vec<Variable>,
    pub type_: Type,
    /// The syntax the function was declared with. Absent for builtins.
    pub declaration: Option<Arc<ast::Function>>,
    pub builtin: Option<Builtin>,
}

impl FunctionSymbol {
    pub fn new(
        name: Atom,
        parameters: Vec<Variable>,
        type_: Type,
        declaration: Arc<ast::Function>,
    ) -> Function {
        Arc::new(Self {
            id: fresh_id(),
            name,
            parameters,
            type_,
            declaration: Some(declaration),
            builtin: None,
        })
    }

    fn builtin(builtin: Builtin, parameters: &[(Atom, Type)], type_: Type) -> Function {
        Arc::new(Self {
            id: fresh_id(),
            name: builtin.name(),
            parameters: parameters
                .iter()
                .map(|&(name, type_)| VariableSymbol::new(name, type_, true, VariableKind::Parameter))
                .collect(),
            type_,
            declaration: None,
            builtin: Some(builtin),
        })
    }
}

impl PartialEq for FunctionSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FunctionSymbol {}

impl Hash for FunctionSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A function provided by the runtime.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Builtin {
    /// `print(text: string)`
    Print,
    /// `input(): string`
    Input,
    /// `rand(max: int): int`
    Rand,
}

impl Builtin {
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Print, Self::Input, Self::Rand].into_iter()
    }

    pub const fn name(self) -> Atom {
        match self {
            Self::Print => Atom::PRINT,
            Self::Input => Atom::INPUT,
            Self::Rand => Atom::RAND,
        }
    }

    pub fn symbol(self) -> &'static Function {
        static PRINT: LazyLock<Function> = LazyLock::new(|| {
            FunctionSymbol::builtin(Builtin::Print, &[(Atom::TEXT, Type::String)], Type::Void)
        });
        static INPUT: LazyLock<Function> =
            LazyLock::new(|| FunctionSymbol::builtin(Builtin::Input, &[], Type::String));
        static RAND: LazyLock<Function> = LazyLock::new(|| {
            FunctionSymbol::builtin(Builtin::Rand, &[(Atom::MAX, Type::Int)], Type::Int)
        });

        match self {
            Self::Print => &PRINT,
            Self::Input => &INPUT,
            Self::Rand => &RAND,
        }
    }
}
