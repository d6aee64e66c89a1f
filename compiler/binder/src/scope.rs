//! The scope stack.

use hir::GlobalScope;
use symbol::{Builtin, Function, Variable};
use utility::{Atom, HashMap};

/// The entity a name refers to.
#[derive(Clone)]
pub(crate) enum Symbol {
    Variable(Variable),
    Function(Function),
}

/// A stack of scopes from the outermost one containing the builtins to the innermost one.
///
/// Lookup walks the stack from the innermost scope outward.
pub(crate) struct Scopes {
    frames: Vec<HashMap<Atom, Symbol>>,
}

impl Scopes {
    /// Create the scopes of a submission seeded with the declarations of all previous ones.
    pub(crate) fn new(previous: Option<&GlobalScope>) -> Self {
        let mut scopes = Self { frames: Vec::new() };

        scopes.push();
        for builtin in Builtin::all() {
            let function = builtin.symbol().clone();
            scopes.declare(function.name, Symbol::Function(function));
        }

        let mut chain = Vec::new();
        let mut scope = previous;
        while let Some(global_scope) = scope {
            chain.push(global_scope);
            scope = global_scope.previous.as_deref();
        }

        for global_scope in chain.into_iter().rev() {
            scopes.push();

            for function in &global_scope.functions {
                scopes.overwrite(function.name, Symbol::Function(function.clone()));
            }
            for variable in &global_scope.variables {
                scopes.overwrite(variable.name, Symbol::Variable(variable.clone()));
            }
        }

        scopes.push();
        scopes
    }

    pub(crate) fn push(&mut self) {
        self.frames.push(HashMap::default());
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Declare a symbol in the innermost scope.
    ///
    /// Returns `false` if the name is already taken in this scope.
    pub(crate) fn declare(&mut self, name: Atom, symbol: Symbol) -> bool {
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };

        if frame.contains_key(&name) {
            return false;
        }

        frame.insert(name, symbol);
        true
    }

    fn overwrite(&mut self, name: Atom, symbol: Symbol) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, symbol);
        }
    }

    pub(crate) fn lookup(&self, name: Atom) -> Option<&Symbol> {
        self.frames.iter().rev().find_map(|frame| frame.get(&name))
    }

    /// Replace the variable of the same name in the innermost scope declaring it.
    pub(crate) fn replace(&mut self, variable: Variable) {
        if let Some(frame) = self
            .frames
            .iter_mut()
            .rev()
            .find(|frame| frame.contains_key(&variable.name))
        {
            frame.insert(variable.name, Symbol::Variable(variable));
        }
    }

    /// Find a binding in scope whose name is similar to the given one.
    ///
    /// Used for error reporting when an undefined binding was encountered.
    pub(crate) fn find_similarly_named(&self, name: Atom) -> Option<Atom> {
        self.frames.iter().rev().find_map(|frame| {
            frame
                .keys()
                .copied()
                .filter(|&other| other != name)
                .find(|other| is_similar(name.to_str(), other.to_str()))
        })
    }
}

fn is_similar(identifier: &str, other_identifier: &str) -> bool {
    strsim::levenshtein(other_identifier, identifier) <= std::cmp::max(identifier.len(), 3) / 3
}
