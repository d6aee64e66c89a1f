use crate::Statement;
use std::sync::Arc;
use symbol::{Function, Variable};
use utility::HashMap;

/// The declarations and the bound global statements of a single submission.
///
/// Later submissions see the declarations of earlier ones through [`Self::previous`].
#[derive(Debug)]
pub struct GlobalScope {
    pub previous: Option<Arc<GlobalScope>>,
    /// The functions declared by this submission in declaration order.
    pub functions: Vec<Function>,
    /// The global variables declared by this submission in declaration order.
    pub variables: Vec<Variable>,
    pub statements: Vec<Statement>,
}

/// The lowered bodies of all functions and global statements of a submission.
#[derive(Debug)]
pub struct Program {
    pub previous: Option<Arc<Program>>,
    pub global_scope: Arc<GlobalScope>,
    /// The lowered bodies of the functions declared by this submission.
    pub functions: HashMap<Function, Vec<Statement>>,
    /// The lowered global statements.
    pub statements: Vec<Statement>,
}

impl Program {
    /// Find the body of the given function in this program or any previous one.
    pub fn body(&self, function: &Function) -> Option<&[Statement]> {
        let mut program = self;

        loop {
            if let Some(body) = program.functions.get(function) {
                return Some(body.as_slice());
            }

            program = program.previous.as_deref()?;
        }
    }

    /// The functions declared by this submission together with their bodies in declaration order.
    pub fn function_bodies(&self) -> impl Iterator<Item = (&Function, &[Statement])> {
        self.global_scope.functions.iter().filter_map(|function| {
            self.functions
                .get(function)
                .map(|body| (function, body.as_slice()))
        })
    }
}
