//! Compilations and their chaining.
//!
//! A compilation owns the parsed compilation units of a single submission. Later
//! submissions [continue](Compilation::continue_with) earlier ones and see their
//! declarations. The results of binding and lowering are computed at most once.

use ast::CompilationUnit;
use diagnostics::{
    error::{Health, Outcome, Result},
    Reporter,
};
use evaluator::{Context, Host};
use hir::{GlobalScope, Program, Value};
use std::sync::{Arc, OnceLock};


pub struct Compilation {
    previous: Option<Arc<Compilation>>,
    units: Vec<CompilationUnit>,
    /// Whether errors were reported while lexing or parsing the units.
    syntax_health: Health,
    global_scope: OnceLock<(Arc<GlobalScope>, Health)>,
    program: OnceLock<(Arc<Program>, Health)>,
}

impl Compilation {
    pub fn new(units: Vec<Outcome<CompilationUnit>>) -> Self {
        Self::with_previous(None, units)
    }

    /// Create a compilation that sees the declarations of this one.
    pub fn continue_with(self: &Arc<Self>, units: Vec<Outcome<CompilationUnit>>) -> Self {
        Self::with_previous(Some(self.clone()), units)
    }

    fn with_previous(
        previous: Option<Arc<Compilation>>,
        units: Vec<Outcome<CompilationUnit>>,
    ) -> Self {
        let mut syntax_health = Health::Untainted;
        let units = units
            .into_iter()
            .map(|unit| {
                syntax_health = syntax_health.and(unit.health);
                unit.bare
            })
            .collect();

        Self {
            previous,
            units,
            syntax_health,
            global_scope: OnceLock::new(),
            program: OnceLock::new(),
        }
    }

    pub fn previous(&self) -> Option<&Arc<Compilation>> {
        self.previous.as_ref()
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    /// The global declarations and the bound global statements of this submission.
    pub fn global_scope(&self, reporter: &Reporter) -> Outcome<Arc<GlobalScope>> {
        let (global_scope, health) = self.global_scope.get_or_init(|| {
            let previous = self
                .previous
                .as_ref()
                .map(|previous| previous.global_scope(reporter).bare);
            let outcome = binder::bind_global_scope(previous, &self.units, reporter);

            (Arc::new(outcome.bare), outcome.health)
        });

        Outcome::new(global_scope.clone(), *health)
    }

    /// The bound and lowered program of this submission.
    pub fn program(&self, reporter: &Reporter) -> Outcome<Arc<Program>> {
        let (program, health) = self.program.get_or_init(|| {
            let previous = self
                .previous
                .as_ref()
                .map(|previous| previous.program(reporter).bare);
            let global_scope = self.global_scope(reporter).bare;
            let outcome = binder::bind_program(previous, global_scope, reporter);

            (Arc::new(outcome.bare), outcome.health)
        });

        Outcome::new(program.clone(), *health)
    }

    /// Whether errors were reported for this submission or any previous one.
    ///
    /// Binds and lowers the program if that has not happened yet.
    pub fn health(&self, reporter: &Reporter) -> Health {
        let health = self
            .syntax_health
            .and(self.global_scope(reporter).health)
            .and(self.program(reporter).health);

        match &self.previous {
            Some(previous) => previous.health(reporter).and(health),
            None => health,
        }
    }

    /// Evaluate the global statements of this submission.
    ///
    /// Refuses to evaluate if any errors were reported during compilation since the
    /// program then contains placeholders.
    pub fn evaluate<H: Host>(
        &self,
        context: &mut Context<H>,
        reporter: &Reporter,
    ) -> Result<Option<Value>> {
        if let Health::Tainted(error) = self.health(reporter) {
            return Err(error);
        }

        evaluator::evaluate(&self.program(reporter).bare, context, reporter)
    }
}
