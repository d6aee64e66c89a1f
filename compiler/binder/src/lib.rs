//! The binder.
//!
//! It resolves names to symbols, checks types and turns the syntax tree into the
//! [bound tree](hir). Binding happens in two steps:
//!
//! 1. [`bind_global_scope`] declares the functions of a submission and binds its
//!    global statements.
//! 2. [`bind_program`] binds and lowers the bodies of these functions and lowers the
//!    global statements.
//!
//! Errors never stop binding. Erroneous expressions are replaced by placeholders.

use ast::Identifier;
use diagnostics::{
    error::{Health, Outcome},
    Diagnostic, ErrorCode, Reporter,
};
use hir::{GlobalScope, LoopLabels, Program};
use scope::{Scopes, Symbol};
use span::Span;
use std::sync::Arc;
use symbol::{
    Conversion, Function, FunctionSymbol, LabelGenerator, LabelKind, Type, Variable, VariableKind,
    VariableSymbol,
};
use utility::{HashSet, QuoteExt};

mod expression;
mod scope;

#[cfg(test)]
mod test;

/// Bind the global declarations and statements of a submission.
///
/// The declarations of `previous` and all of its predecessors are visible to the submission.
pub fn bind_global_scope(
    previous: Option<Arc<GlobalScope>>,
    units: &[ast::CompilationUnit],
    reporter: &Reporter,
) -> Outcome<GlobalScope> {
    let mut binder = Binder::new(Scopes::new(previous.as_deref()), None, reporter);

    let mut functions = Vec::new();
    for declaration in units.iter().flat_map(ast::CompilationUnit::functions) {
        functions.extend(binder.declare_function(declaration));
    }

    let mut statements = Vec::new();
    for statement in units.iter().flat_map(ast::CompilationUnit::global_statements) {
        statements.push(binder.bind_statement(statement));
    }

    Outcome::new(
        GlobalScope {
            previous,
            functions,
            variables: binder.globals,
            statements,
        },
        binder.health,
    )
}

/// Bind the bodies of the functions of the given global scope and lower everything.
pub fn bind_program(
    previous: Option<Arc<Program>>,
    global_scope: Arc<GlobalScope>,
    reporter: &Reporter,
) -> Outcome<Program> {
    let mut health = Health::Untainted;
    let mut functions = utility::HashMap::default();

    for function in &global_scope.functions {
        let Some(declaration) = &function.declaration else {
            continue;
        };

        let mut scopes = Scopes::new(Some(&*global_scope));
        scopes.push();
        for parameter in &function.parameters {
            scopes.declare(parameter.name, Symbol::Variable(parameter.clone()));
        }

        let mut binder = Binder::new(scopes, Some(function.clone()), reporter);
        let body = binder.bind_statement(&declaration.body);
        health = health.and(binder.health);

        let body = lowerer::lower(body);

        if !matches!(function.type_, Type::Void | Type::Error)
            && !control_flow::all_paths_return(&body)
        {
            let error = Diagnostic::error()
                .code(ErrorCode::E024)
                .message(format!(
                    "not all code paths of the function {} return a value",
                    function.name.quote()
                ))
                .span(declaration.binder, "function returning a value")
                .report(reporter);
            health.taint(error);
        }

        functions.insert(function.clone(), body);
    }

    let statements = lowerer::lower(hir::Statement::Block(global_scope.statements.clone()));

    Outcome::new(
        Program {
            previous,
            global_scope,
            functions,
            statements,
        },
        health,
    )
}

struct Binder<'a> {
    scopes: Scopes,
    /// The function whose body is being bound.
    function: Option<Function>,
    /// The number of scopes opened inside of the function body or the global statements.
    depth: usize,
    /// The labels of the enclosing loops, innermost last.
    loops: Vec<LoopLabels>,
    labels: LabelGenerator,
    /// The global variables declared so far.
    globals: Vec<Variable>,
    reporter: &'a Reporter,
    health: Health,
}

impl<'a> Binder<'a> {
    fn new(scopes: Scopes, function: Option<Function>, reporter: &'a Reporter) -> Self {
        Self {
            scopes,
            function,
            depth: 0,
            loops: Vec::new(),
            labels: LabelGenerator::default(),
            globals: Vec::new(),
            reporter,
            health: Health::Untainted,
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push();
        self.depth += 1;
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
        self.depth -= 1;
    }

    fn error(&mut self, diagnostic: Diagnostic) {
        let error = diagnostic.report(self.reporter);
        self.health.taint(error);
    }

    fn declare_function(&mut self, declaration: &Arc<ast::Function>) -> Option<Function> {
        let mut names = HashSet::default();
        let mut parameters = Vec::new();

        for parameter in &declaration.parameters {
            let type_ = self.bind_type(parameter.type_);

            if !names.insert(parameter.binder.bare) {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E026)
                        .message(format!(
                            "the parameter {} is declared more than once",
                            parameter.binder.to_str().quote()
                        ))
                        .unlabeled_span(parameter.binder),
                );
                continue;
            }

            parameters.push(VariableSymbol::new(
                parameter.binder.bare,
                type_,
                true,
                VariableKind::Parameter,
            ));
        }

        let type_ = match declaration.type_ {
            Some(type_) => self.bind_type(type_),
            None => Type::Void,
        };

        if declaration.binder.is_missing() {
            return None;
        }

        let function = FunctionSymbol::new(
            declaration.binder.bare,
            parameters,
            type_,
            declaration.clone(),
        );

        if !self
            .scopes
            .declare(function.name, Symbol::Function(function.clone()))
        {
            self.error(already_declared(declaration.binder));
        }

        Some(function)
    }

    fn bind_type(&mut self, identifier: Identifier) -> Type {
        if identifier.is_missing() {
            return Type::Error;
        }

        match Type::lookup(identifier.bare) {
            Some(type_) => type_,
            None => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E034)
                        .message(format!(
                            "the type {} is not defined",
                            identifier.to_str().quote()
                        ))
                        .unlabeled_span(identifier),
                );
                Type::Error
            }
        }
    }

    fn bind_statement(&mut self, statement: &ast::Statement) -> hir::Statement {
        use ast::BareStatement::*;

        match &statement.bare {
            Block(statements) => {
                self.enter_scope();
                let statements = statements
                    .iter()
                    .map(|statement| self.bind_statement(statement))
                    .collect();
                self.exit_scope();

                hir::Statement::Block(statements)
            }
            VariableDeclaration(declaration) => self.bind_variable_declaration(declaration),
            If(if_) => hir::If {
                condition: self.bind_expression_of_type(&if_.condition, Type::Bool),
                consequent: self.bind_statement(&if_.consequent),
                alternative: if_
                    .alternative
                    .as_ref()
                    .map(|alternative| self.bind_statement(alternative)),
            }
            .into(),
            While(while_) => {
                let condition = self.bind_expression_of_type(&while_.condition, Type::Bool);
                let (body, labels) = self.bind_loop_body(&while_.body);

                hir::While {
                    condition,
                    body,
                    labels,
                }
                .into()
            }
            DoWhile(do_while) => {
                let (body, labels) = self.bind_loop_body(&do_while.body);
                let condition = self.bind_expression_of_type(&do_while.condition, Type::Bool);

                hir::DoWhile {
                    body,
                    condition,
                    labels,
                }
                .into()
            }
            For(for_) => {
                let lower = self.bind_expression_of_type(&for_.lower, Type::Int);
                let upper = self.bind_expression_of_type(&for_.upper, Type::Int);

                self.enter_scope();
                let variable = self.declare_variable(for_.binder, Type::Int, true);
                let (body, labels) = self.bind_loop_body(&for_.body);
                self.exit_scope();

                hir::For {
                    variable,
                    lower,
                    upper,
                    body,
                    labels,
                }
                .into()
            }
            Break | Continue => {
                let Some(labels) = self.loops.last() else {
                    self.error(
                        Diagnostic::error()
                            .code(ErrorCode::E023)
                            .message(match statement.bare {
                                Break => "‘break’ outside of a loop",
                                _ => "‘continue’ outside of a loop",
                            })
                            .unlabeled_span(statement),
                    );
                    return hir::Statement::Expression(erroneous(statement.span));
                };

                hir::Statement::Goto(match statement.bare {
                    Break => labels.break_,
                    _ => labels.continue_,
                })
            }
            Return(value) => self.bind_return_statement(statement.span, value.as_ref()),
            Expression(expression) => {
                hir::Statement::Expression(self.bind_expression_allowing_void(expression))
            }
        }
    }

    fn bind_variable_declaration(
        &mut self,
        declaration: &ast::VariableDeclaration,
    ) -> hir::Statement {
        let type_ = declaration.type_.map(|type_| self.bind_type(type_));
        let value = self.bind_expression(&declaration.value);

        let value = match type_ {
            Some(type_) => self.convert(value, type_, false),
            None => value,
        };

        let variable = self.declare_variable(
            declaration.binder,
            type_.unwrap_or_else(|| value.type_()),
            declaration.mutability == ast::Mutability::Immutable,
        );

        hir::VariableDeclaration { variable, value }.into()
    }

    fn bind_loop_body(&mut self, body: &ast::Statement) -> (hir::Statement, LoopLabels) {
        let labels = LoopLabels {
            break_: self.labels.fresh(LabelKind::Break),
            continue_: self.labels.fresh(LabelKind::Continue),
        };

        self.loops.push(labels);
        let body = self.bind_statement(body);
        self.loops.pop();

        (body, labels)
    }

    fn bind_return_statement(
        &mut self,
        span: Span,
        value: Option<&ast::Expression>,
    ) -> hir::Statement {
        let value = value.map(|value| self.bind_expression(value));

        let Some(function) = self.function.clone() else {
            self.error(
                Diagnostic::error()
                    .code(ErrorCode::E035)
                    .message("‘return’ outside of a function")
                    .unlabeled_span(span),
            );
            return hir::Statement::Return(value);
        };

        let value = match (function.type_, value) {
            (Type::Void, Some(value)) => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E036)
                        .message(format!(
                            "the function {} does not return a value",
                            function.name.quote()
                        ))
                        .span(value.span, "unexpected return value"),
                );
                Some(value)
            }
            (Type::Void | Type::Error, None) => None,
            (type_, None) => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E037)
                        .message(format!(
                            "the function {} has to return a value of type {}",
                            function.name.quote(),
                            type_.quote()
                        ))
                        .unlabeled_span(span),
                );
                None
            }
            (type_, Some(value)) => Some(self.convert(value, type_, false)),
        };

        hir::Statement::Return(value)
    }

    /// Declare a variable in the innermost scope.
    fn declare_variable(&mut self, binder: Identifier, type_: Type, is_read_only: bool) -> Variable {
        let kind = match (&self.function, self.depth) {
            (None, 0) => VariableKind::Global,
            _ => VariableKind::Local,
        };
        let variable = VariableSymbol::new(binder.bare, type_, is_read_only, kind);

        if !binder.is_missing()
            && !self
                .scopes
                .declare(binder.bare, Symbol::Variable(variable.clone()))
        {
            self.error(already_declared(binder));
        }

        if kind == VariableKind::Global {
            self.globals.push(variable.clone());
        }

        variable
    }

    /// Convert the expression to the given type, reporting impossible conversions.
    fn convert(&mut self, expression: hir::Expression, type_: Type, explicit: bool) -> hir::Expression {
        let source = expression.type_();

        if source.is_error() || type_.is_error() {
            return erroneous(expression.span);
        }

        match Conversion::classify(source, type_) {
            Conversion::Identity => expression,
            Conversion::Implicit => conversion(expression, type_),
            Conversion::Explicit if explicit => conversion(expression, type_),
            Conversion::Explicit => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E029)
                        .message(format!(
                            "cannot implicitly convert type {} to {}",
                            source.quote(),
                            type_.quote()
                        ))
                        .unlabeled_span(expression.span)
                        .help(format!(
                            "an explicit conversion exists: {}",
                            format!("{type_}(…)").quote()
                        )),
                );
                erroneous(expression.span)
            }
            Conversion::None => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E028)
                        .message(format!(
                            "cannot convert type {} to {}",
                            source.quote(),
                            type_.quote()
                        ))
                        .unlabeled_span(expression.span),
                );
                erroneous(expression.span)
            }
        }
    }

    fn bind_expression_of_type(&mut self, expression: &ast::Expression, type_: Type) -> hir::Expression {
        let expression = self.bind_expression(expression);
        self.convert(expression, type_, false)
    }
}

pub(crate) fn conversion(expression: hir::Expression, type_: Type) -> hir::Expression {
    hir::Expression::new(
        expression.span,
        hir::Conversion {
            type_,
            expression,
        }
        .into(),
    )
}

pub(crate) fn erroneous(span: Span) -> hir::Expression {
    hir::Expression::new(span, hir::BareExpression::Error)
}

fn already_declared(binder: Identifier) -> Diagnostic {
    Diagnostic::error()
        .code(ErrorCode::E025)
        .message(format!(
            "the name {} is already declared in this scope",
            binder.to_str().quote()
        ))
        .unlabeled_span(binder)
}
