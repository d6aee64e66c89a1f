//! The binding of expressions.

use crate::{erroneous, scope::Symbol, Binder};
use ast::Identifier;
use diagnostics::{Diagnostic, ErrorCode};
use hir::{BinaryOperator, UnaryOperator, Value};
use span::Span;
use symbol::{Conversion, Type, VariableSymbol};
use utility::{pluralize, QuoteExt};

impl Binder<'_> {
    /// Bind an expression that has to have a value.
    pub(crate) fn bind_expression(&mut self, expression: &ast::Expression) -> hir::Expression {
        let bound = self.bind_expression_allowing_void(expression);

        if bound.type_() == Type::Void {
            self.error(
                Diagnostic::error()
                    .code(ErrorCode::E033)
                    .message("the expression does not have a value")
                    .span(expression, "expected a value"),
            );
            return erroneous(expression.span);
        }

        bound
    }

    pub(crate) fn bind_expression_allowing_void(
        &mut self,
        expression: &ast::Expression,
    ) -> hir::Expression {
        use ast::BareExpression::*;

        let span = expression.span;

        match &expression.bare {
            &BooleanLiteral(value) => hir::Expression::new(span, Value::from(value).into()),
            &NumberLiteral(value) => hir::Expression::new(span, Value::from(value).into()),
            TextLiteral(text) => hir::Expression::new(span, Value::from(text.to_str()).into()),
            &Name(identifier) => self.bind_name(identifier),
            Parenthesized(expression) => self.bind_expression_allowing_void(expression),
            Unary(unary) => self.bind_unary(span, unary),
            Binary(binary) => self.bind_binary(span, binary),
            Assignment(assignment) => self.bind_assignment(span, assignment),
            Call(call) => self.bind_call(span, call),
        }
    }

    fn bind_name(&mut self, identifier: Identifier) -> hir::Expression {
        if identifier.is_missing() {
            return erroneous(identifier.span);
        }

        match self.scopes.lookup(identifier.bare).cloned() {
            Some(Symbol::Variable(variable)) => {
                hir::Expression::new(identifier.span, hir::BareExpression::Variable(variable))
            }
            Some(Symbol::Function(_)) => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E039)
                        .message(format!(
                            "the function {} is not a variable",
                            identifier.to_str().quote()
                        ))
                        .unlabeled_span(identifier),
                );
                erroneous(identifier.span)
            }
            None => {
                let error = self.undefined(identifier, ErrorCode::E020, "identifier");
                self.error(error);
                hir::Expression::new(identifier.span, Value::Int(0).into())
            }
        }
    }

    fn undefined(&self, identifier: Identifier, code: ErrorCode, entity: &str) -> Diagnostic {
        let similar = self.scopes.find_similarly_named(identifier.bare);

        Diagnostic::error()
            .code(code)
            .message(format!(
                "the {entity} {} is not defined",
                identifier.to_str().quote()
            ))
            .unlabeled_span(identifier)
            .with(|diagnostic| match similar {
                Some(similar) => diagnostic.help(format!(
                    "a binding with a similar name exists in scope: {}",
                    similar.quote()
                )),
                None => diagnostic,
            })
    }

    fn bind_unary(&mut self, span: Span, unary: &ast::Unary) -> hir::Expression {
        let operand = self.bind_expression(&unary.operand);
        let type_ = operand.type_();

        if type_.is_error() {
            return erroneous(span);
        }

        match UnaryOperator::bind(unary.operator.bare, type_) {
            Some(operator) => hir::Expression::new(span, hir::Unary { operator, operand }.into()),
            None => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E021)
                        .message(format!(
                            "the unary operator {} is not defined for type {}",
                            unary.operator.bare,
                            type_.quote()
                        ))
                        .unlabeled_span(unary.operator),
                );
                operand
            }
        }
    }

    fn bind_binary(&mut self, span: Span, binary: &ast::Binary) -> hir::Expression {
        let left = self.bind_expression(&binary.left);
        let right = self.bind_expression(&binary.right);
        let (left_type, right_type) = (left.type_(), right.type_());

        if left_type.is_error() || right_type.is_error() {
            return erroneous(span);
        }

        match BinaryOperator::bind(binary.operator.bare, left_type, right_type) {
            Some(operator) => hir::Expression::new(
                span,
                hir::Binary {
                    left,
                    operator,
                    right,
                }
                .into(),
            ),
            None => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E022)
                        .message(format!(
                            "the binary operator {} is not defined for types {} and {}",
                            binary.operator.bare,
                            left_type.quote(),
                            right_type.quote()
                        ))
                        .unlabeled_span(binary.operator),
                );
                left
            }
        }
    }

    fn bind_assignment(&mut self, span: Span, assignment: &ast::Assignment) -> hir::Expression {
        let value = self.bind_expression(&assignment.value);
        let binder = assignment.binder;

        if binder.is_missing() {
            return erroneous(span);
        }

        let variable = match self.scopes.lookup(binder.bare).cloned() {
            None => self.declare_variable(binder, value.type_(), false),
            Some(Symbol::Function(_)) => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E039)
                        .message(format!(
                            "the function {} is not a variable",
                            binder.to_str().quote()
                        ))
                        .unlabeled_span(binder),
                );
                return erroneous(span);
            }
            Some(Symbol::Variable(variable)) => {
                if variable.is_read_only {
                    self.error(
                        Diagnostic::error()
                            .code(ErrorCode::E027)
                            .message(format!(
                                "cannot assign to the read-only variable {}",
                                binder.to_str().quote()
                            ))
                            .span(binder, "assignment to read-only variable")
                            .help(format!(
                                "declare the variable with {} to make it mutable",
                                "var".quote()
                            )),
                    );
                    return erroneous(span);
                }

                variable
            }
        };

        let source = value.type_();

        if source.is_error() || variable.type_.is_error() || source == variable.type_ {
            return hir::Expression::new(span, hir::Assignment { variable, value }.into());
        }

        // A value that does not fit the variable retypes it.
        if Conversion::classify(source, variable.type_) == Conversion::Implicit {
            let value = crate::conversion(value, variable.type_);
            return hir::Expression::new(span, hir::Assignment { variable, value }.into());
        }

        let variable = VariableSymbol::new(variable.name, source, false, variable.kind);
        self.scopes.replace(variable.clone());
        if variable.kind == symbol::VariableKind::Global {
            self.globals.push(variable.clone());
        }

        hir::Expression::new(span, hir::Assignment { variable, value }.into())
    }

    fn bind_call(&mut self, span: Span, call: &ast::Call) -> hir::Expression {
        let callee = call.callee;

        if !callee.is_missing() {
            if let (Some(type_), [argument]) = (Type::lookup(callee.bare), &call.arguments[..]) {
                let argument = self.bind_expression(argument);
                let mut conversion = self.convert(argument, type_, true);
                conversion.span = span;
                return conversion;
            }
        }

        let arguments: Vec<_> = call
            .arguments
            .iter()
            .map(|argument| self.bind_expression(argument))
            .collect();

        if callee.is_missing() {
            return erroneous(span);
        }

        let function = match self.scopes.lookup(callee.bare).cloned() {
            Some(Symbol::Function(function)) => function,
            Some(Symbol::Variable(_)) => {
                self.error(
                    Diagnostic::error()
                        .code(ErrorCode::E038)
                        .message(format!("{} is not a function", callee.to_str().quote()))
                        .span(callee, "called here"),
                );
                return erroneous(span);
            }
            None => {
                let error = self.undefined(callee, ErrorCode::E030, "function");
                self.error(error);
                return erroneous(span);
            }
        };

        if arguments.len() != function.parameters.len() {
            let expected = function.parameters.len();
            let actual = arguments.len();

            self.error(
                Diagnostic::error()
                    .code(ErrorCode::E031)
                    .message(format!(
                        "the function {} expects {expected} {} but {actual} {} supplied",
                        function.name.quote(),
                        pluralize!(expected, "argument"),
                        pluralize!(actual, "was", "were"),
                    ))
                    .unlabeled_span(span),
            );
            return erroneous(span);
        }

        let mut health = true;
        let arguments = arguments
            .into_iter()
            .zip(&function.parameters)
            .map(|(argument, parameter)| {
                let source = argument.type_();

                match Conversion::classify(source, parameter.type_) {
                    _ if source.is_error() || parameter.type_.is_error() => argument,
                    Conversion::Identity => argument,
                    Conversion::Implicit => crate::conversion(argument, parameter.type_),
                    Conversion::Explicit | Conversion::None => {
                        self.error(
                            Diagnostic::error()
                                .code(ErrorCode::E032)
                                .message(format!(
                                    "the parameter {} of the function {} expects type {} but the argument has type {}",
                                    parameter.name.quote(),
                                    function.name.quote(),
                                    parameter.type_.quote(),
                                    source.quote(),
                                ))
                                .span(argument.span, "mismatched argument"),
                        );
                        health = false;
                        argument
                    }
                }
            })
            .collect();

        if !health {
            return erroneous(span);
        }

        hir::Expression::new(span, hir::Call { function, arguments }.into())
    }
}
