//! The syntactic analyzer (parser).
//!
//! It is a handwritten top-down recursive-descent parser with one token of look-ahead for
//! statements and precedence climbing for binary expressions. It never gives up: on an
//! unexpected token, it reports an error and fabricates the expected token.
//!
//! # Grammar Notation
//!
//! Most parsing functions in this module are accompanied by a grammar snippet.
//! These snippets are written in an EBNF-flavor explained below:
//!
//! | Notation  | Name                                | Definition or Remark                                          |
//! |-----------|-------------------------------------|---------------------------------------------------------------|
//! | `; C`     | Comment                             | Stretches until the end of the line                           |
//! | `N ::= R` | Definition                          | Defines non-terminal `A` by rule `R`                          |
//! | `A B`     | Sequence                            | Rule `B` immediately followed by rule `A` modulo trivia       |
//! | `(A)`     | Grouping                            | To escape default precedence                                  |
//! | <code>A &vert; B</code>   | Ordered Alternative                 | Either `A` or `B` first trying `A` then `B`                   |
//! | `A?`      | Option                              | `A` or nothing (ε)                                            |
//! | `A*`      | Kleene Star (Multiplicity)          | Arbitrarily long sequence of `A`s                             |
//! | `"T"`     | Terminal                            | Lexed token by textual content                                |
//! | `#T`      | Named Terminal                      | Lexed token by name                                           |
//!
//! Trivia (whitespace, line breaks and comments) is skipped. The only place where line breaks
//! matter is the optional expression of a return statement.

use ast::{
    Assignment, BareExpression, BareMember, BareStatement, Binary, Call, CompilationUnit, DoWhile,
    Expression, Identifier, Member, Mutability, Parameter, Statement, Unary, VariableDeclaration,
};
use diagnostics::{
    error::{Health, Outcome, Stain},
    Diagnostic, ErrorCode, Reporter,
};
use lexer::{BareToken, Token, TokenName};
use span::{SourceFile, Span, Spanned};
use std::{fmt, sync::Arc};
use TokenName::*;

#[cfg(test)]
mod test;

/// Lex and parse the given source file.
pub fn parse_file(file: &SourceFile, reporter: &Reporter) -> Outcome<CompilationUnit> {
    let mut health = Health::Untainted;
    let tokens = lexer::lex(file, reporter).stain(&mut health);
    let unit = parse(tokens, reporter).stain(&mut health);
    Outcome::new(unit, health)
}

/// Parse the given tokens into a compilation unit.
///
/// Always returns a syntax tree. If errors were reported, it contains fabricated nodes.
pub fn parse(tokens: Vec<Token>, reporter: &Reporter) -> Outcome<CompilationUnit> {
    let mut parser = Parser::new(tokens, reporter);
    let unit = parser.parse_compilation_unit();
    Outcome::new(unit, parser.health)
}

/// The parser.
struct Parser<'a> {
    /// The tokens without trivia, ending with an end-of-input token.
    tokens: Vec<Token>,
    /// Whether the token at the same index is preceded by a line break.
    line_breaks: Vec<bool>,
    index: usize,
    /// The index of the token the last syntax error was reported at.
    ///
    /// Further errors at the same token are suppressed.
    last_error: Option<usize>,
    reporter: &'a Reporter,
    health: Health,
}

impl<'a> Parser<'a> {
    fn new(all_tokens: Vec<Token>, reporter: &'a Reporter) -> Self {
        let mut tokens = Vec::new();
        let mut line_breaks = Vec::new();
        let mut line_break = false;
        let mut end = Span::default();

        for token in all_tokens {
            end = token.span.end();

            match token.bare {
                BareToken::LineBreak => line_break = true,
                // Unknown characters have already been reported by the lexer.
                bare if bare.is_trivia() || bare == BareToken::Unknown => {}
                bare => {
                    tokens.push(token);
                    line_breaks.push(line_break);
                    line_break = false;

                    if bare == BareToken::EndOfInput {
                        break;
                    }
                }
            }
        }

        if tokens.last().map(Token::name) != Some(EndOfInput) {
            tokens.push(Token::new(end, BareToken::EndOfInput));
            line_breaks.push(line_break);
        }

        Self {
            tokens,
            line_breaks,
            index: 0,
            last_error: None,
            reporter,
            health: Health::Untainted,
        }
    }

    /// Parse a compilation unit.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Compilation-Unit ::= Member* #End-Of-Input
    /// ```
    fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let start = self.token().span;
        let mut members = Vec::new();

        while self.token().name() != EndOfInput {
            let index = self.index;
            members.push(self.parse_member());
            self.ensure_progress(index);
        }

        CompilationUnit {
            members,
            span: start.merge(self.token().span),
        }
    }

    /// Parse a member.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Member ::= Function-Declaration | Statement
    /// ```
    fn parse_member(&mut self) -> Member {
        let start = self.index;

        let member = match self.token().name() {
            Function => BareMember::Function(Arc::new(self.parse_function_declaration())),
            _ => BareMember::GlobalStatement(self.parse_statement()),
        };

        Member::new(self.span_since(start), member)
    }

    /// Parse a function declaration.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Function-Declaration ::= "function" #Word "(" Parameters? ")" Type-Clause? Block
    /// Parameters ::= Parameter ("," Parameter)*
    /// Parameter ::= #Word Type-Clause
    /// ```
    fn parse_function_declaration(&mut self) -> ast::Function {
        self.advance();
        let binder = self.consume_word();
        self.consume(OpeningRoundBracket);

        let mut parameters = Vec::new();

        while !matches!(self.token().name(), ClosingRoundBracket | EndOfInput) {
            let index = self.index;
            let binder = self.consume_word();
            let type_ = self.parse_type_clause();
            parameters.push(Parameter { binder, type_ });

            if !self.consume_separator() || self.index == index {
                break;
            }
        }

        self.consume(ClosingRoundBracket);

        let type_ = match self.token().name() {
            Colon => Some(self.parse_type_clause()),
            _ => None,
        };
        let body = self.parse_block();

        ast::Function {
            binder,
            parameters,
            type_,
            body,
        }
    }

    /// Parse a type clause.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Type-Clause ::= ":" #Word
    /// ```
    fn parse_type_clause(&mut self) -> Identifier {
        self.consume(Colon);
        self.consume_word()
    }

    /// Parse a statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Statement ::=
    ///     | Block
    ///     | Variable-Declaration
    ///     | If
    ///     | While
    ///     | Do-While
    ///     | For
    ///     | "break"
    ///     | "continue"
    ///     | Return
    ///     | Expression
    /// ```
    fn parse_statement(&mut self) -> Statement {
        match self.token().name() {
            OpeningCurlyBracket => self.parse_block(),
            Var => self.parse_variable_declaration(Mutability::Mutable),
            Let => self.parse_variable_declaration(Mutability::Immutable),
            If => self.parse_if_statement(),
            While => self.parse_while_statement(),
            Do => self.parse_do_while_statement(),
            For => self.parse_for_statement(),
            Break => self.parse_keyword_statement(BareStatement::Break),
            Continue => self.parse_keyword_statement(BareStatement::Continue),
            Return => self.parse_return_statement(),
            _ => {
                let expression = self.parse_expression();
                Statement::new(expression.span, BareStatement::Expression(expression))
            }
        }
    }

    /// Parse a block statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Block ::= "{" Statement* "}"
    /// ```
    fn parse_block(&mut self) -> Statement {
        let start = self.index;
        self.consume(OpeningCurlyBracket);

        let mut statements = Vec::new();

        while !matches!(self.token().name(), ClosingCurlyBracket | EndOfInput) {
            let index = self.index;
            statements.push(self.parse_statement());
            self.ensure_progress(index);
        }

        self.consume(ClosingCurlyBracket);

        Statement::new(self.span_since(start), BareStatement::Block(statements))
    }

    /// Parse a variable declaration.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Variable-Declaration ::= ("var" | "let") #Word Type-Clause? "=" Expression
    /// ```
    fn parse_variable_declaration(&mut self, mutability: Mutability) -> Statement {
        let start = self.index;
        self.advance();

        let binder = self.consume_word();
        let type_ = match self.token().name() {
            Colon => Some(self.parse_type_clause()),
            _ => None,
        };
        self.consume(Equals);
        let value = self.parse_expression();

        Statement::new(
            self.span_since(start),
            BareStatement::VariableDeclaration(Box::new(VariableDeclaration {
                mutability,
                binder,
                type_,
                value,
            })),
        )
    }

    /// Parse an if-statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// If ::= "if" Expression Statement ("else" Statement)?
    /// ```
    fn parse_if_statement(&mut self) -> Statement {
        let start = self.index;
        self.advance();

        let condition = self.parse_expression();
        let consequent = self.parse_statement();
        let alternative = match self.token().name() {
            Else => {
                self.advance();
                Some(self.parse_statement())
            }
            _ => None,
        };

        Statement::new(
            self.span_since(start),
            BareStatement::If(Box::new(ast::If {
                condition,
                consequent,
                alternative,
            })),
        )
    }

    /// Parse a while-statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// While ::= "while" Expression Statement
    /// ```
    fn parse_while_statement(&mut self) -> Statement {
        let start = self.index;
        self.advance();

        let condition = self.parse_expression();
        let body = self.parse_statement();

        Statement::new(
            self.span_since(start),
            BareStatement::While(Box::new(ast::While { condition, body })),
        )
    }

    /// Parse a do-while-statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Do-While ::= "do" Statement "while" Expression
    /// ```
    fn parse_do_while_statement(&mut self) -> Statement {
        let start = self.index;
        self.advance();

        let body = self.parse_statement();
        self.consume(While);
        let condition = self.parse_expression();

        Statement::new(
            self.span_since(start),
            BareStatement::DoWhile(Box::new(DoWhile { body, condition })),
        )
    }

    /// Parse a for-statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// For ::= "for" #Word "=" Expression "to" Expression Statement
    /// ```
    fn parse_for_statement(&mut self) -> Statement {
        let start = self.index;
        self.advance();

        let binder = self.consume_word();
        self.consume(Equals);
        let lower = self.parse_expression();
        self.consume(To);
        let upper = self.parse_expression();
        let body = self.parse_statement();

        Statement::new(
            self.span_since(start),
            BareStatement::For(Box::new(ast::For {
                binder,
                lower,
                upper,
                body,
            })),
        )
    }

    fn parse_keyword_statement(&mut self, statement: BareStatement) -> Statement {
        let span = self.token().span;
        self.advance();
        Statement::new(span, statement)
    }

    /// Parse a return statement.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Return ::= "return" Expression?
    /// ```
    ///
    /// The expression is only parsed if it starts on the same line as the keyword.
    fn parse_return_statement(&mut self) -> Statement {
        let start = self.index;
        self.advance();

        let value = match self.token().name() {
            ClosingCurlyBracket | EndOfInput => None,
            _ if self.line_breaks[self.index] => None,
            _ => Some(self.parse_expression()),
        };

        Statement::new(self.span_since(start), BareStatement::Return(value))
    }

    /// Parse an expression.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Expression ::= Assignment | Binary
    /// Assignment ::= #Word "=" Expression
    /// ```
    fn parse_expression(&mut self) -> Expression {
        if self.token().name() == Word && self.look_ahead(1).name() == Equals {
            let start = self.index;
            let binder = Identifier::new(*self.token());
            self.advance();
            self.advance();
            let value = self.parse_expression();

            return Expression::new(
                self.span_since(start),
                BareExpression::Assignment(Box::new(Assignment { binder, value })),
            );
        }

        self.parse_binary_expression(0)
    }

    /// Parse a binary expression by precedence climbing.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Binary ::= Unary (Binary-Operator Binary)*
    /// Unary ::= Unary-Operator Unary | Primary
    /// ```
    ///
    /// Operators of equal precedence associate to the left.
    fn parse_binary_expression(&mut self, parent_precedence: u8) -> Expression {
        let start = self.index;

        let mut left = match unary_precedence(self.token().name()) {
            Some(precedence) if precedence >= parent_precedence => {
                let operator = self.operator();
                let operand = self.parse_binary_expression(precedence);

                Expression::new(
                    self.span_since(start),
                    BareExpression::Unary(Box::new(Unary { operator, operand })),
                )
            }
            _ => self.parse_primary_expression(),
        };

        while let Some(precedence) = binary_precedence(self.token().name()) {
            if precedence <= parent_precedence {
                break;
            }

            let operator = self.operator();
            let right = self.parse_binary_expression(precedence);

            left = Expression::new(
                self.span_since(start),
                BareExpression::Binary(Box::new(Binary {
                    left,
                    operator,
                    right,
                })),
            );
        }

        left
    }

    /// Parse a primary expression.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Primary ::=
    ///     | "(" Expression ")"
    ///     | "true"
    ///     | "false"
    ///     | #Number
    ///     | #Text
    ///     | Call
    ///     | #Word
    /// ```
    fn parse_primary_expression(&mut self) -> Expression {
        let token = *self.token();

        let expression = match token.bare {
            BareToken::OpeningRoundBracket => {
                let start = self.index;
                self.advance();
                let inner = self.parse_expression();
                self.consume(ClosingRoundBracket);

                return Expression::new(
                    self.span_since(start),
                    BareExpression::Parenthesized(Box::new(inner)),
                );
            }
            BareToken::True => BareExpression::BooleanLiteral(true),
            BareToken::False => BareExpression::BooleanLiteral(false),
            BareToken::Number(value) => BareExpression::NumberLiteral(value),
            BareToken::Text(text) => BareExpression::TextLiteral(text),
            BareToken::Word(_) if self.look_ahead(1).name() == OpeningRoundBracket => {
                return self.parse_call_expression();
            }
            BareToken::Word(_) => BareExpression::Name(Identifier::new(token)),
            _ => {
                self.expected("expression");
                let missing = Token::missing(token.span.start(), Word);
                return Expression::new(missing.span, BareExpression::Name(Identifier::new(missing)));
            }
        };

        self.advance();
        Expression::new(token.span, expression)
    }

    /// Parse a call expression.
    ///
    /// # Grammar
    ///
    /// ```grammar
    /// Call ::= #Word "(" Arguments? ")"
    /// Arguments ::= Expression ("," Expression)*
    /// ```
    fn parse_call_expression(&mut self) -> Expression {
        let start = self.index;
        let callee = self.consume_word();
        self.consume(OpeningRoundBracket);

        let mut arguments = Vec::new();

        while !matches!(self.token().name(), ClosingRoundBracket | EndOfInput) {
            let index = self.index;
            arguments.push(self.parse_expression());

            if !self.consume_separator() || self.index == index {
                break;
            }
        }

        self.consume(ClosingRoundBracket);

        Expression::new(
            self.span_since(start),
            BareExpression::Call(Box::new(Call { callee, arguments })),
        )
    }

    /// Consume the comma separating the elements of a parenthesized list.
    ///
    /// Returns whether another element follows. A comma directly followed by the closing
    /// bracket is reported.
    fn consume_separator(&mut self) -> bool {
        if self.token().name() != Comma {
            return false;
        }

        let comma = *self.token();
        self.advance();

        if self.token().name() == ClosingRoundBracket {
            let error = Diagnostic::error()
                .code(ErrorCode::E010)
                .message(format!("expected an element but was trailing {Comma}"))
                .span(comma, "unexpected trailing comma")
                .report(self.reporter);
            self.health.taint(error);
            return false;
        }

        true
    }

    fn operator(&mut self) -> Spanned<TokenName> {
        let token = self.token();
        let operator = Spanned::new(token.span, token.name());
        self.advance();
        operator
    }

    /// Consume the current token if it has the given name, otherwise report it and
    /// fabricate the expected token.
    fn consume(&mut self, expected: TokenName) -> Token {
        let token = *self.token();

        if token.name() == expected {
            self.advance();
            return token;
        }

        self.expected(expected);
        Token::missing(token.span.start(), expected)
    }

    fn consume_word(&mut self) -> Identifier {
        Identifier::new(self.consume(Word))
    }

    /// Report the current token as unexpected unless an error was already reported at it.
    fn expected(&mut self, expected: impl fmt::Display) {
        if self.last_error == Some(self.index) {
            return;
        }
        self.last_error = Some(self.index);

        let token = self.token();
        let error = Diagnostic::error()
            .code(ErrorCode::E010)
            .message(format!("expected {expected} but was {}", token.bare))
            .span(token.span, "unexpected token")
            .report(self.reporter);
        self.health.taint(error);
    }

    /// Skip the current token if parsing did not consume any token since the given index.
    fn ensure_progress(&mut self, index: usize) {
        if self.index == index {
            self.advance();
        }
    }

    /// The span from the token at the given index up to and including the last consumed token.
    fn span_since(&self, start: usize) -> Span {
        let span = self.tokens[start].span;

        match self.index.checked_sub(1) {
            Some(last) if last >= start => span.merge(self.tokens[last].span),
            _ => span.start(),
        }
    }

    /// Step to the next token.
    ///
    /// Doesn't advance past the end of input.
    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    fn token(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn look_ahead(&self, amount: usize) -> &Token {
        &self.tokens[(self.index + amount).min(self.tokens.len() - 1)]
    }
}

fn unary_precedence(operator: TokenName) -> Option<u8> {
    Some(match operator {
        Plus | Minus | ExclamationMark | Tilde => 6,
        _ => return None,
    })
}

fn binary_precedence(operator: TokenName) -> Option<u8> {
    Some(match operator {
        Asterisk | Slash => 5,
        Plus | Minus => 4,
        DoubleEquals | ExclamationMarkEquals | LessThan | LessThanEquals | GreaterThan
        | GreaterThanEquals => 3,
        Ampersand | DoubleAmpersand => 2,
        VerticalBar | DoubleVerticalBar | Caret => 1,
        _ => return None,
    })
}
