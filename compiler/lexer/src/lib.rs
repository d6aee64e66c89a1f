//! The lexical analyzer (lexer).
//!
//! The lexer is lazy: [`Lexer`] is an iterator yielding one token at a time and ending with
//! exactly one [end of input](BareToken::EndOfInput) token. Malformed input never stops it,
//! it is reported and turned into [unknown](BareToken::Unknown) tokens or placeholder values.

use diagnostics::{
    error::{Health, Outcome},
    Diagnostic, ErrorCode, Reporter,
};
use span::{LocalByteIndex, LocalSpan, SourceFile, Span};
use std::{iter::Peekable, str::CharIndices};
use token::parse_keyword;
use utility::QuoteExt;

pub use token::{BareToken, Provenance, Token, TokenName};
use BareToken::*;

pub mod token;

#[cfg(test)]
mod test;

/// Lex the whole source file.
pub fn lex(file: &SourceFile, reporter: &Reporter) -> Outcome<Vec<Token>> {
    let mut lexer = Lexer::new(file, reporter);
    let tokens = lexer.by_ref().collect();
    Outcome::new(tokens, lexer.health())
}

/// The state of the lexer.
pub struct Lexer<'a> {
    file: &'a SourceFile,
    characters: Peekable<CharIndices<'a>>,
    local_span: LocalSpan,
    reporter: &'a Reporter,
    health: Health,
    is_exhausted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a SourceFile, reporter: &'a Reporter) -> Self {
        Self {
            characters: file.content().char_indices().peekable(),
            file,
            local_span: LocalSpan::default(),
            reporter,
            health: Health::Untainted,
            is_exhausted: false,
        }
    }

    /// Whether any errors were reported so far.
    pub fn health(&self) -> Health {
        self.health
    }

    fn lex_token(&mut self, character: char) -> BareToken {
        match character {
            ' ' | '\t' => {
                self.take_while(|character| matches!(character, ' ' | '\t'));
                Whitespace
            }
            '\n' => self.consume(LineBreak),
            '\r' => {
                self.take();
                self.advance();

                if self.peek() == Some('\n') {
                    self.take();
                    self.advance();
                }

                LineBreak
            }
            '/' => {
                self.take();
                self.advance();

                if self.peek() == Some('/') {
                    self.take_while(|character| !matches!(character, '\n' | '\r' | '\0'));
                    Comment
                } else {
                    Slash
                }
            }
            character if character.is_ascii_digit() => self.lex_number_literal(),
            character if is_word_start(character) => self.lex_word(),
            '"' => self.lex_text_literal(),
            '&' => self.lex_one_or_two('&', Ampersand, DoubleAmpersand),
            '|' => self.lex_one_or_two('|', VerticalBar, DoubleVerticalBar),
            '=' => self.lex_one_or_two('=', Equals, DoubleEquals),
            '!' => self.lex_one_or_two('=', ExclamationMark, ExclamationMarkEquals),
            '<' => self.lex_one_or_two('=', LessThan, LessThanEquals),
            '>' => self.lex_one_or_two('=', GreaterThan, GreaterThanEquals),
            '+' => self.consume(Plus),
            '-' => self.consume(Minus),
            '*' => self.consume(Asterisk),
            '~' => self.consume(Tilde),
            '^' => self.consume(Caret),
            '(' => self.consume(OpeningRoundBracket),
            ')' => self.consume(ClosingRoundBracket),
            '{' => self.consume(OpeningCurlyBracket),
            '}' => self.consume(ClosingCurlyBracket),
            ',' => self.consume(Comma),
            ':' => self.consume(Colon),
            character => {
                self.take();
                self.advance();

                let error = Diagnostic::error()
                    .code(ErrorCode::E002)
                    .message(format!("invalid character {}", character.quote()))
                    .unlabeled_span(self.span())
                    .report(self.reporter);
                self.health.taint(error);

                Unknown
            }
        }
    }

    /// Lex a token consisting of one or two characters preferring the longer one.
    fn lex_one_or_two(&mut self, second: char, one: BareToken, two: BareToken) -> BareToken {
        self.take();
        self.advance();

        if self.peek() == Some(second) {
            self.consume(two)
        } else {
            one
        }
    }

    fn lex_number_literal(&mut self) -> BareToken {
        self.take_while(|character| character.is_ascii_digit());

        let source = self.source();

        match source.parse() {
            Ok(value) => Number(value),
            Err(_) => {
                let error = Diagnostic::error()
                    .code(ErrorCode::E001)
                    .message(format!(
                        "the number literal {} does not fit a 32-bit signed integer",
                        source.quote()
                    ))
                    .unlabeled_span(self.span())
                    .report(self.reporter);
                self.health.taint(error);

                Number(0)
            }
        }
    }

    fn lex_word(&mut self) -> BareToken {
        self.take_while(is_word_middle);

        parse_keyword(self.source()).unwrap_or_else(|| Word(self.source().into()))
    }

    /// Lex a text literal where `""` stands for a single quotation mark.
    ///
    /// An unterminated literal ends before the next line break or null terminator.
    fn lex_text_literal(&mut self) -> BareToken {
        self.take();
        self.advance();

        let mut content = String::new();

        loop {
            match self.peek() {
                Some('"') => {
                    self.take();
                    self.advance();

                    if self.peek() == Some('"') {
                        self.take();
                        self.advance();
                        content.push('"');
                    } else {
                        break;
                    }
                }
                None | Some('\n' | '\r' | '\0') => {
                    let error = Diagnostic::error()
                        .code(ErrorCode::E004)
                        .message("unterminated text literal")
                        .span(self.span(), "missing closing quotation mark")
                        .report(self.reporter);
                    self.health.taint(error);
                    break;
                }
                Some(character) => {
                    self.take();
                    self.advance();
                    content.push(character);
                }
            }
        }

        Text(content.into())
    }

    fn span(&self) -> Span {
        self.local_span.global(self.file)
    }

    fn source(&self) -> &'a str {
        &self.file[self.local_span]
    }

    /// Step to the next character in the input stream.
    fn advance(&mut self) {
        self.characters.next();
    }

    /// Include the span of the current character in the span of the token-to-be-added.
    fn take(&mut self) {
        if let Some((index, character)) = self.peek_with_index() {
            self.local_span.end = index + character;
        }
    }

    fn consume(&mut self, token: BareToken) -> BareToken {
        self.take();
        self.advance();
        token
    }

    fn peek(&mut self) -> Option<char> {
        self.peek_with_index().map(|(_, character)| character)
    }

    fn peek_with_index(&mut self) -> Option<(LocalByteIndex, char)> {
        self.characters
            .peek()
            .map(|&(index, character)| (LocalByteIndex::from_usize(index), character))
    }

    /// [Take](Self::take) the span of all succeeding characters where the predicate holds and step.
    fn take_while(&mut self, predicate: fn(char) -> bool) {
        while let Some(character) = self.peek() {
            if !predicate(character) {
                break;
            }
            self.take();
            self.advance();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted {
            return None;
        }

        let Some((index, character)) = self.peek_with_index() else {
            self.is_exhausted = true;
            self.local_span = self.file.local_span().end();
            return Some(Token::new(self.span(), EndOfInput));
        };

        self.local_span = LocalSpan::empty(index);

        if character == '\0' {
            self.take();
            let error = Diagnostic::error()
                .code(ErrorCode::E003)
                .message("unexpected null terminator")
                .span(self.span(), "the input ends here")
                .report(self.reporter);
            self.health.taint(error);

            self.is_exhausted = true;
            self.local_span = LocalSpan::empty(index);
            return Some(Token::new(self.span(), EndOfInput));
        }

        let token = self.lex_token(character);
        Some(Token::new(self.span(), token))
    }
}

const fn is_word_start(character: char) -> bool {
    character.is_ascii_alphabetic() || character == '_'
}

const fn is_word_middle(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_'
}
