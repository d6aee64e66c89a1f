//! The diagnostics system.

use span::{Span, Spanning};
use std::{marker::PhantomData, ops::Deref};
use utility::Str;

pub use code::{ErrorCode, Phase};
pub use reporter::{Buffer, Reporter};

mod code;
mod render;

pub mod error;
pub mod reporter;


/// A complex diagnostic message, optionally with source locations.
///
/// The type parameter statically fixes the [severity](Severity) of the diagnostic
/// and thereby what [reporting](Self::report) it yields.
#[must_use]
pub struct Diagnostic<T: Tag = tag::Error> {
    untagged: UntaggedDiagnostic,
    _tag: PhantomData<T>,
}

impl<T: Tag> Diagnostic<T> {
    fn new() -> Self {
        Self {
            untagged: Box::new(UnboxedUntaggedDiagnostic::new(T::SEVERITY)),
            _tag: PhantomData,
        }
    }

    /// Add a text message describing the issue.
    ///
    /// # Strict Guidelines
    ///
    /// * The message should not contain any line breaks (beware when embedding source code snippets!)
    /// * The message should not start with an upper case letter
    /// * The message should not end in a punctuation mark (like a period)
    /// * Surround source code snippets with (directional) single quotation marks,
    ///   i.e. `‘` (U+2018) to the left and `’` (U+2019) to the right
    /// * The message should be able to stand on its own without the additional
    ///   information provided by labels and subdiagnostics
    pub fn message(mut self, message: impl Into<Str>) -> Self {
        self.untagged.message = Some(message.into());
        self
    }

    fn highlight(mut self, spanning: impl Spanning, label: Option<Str>, role: Role) -> Self {
        self.untagged.highlights.push(Highlight {
            span: spanning.span(),
            label,
            role,
        });
        self
    }

    /// Reference and label a code snippet as one of the focal points of the diagnostic.
    pub fn span(self, spanning: impl Spanning, label: impl Into<Str>) -> Self {
        self.highlight(spanning, Some(label.into()), Role::Primary)
    }

    /// Reference a code snippet as one of the focal points of the diagnostic.
    pub fn unlabeled_span(self, spanning: impl Spanning) -> Self {
        self.highlight(spanning, None, Role::Primary)
    }

    /// Reference and label a code snippet as auxiliary information for the diagnostic.
    pub fn label(self, spanning: impl Spanning, label: impl Into<Str>) -> Self {
        self.highlight(spanning, Some(label.into()), Role::Secondary)
    }

    fn subdiagnostic(mut self, severity: Subseverity, message: Str) -> Self {
        self.untagged
            .subdiagnostics
            .push(Subdiagnostic { severity, message });
        self
    }

    /// Add further clarifying information.
    ///
    /// Same rules as for [`Self::message`] apply except that it may span multiple lines.
    pub fn note(self, message: impl Into<Str>) -> Self {
        self.subdiagnostic(Subseverity::Note, message.into())
    }

    /// Add steps or tips to solve the diagnosed issue.
    ///
    /// Same rules as for [`Self::message`] apply except that it may span multiple lines.
    /// Do not pose a question like `did you mean …?`.
    pub fn help(self, message: impl Into<Str>) -> Self {
        self.subdiagnostic(Subseverity::Help, message.into())
    }

    pub fn with(self, builder: impl FnOnce(Self) -> Self) -> Self {
        builder(self)
    }

    /// Report the diagnostic.
    pub fn report(self, reporter: &Reporter) -> T::Output {
        reporter.report(self)
    }

    pub(crate) fn into_untagged(self) -> UntaggedDiagnostic {
        self.untagged
    }
}

impl Diagnostic<tag::Bug> {
    /// Create a diagnostic for an internal compiler error (ICE).
    pub fn bug() -> Self {
        Self::new()
    }
}

impl Diagnostic {
    /// Create a diagnostic for a user error.
    pub fn error() -> Self {
        Self::new()
    }

    pub fn code(mut self, code: ErrorCode) -> Self {
        self.untagged.code = Some(code);
        self
    }
}

impl Diagnostic<tag::Debug> {
    /// Create a diagnostic for an internal debugging message.
    pub fn debug() -> Self {
        Self::new()
    }
}

impl<T: Tag> Deref for Diagnostic<T> {
    type Target = UnboxedUntaggedDiagnostic;

    fn deref(&self) -> &Self::Target {
        &self.untagged
    }
}

pub type UntaggedDiagnostic = Box<UnboxedUntaggedDiagnostic>;

#[derive(PartialEq, Eq, Debug)]
pub struct UnboxedUntaggedDiagnostic {
    /// The highlighted snippets in the order they were added.
    pub highlights: Vec<Highlight>,
    pub subdiagnostics: Vec<Subdiagnostic>,
    pub code: Option<ErrorCode>,
    pub message: Option<Str>,
    pub severity: Severity,
}

impl UnboxedUntaggedDiagnostic {
    fn new(severity: Severity) -> Self {
        Self {
            highlights: Vec::new(),
            subdiagnostics: Vec::new(),
            code: None,
            message: None,
            severity,
        }
    }

    /// The phase the diagnostic stems from if it has a code.
    pub fn phase(&self) -> Option<Phase> {
        self.code.map(ErrorCode::phase)
    }

    /// The span of the first primary highlight.
    pub fn primary_span(&self) -> Option<Span> {
        self.highlights
            .iter()
            .find(|highlight| highlight.role == Role::Primary)
            .map(|highlight| highlight.span)
    }
}

/// A highlighted code snippet.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Highlight {
    pub span: Span,
    pub role: Role,
    pub label: Option<Str>,
}

/// The role of a highlighted code snippet, focal point or auxiliary note.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Role {
    /// A focal point of the diagnostic.
    Primary,
    /// An auxiliary note of the diagnostic.
    Secondary,
}

/// Part of a [complex error message](Diagnostic) providing extra text messages.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Subdiagnostic {
    pub severity: Subseverity,
    pub message: Str,
}

/// Level of severity of a diagnostic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Severity {
    /// An internal compiler error (ICE).
    Bug,
    /// A user error.
    Error,
    Debug,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Subseverity {
    /// An auxiliary note.
    Note,
    /// A message containing steps to solve an issue.
    Help,
}

impl Subseverity {
    const fn name(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Help => "help",
        }
    }
}

/// The static severity of a [`Diagnostic`].
pub trait Tag {
    const SEVERITY: Severity;

    /// What reporting a diagnostic of this severity yields.
    type Output;

    fn output() -> Self::Output;
}

pub mod tag {
    use super::{reporter::ErasedReportedError, Severity, Tag};

    pub struct Bug;
    pub struct Error;
    pub struct Debug;

    impl Tag for Bug {
        const SEVERITY: Severity = Severity::Bug;
        type Output = ErasedReportedError;

        fn output() -> Self::Output {
            ErasedReportedError::new_unchecked()
        }
    }

    impl Tag for Error {
        const SEVERITY: Severity = Severity::Error;
        type Output = ErasedReportedError;

        fn output() -> Self::Output {
            ErasedReportedError::new_unchecked()
        }
    }

    impl Tag for Debug {
        const SEVERITY: Severity = Severity::Debug;
        type Output = ();

        fn output() -> Self::Output {}
    }
}
