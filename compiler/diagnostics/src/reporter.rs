//! The diagnostic reporter.

use super::{Diagnostic, Severity, Tag, UnboxedUntaggedDiagnostic, UntaggedDiagnostic};
use span::SourceMap;
use std::{
    io::Write,
    mem,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError, RwLock, RwLockReadGuard,
    },
};
use utility::{
    paint::{epaint, ColorChoice},
    pluralize,
};

/// A diagnostic reporter.
pub struct Reporter {
    kind: ReporterKind,
    map: Option<Arc<RwLock<SourceMap>>>,
}

impl Reporter {
    fn new(kind: ReporterKind) -> Self {
        Self { kind, map: None }
    }

    pub fn silent() -> Self {
        Self::new(ReporterKind::Silent)
    }

    /// A reporter collecting every diagnostic into the given buffer in the order of reporting.
    pub fn buffer(diagnostics: Buffer) -> Self {
        Self::new(ReporterKind::Buffer(diagnostics))
    }

    pub fn stderr(color: ColorChoice) -> Self {
        Self::new(ReporterKind::Stderr(color))
    }

    /// A reporter printing errors to stderr once it is dropped followed by a summary.
    ///
    /// Debugging messages are printed right away.
    pub fn buffered_stderr(color: ColorChoice, reported_any_errors: Arc<AtomicBool>) -> Self {
        Self::new(ReporterKind::BufferedStderr(StderrBuffer {
            errors: Mutex::default(),
            reported_any_errors,
            color,
        }))
    }

    #[must_use]
    pub fn with_map(mut self, map: Arc<RwLock<SourceMap>>) -> Self {
        self.map = Some(map);
        self
    }

    fn map(&self) -> Option<RwLockReadGuard<'_, SourceMap>> {
        self.map
            .as_ref()
            .map(|map| map.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub(super) fn report<T: Tag>(&self, diagnostic: Diagnostic<T>) -> T::Output {
        self.report_untagged(diagnostic.into_untagged());
        T::output()
    }

    fn report_untagged(&self, diagnostic: UntaggedDiagnostic) {
        match &self.kind {
            ReporterKind::Silent => {}
            ReporterKind::Buffer(diagnostics) => {
                diagnostics
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(diagnostic);
            }
            &ReporterKind::Stderr(color) => {
                stderr_print(&diagnostic, self.map().as_deref(), color);
            }
            ReporterKind::BufferedStderr(buffer) => match diagnostic.severity {
                Severity::Bug | Severity::Error => {
                    buffer
                        .errors
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(diagnostic);
                }
                Severity::Debug => stderr_print(&diagnostic, self.map().as_deref(), buffer.color),
            },
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if let ReporterKind::BufferedStderr(buffer) = &self.kind {
            buffer.report(self.map().as_deref());
        }
    }
}

enum ReporterKind {
    Silent,
    Buffer(Buffer),
    Stderr(ColorChoice),
    BufferedStderr(StderrBuffer),
}

/// The bag of diagnostics filled by a [buffering reporter](Reporter::buffer).
pub type Buffer = Arc<Mutex<Vec<UntaggedDiagnostic>>>;

struct StderrBuffer {
    errors: Mutex<Vec<UntaggedDiagnostic>>,
    reported_any_errors: Arc<AtomicBool>,
    color: ColorChoice,
}

impl StderrBuffer {
    fn report(&self, map: Option<&SourceMap>) {
        let errors = mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner));

        if errors.is_empty() {
            return;
        }

        for error in &errors {
            stderr_print(error, map, self.color);
        }

        self.reported_any_errors.store(true, Ordering::SeqCst);

        let summary = Diagnostic::error().message(pluralize!(
            errors.len(),
            "aborting due to previous error",
            format!("aborting due to {} previous errors", errors.len()),
        ));

        stderr_print(&summary, None, self.color);
    }
}

fn stderr_print(
    diagnostic: &UnboxedUntaggedDiagnostic,
    map: Option<&SourceMap>,
    color: ColorChoice,
) {
    // There is nowhere left to report a failure to write to stderr to.
    let _ = epaint(
        |painter| {
            diagnostic.render(map, painter)?;
            writeln!(painter)?;
            writeln!(painter)
        },
        color,
    );
}

/// A witness to / token for a [reported](Diagnostic::report) error.
///
/// A value of this type is a proof that an error was reported (neglecting buffering).
/// Using this as an error type instead of let's say `()` makes it a bit harder to
/// accidentally return an error without reporting anything since such a witness
/// can only be constructed by [`Diagnostic::report`] or by [`Self::new_unchecked`].
///
/// Values of this type are isomorphic to the zero-sized type `()`. The word _erased_
/// in the name alludes to the fact that a costly error [`Diagnostic`] has been turned
/// into "nothing in size".
///
/// # Soundness Holes
///
/// Values of this type can also be obtained from a silent reporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErasedReportedError(());

impl ErasedReportedError {
    /// Fabricate a witness without reporting anything.
    ///
    /// Only use this if the error has provably been reported by other means.
    pub const fn new_unchecked() -> Self {
        Self(())
    }
}
