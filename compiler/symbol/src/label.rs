use std::fmt;

/// A jump target introduced for loops and by lowering.
///
/// Labels are unique within a single function body or global statement body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Label {
    pub kind: LabelKind,
    pub index: u32,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.name(), self.index)
    }
}

/// The purpose of a label.
///
/// The binder only creates break and continue labels, the lowerer only the other kinds.
/// Therefore both can number their labels independently.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum LabelKind {
    Break,
    Continue,
    Else,
    End,
    /// The start of the body of a do-while loop.
    Body,
    /// The condition of a desugared for-loop.
    Check,
}

impl LabelKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Else => "else",
            Self::End => "end",
            Self::Body => "body",
            Self::Check => "check",
        }
    }
}

/// A source of fresh labels.
#[derive(Default)]
pub struct LabelGenerator {
    next: u32,
}

impl LabelGenerator {
    pub fn fresh(&mut self, kind: LabelKind) -> Label {
        let label = Label {
            kind,
            index: self.next,
        };
        self.next += 1;
        label
    }
}
