//! Data structures and procedures for handling source locations.

// @Task handle overflows showing errors like "file too big" to the user

pub use source_map::{
    FileName, Highlight, LineWithHighlight, LinesWithHighlight, SourceFile, SourceFileIndex,
    SourceMap, TextLocation,
};
pub use spanning::{PossiblySpanning, Spanning};
use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, AddAssign, Range, Sub},
};
use utility::default;

pub mod source_map;

macro_rules! byte_index_and_span {
    (
        $( #[$index_attribute:meta] )*
        index $ByteIndex:ident;
        $( #[$span_attribute:meta] )*
        span $Span:ident;
    ) => {
        $( #[$index_attribute] )*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
        pub struct $ByteIndex(u32);

        impl $ByteIndex {
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            pub const fn value(self) -> u32 {
                self.0
            }

            /// Relate the index to the given span.
            ///
            /// If the index is to the left of the span (i.e. smaller), it is considered [less].
            /// If it is to the right (i.e. greater), it is considered [greater].
            /// Otherwise, it has to be contained within the span and [equal] is returned.
            ///
            /// [less]: Ordering::Less
            /// [greater]: Ordering::Greater
            /// [equal]: Ordering::Equal
            pub fn relate(self, span: $Span) -> Ordering {
                if self < span.start {
                    Ordering::Less
                } else if span.end <= self {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
        }

        impl Add<u32> for $ByteIndex {
            type Output = Self;

            fn add(self, offset: u32) -> Self::Output {
                Self(self.0 + offset)
            }
        }

        impl AddAssign<u32> for $ByteIndex {
            fn add_assign(&mut self, offset: u32) {
                self.0 += offset;
            }
        }

        impl Sub<u32> for $ByteIndex {
            type Output = Self;

            fn sub(self, offset: u32) -> Self::Output {
                Self(self.0 - offset)
            }
        }

        $( #[$span_attribute] )*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $Span {
            /// The start of the span, inclusive.
            pub start: $ByteIndex,
            /// The end of the span, exclusive.
            pub end: $ByteIndex,
        }

        impl $Span {
            #[cfg_attr(debug_assertions, track_caller)]
            pub fn new(start: $ByteIndex, end: $ByteIndex) -> Self {
                debug_assert!(
                    start <= end,
                    "span start ({}) > span end ({})",
                    start.0,
                    end.0
                );

                Self { start, end }
            }

            /// Create an empty span at the given index.
            pub fn empty(index: $ByteIndex) -> Self {
                Self::new(index, index)
            }

            pub fn with_length(start: $ByteIndex, length: u32) -> Self {
                Self::new(start, start + length)
            }

            pub fn length(self) -> u32 {
                self.end.0 - self.start.0
            }

            pub fn is_empty(self) -> bool {
                self.start == self.end
            }

            pub fn contains(self, index: $ByteIndex) -> bool {
                self.start <= index && index <= self.end
            }

            /// The empty span at the start of this span.
            #[must_use]
            pub fn start(self) -> Self {
                Self::empty(self.start)
            }

            /// The empty span at the end of this span.
            #[must_use]
            pub fn end(self) -> Self {
                Self::empty(self.end)
            }
        }

        impl fmt::Debug for $Span {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}..{}", self.start.0, self.end.0)
            }
        }
    };
}

byte_index_and_span! {
    /// A global byte index.
    ///
    /// Here, "global" means relative to a [source map](SourceMap).
    index ByteIndex;
    /// A global byte span of source code.
    ///
    /// _Global_ means relative to a [`SourceMap`]. The default span is the _unknown location_.
    span Span;
}

byte_index_and_span! {
    /// A file-local byte index.
    index LocalByteIndex;
    /// A span inside a single source file.
    span LocalSpan;
}

impl ByteIndex {
    /// Map a global byte index to a local one.
    pub fn local(self, file: &SourceFile) -> LocalByteIndex {
        LocalByteIndex::new(self.0 - file.span().start.0)
    }
}

impl LocalByteIndex {
    /// Map a local byte index to a global one.
    pub fn global(self, file: &SourceFile) -> ByteIndex {
        ByteIndex::new(file.span().start.0 + self.0)
    }

    pub fn from_usize(index: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        Self(index as u32)
    }
}

impl Add<char> for LocalByteIndex {
    type Output = Self;

    fn add(self, character: char) -> Self::Output {
        #[allow(clippy::cast_possible_truncation)] // always within 1..=4
        let length = character.len_utf8() as u32;
        self + length
    }
}

impl From<LocalByteIndex> for usize {
    fn from(index: LocalByteIndex) -> Self {
        index.0 as _
    }
}

impl Span {
    pub fn local(self, file: &SourceFile) -> LocalSpan {
        LocalSpan::new(self.start.local(file), self.end.local(file))
    }

    /// Extend the span to the end of the other span if there is one.
    #[must_use]
    pub fn merge(self, other: impl PossiblySpanning) -> Self {
        match other.possible_span() {
            Some(other) => Self::new(self.start, other.end),
            None => self,
        }
    }

    /// Extend the span in place to the end of the given spanning value and return the latter.
    pub fn merging<S: PossiblySpanning>(&mut self, other: S) -> S {
        if let Some(other) = other.possible_span() {
            self.end = other.end;
        }
        other
    }

    /// Whether this is the span of the unknown location.
    pub fn is_unknown(self) -> bool {
        self == default()
    }
}

impl Spanning for Span {
    fn span(&self) -> Self {
        *self
    }
}

impl LocalSpan {
    pub fn global(self, file: &SourceFile) -> Span {
        Span::new(self.start.global(file), self.end.global(file))
    }
}

impl From<LocalSpan> for Range<usize> {
    fn from(span: LocalSpan) -> Self {
        span.start.into()..span.end.into()
    }
}

/// Convenience function for constructing a global span in test code.
pub fn span(start: u32, end: u32) -> Span {
    Span::new(ByteIndex::new(start), ByteIndex::new(end))
}

mod spanning {
    use super::Span;

    pub trait Spanning: PossiblySpanning {
        fn span(&self) -> Span;
    }

    impl<S: Spanning> Spanning for &S {
        fn span(&self) -> Span {
            (**self).span()
        }
    }

    impl<S: Spanning> Spanning for std::sync::Arc<S> {
        fn span(&self) -> Span {
            (**self).span()
        }
    }

    pub trait PossiblySpanning {
        fn possible_span(&self) -> Option<Span>;
    }

    impl<S: Spanning> PossiblySpanning for S {
        fn possible_span(&self) -> Option<Span> {
            Some(self.span())
        }
    }

    impl<S: Spanning> PossiblySpanning for Vec<S> {
        fn possible_span(&self) -> Option<Span> {
            self.first().map(|item| {
                let mut span = item.span();
                span.merging(self.last());
                span
            })
        }
    }

    impl<S> PossiblySpanning for Option<S>
    where
        S: PossiblySpanning,
    {
        fn possible_span(&self) -> Option<Span> {
            self.as_ref().and_then(<_>::possible_span)
        }
    }

    impl<S: PossiblySpanning> PossiblySpanning for &Option<S> {
        fn possible_span(&self) -> Option<Span> {
            (**self).possible_span()
        }
    }

    impl<S: Spanning> PossiblySpanning for &Vec<S> {
        fn possible_span(&self) -> Option<Span> {
            (**self).possible_span()
        }
    }
}

/// A value together with its location in the source code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spanned<Bare> {
    pub bare: Bare,
    pub span: Span,
}

impl<Bare> Spanned<Bare> {
    pub const fn new(span: Span, bare: Bare) -> Self {
        Self { bare, span }
    }

    /// Attach the unknown location to the value.
    pub fn bare(bare: Bare) -> Self {
        Self::new(default(), bare)
    }

    pub fn map<U>(self, mapper: impl FnOnce(Bare) -> U) -> Spanned<U> {
        Spanned::new(self.span, mapper(self.bare))
    }

    pub const fn as_ref(&self) -> Spanned<&Bare> {
        Spanned::new(self.span, &self.bare)
    }
}

impl<Bare> Spanning for Spanned<Bare> {
    fn span(&self) -> Span {
        self.span
    }
}

impl<Bare: fmt::Debug> fmt::Debug for Spanned<Bare> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.bare, self.span)
    }
}

impl<Bare: fmt::Display> fmt::Display for Spanned<Bare> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.bare.fmt(f)
    }
}
