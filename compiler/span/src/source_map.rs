use super::{ByteIndex, LocalByteIndex, LocalSpan, Span, Spanning};
use index_map::IndexMap;
use std::{fmt, io, ops::Range, path::PathBuf, sync::Arc};
use unicode_width::UnicodeWidthStr;
use utility::obtain;


/// A mapping from [index](SourceFileIndex) to [source file](SourceFile).
///
/// Most prominently, the index – an offset obtained by adding a source file to this map –
/// is the key component to define [`Span`] (via [`ByteIndex`]).
///
/// The source files are laid out next to each other and padded on their left (at their start)
/// by one byte to reserve space for the _end of input_ token of the previous file.
/// Additionally, this frees up the byte index `0` and allows `Span::default()`
/// – starting at this unmapped index and empty – to be interpreted as an _unknown location_.
///
/// # Visualization
///
/// ```text
/// | |  f0  | |  f1  | ...
///  ^ ^      ^ ^      ^
///  | |      | |      |
///  | |      | |      padding   f1.span().end()
///  | |      | source file f1   f1.span()
///  | |      padding            f0.span().end()
///  | source file f0            f0.span()
///  padding, unknown location   Span::default()
/// ```
#[derive(Default)]
pub struct SourceMap {
    files: IndexMap<SourceFileIndex, SourceFile>,
}

impl SourceMap {
    fn next_offset(&self) -> ByteIndex {
        const PADDING: u32 = 1;

        self.files
            .last()
            .map(|file| file.span().end)
            .unwrap_or_default()
            + PADDING
    }

    /// Open a file given its path and add it as a [`SourceFile`] to the map.
    pub fn load(&mut self, path: PathBuf) -> io::Result<SourceFileIndex> {
        let source = std::fs::read_to_string(&path)?;
        Ok(self.add(FileName::Path(path), Arc::new(source)))
    }

    /// Add text to the map creating a [`SourceFile`] in the process.
    pub fn add(&mut self, name: impl Into<FileName>, source: Arc<String>) -> SourceFileIndex {
        self.files
            .insert(SourceFile::new(name, source, self.next_offset()))
    }

    pub fn add_str(&mut self, name: impl Into<FileName>, source: &str) -> SourceFileIndex {
        self.add(name, Arc::new(source.to_owned()))
    }

    /// The source file containing the given span.
    ///
    /// # Panics
    ///
    /// If the span is not mapped.
    pub fn file(&self, span: Span) -> &SourceFile {
        let Some(file) = self
            .files
            .values()
            .find(|file| file.span().contains(span.start))
        else {
            unreachable!("the span {span:?} does not point into any source file");
        };

        file
    }

    /// Resolve a span to the string content it points to.
    ///
    /// This treats line breaks verbatim.
    pub fn snippet(&self, span: Span) -> &str {
        let file = self.file(span);
        &file[span.local(file)]
    }

    /// Resolve a span to the file name and the line and column of its start.
    pub fn location(&self, span: Span) -> (&FileName, TextLocation) {
        let file = self.file(span);
        (file.name(), file.location(span.start.local(file)))
    }

    /// Resolve a span to the lines it touches together with the highlighted parts.
    ///
    /// A highlight never includes line breaks. The end of input following a trailing line break
    /// is attributed to the last line.
    pub fn lines_with_highlight(&self, span: Span) -> LinesWithHighlight<'_> {
        let file = self.file(span);
        let span = span.local(file);

        let first_line = file.line_containing(span.start);
        let last_line = if span.is_empty() {
            first_line
        } else {
            file.line_containing(span.end - 1).max(first_line)
        };

        let first_end = if first_line == last_line {
            span.end
        } else {
            file.line_bounds(first_line).end
        };

        LinesWithHighlight {
            file: file.name(),
            first: file.line_with_highlight(first_line, span.start, first_end),
            last: (first_line != last_line).then(|| {
                let start = file.line_bounds(last_line).start;
                file.line_with_highlight(last_line, start, span.end)
            }),
        }
    }
}

impl std::ops::Index<SourceFileIndex> for SourceMap {
    type Output = SourceFile;

    fn index(&self, index: SourceFileIndex) -> &Self::Output {
        &self.files[index]
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, index_map::Index)]
pub struct SourceFileIndex(usize);

#[derive(Debug, PartialEq, Eq)]
pub struct LinesWithHighlight<'a> {
    pub file: &'a FileName,
    pub first: LineWithHighlight<'a>,
    /// This is `None` if the last is the first line.
    pub last: Option<LineWithHighlight<'a>>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct LineWithHighlight<'a> {
    /// One-indexed line number.
    pub number: u32,
    /// The content of the entire line that contains the to-be-highlighted snippet.
    ///
    /// It may contain the whole snippet or only the starting or the ending part of it
    /// if the snippet spans multiple lines.
    pub content: &'a str,
    pub highlight: Highlight,
}

/// The highlighted part of a line measured in one-indexed columns (characters).
#[derive(Debug, PartialEq, Eq)]
pub struct Highlight {
    pub start: u32,
    pub end: u32,
    /// The display width of the highlight.
    pub width: usize,
    /// The display width of the part of the line in front of the highlight.
    pub prefix_width: usize,
}

/// A one-indexed line and column (counted in characters).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TextLocation {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source file.
///
/// Obtained by and contained within a [source map](SourceMap).
pub struct SourceFile {
    name: FileName,
    content: Arc<String>,
    span: Span,
    /// The start of every line, sorted.
    lines: Vec<LocalByteIndex>,
}

impl SourceFile {
    /// Create a new source file.
    ///
    /// The [byte index](ByteIndex) `start` locates the file in a [source map](SourceMap).
    fn new(name: impl Into<FileName>, content: Arc<String>, start: ByteIndex) -> Self {
        let lines = std::iter::once(LocalByteIndex::new(0))
            .chain(
                content
                    .match_indices('\n')
                    .map(|(index, _)| LocalByteIndex::from_usize(index + 1)),
            )
            .collect();

        Self {
            span: Span::with_length(start, LocalByteIndex::from_usize(content.len()).value()),
            name: name.into(),
            content,
            lines,
        }
    }

    pub fn name(&self) -> &FileName {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn local_span(&self) -> LocalSpan {
        self.span.local(self)
    }

    /// The zero-indexed line containing the given index found by binary search.
    fn line_containing(&self, index: LocalByteIndex) -> usize {
        let line = self.lines.partition_point(|&start| start <= index) - 1;

        if line > 0 && index == self.lines[line] && index == self.local_span().end {
            line - 1
        } else {
            line
        }
    }

    /// The bounds of the given zero-indexed line excluding its line break.
    fn line_bounds(&self, line: usize) -> LocalSpan {
        let start = self.lines[line];
        let end = self
            .lines
            .get(line + 1)
            .copied()
            .unwrap_or(self.local_span().end);
        let content = &self[LocalSpan::new(start, end)];
        let content = content.strip_suffix('\n').unwrap_or(content);
        let content = content.strip_suffix('\r').unwrap_or(content);

        LocalSpan::with_length(start, LocalByteIndex::from_usize(content.len()).value())
    }

    fn line_with_highlight(
        &self,
        line: usize,
        start: LocalByteIndex,
        end: LocalByteIndex,
    ) -> LineWithHighlight<'_> {
        let bounds = self.line_bounds(line);
        let start = start.clamp(bounds.start, bounds.end);
        let end = end.clamp(start, bounds.end);

        let prefix = &self[LocalSpan::new(bounds.start, start)];
        let highlight = &self[LocalSpan::new(start, end)];

        let start = count(prefix) + 1;

        LineWithHighlight {
            number: count_lines(line),
            content: &self[bounds],
            highlight: Highlight {
                start,
                end: start + count(highlight),
                width: highlight.width(),
                prefix_width: prefix.width(),
            },
        }
    }

    /// Resolve a local byte index to a line and a column.
    pub fn location(&self, index: LocalByteIndex) -> TextLocation {
        let line = self.line_containing(index);
        let bounds = self.line_bounds(line);
        let prefix = &self[LocalSpan::new(bounds.start, index.clamp(bounds.start, bounds.end))];

        TextLocation {
            line: count_lines(line),
            column: count(prefix) + 1,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn count(text: &str) -> u32 {
    text.chars().count() as u32
}

#[allow(clippy::cast_possible_truncation)]
fn count_lines(line: usize) -> u32 {
    line as u32 + 1
}

impl Spanning for SourceFile {
    fn span(&self) -> Span {
        self.span
    }
}

impl std::ops::Index<LocalSpan> for SourceFile {
    type Output = str;

    fn index(&self, index: LocalSpan) -> &Self::Output {
        &self.content[Range::from(index)]
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum FileName {
    Anonymous,
    Stdin,
    Path(PathBuf),
    Virtual(&'static str),
}

impl FileName {
    pub fn path(&self) -> Option<&PathBuf> {
        obtain!(self, Self::Path(path) => path)
    }
}

impl From<PathBuf> for FileName {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&'static str> for FileName {
    fn from(name: &'static str) -> Self {
        Self::Virtual(name)
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("<anonymous>"),
            Self::Stdin => f.write_str("<stdin>"),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Virtual(name) => f.write_str(name),
        }
    }
}
