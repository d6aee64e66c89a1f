//! Writing text styled with ANSI escape sequences to the terminal or to memory.

use crate::SmallVec;
use std::{
    io::{self, BufWriter, StderrLock, StdoutLock, Write},
    str::FromStr,
};
use supports_color::Stream;

pub use anstyle::{Ansi256Color, AnsiColor, Color, Effects, RgbColor, Style};

/// Paint to a `String`.
///
/// Convenience function that calls [`Painter::bytes`] under the hood.
pub fn paint_to_string(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<String> {
    let mut painter = Painter::bytes(choice);
    paint(&mut painter)?;
    String::from_utf8(painter.buffer())
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
}

/// Paint to locked and buffered stdout.
///
/// Convenience function that calls [`Painter::stdout`] under the hood.
pub fn paint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let mut painter = Painter::stdout(choice);
    paint(&mut painter)?;
    painter.flush()
}

/// Paint to locked and buffered stderr.
///
/// Convenience function that calls [`Painter::stderr`] under the hood.
pub fn epaint(
    paint: impl FnOnce(&mut Painter) -> io::Result<()>,
    choice: ColorChoice,
) -> io::Result<()> {
    let mut painter = Painter::stderr(choice);
    paint(&mut painter)?;
    painter.flush()
}

pub struct Painter {
    // Instead of making the writer generic via `dyn io::Write`, we use an enum of
    // writers common to this workspace to avoid dynamic dispatch. Adding a type
    // parameter to the painter is not an option since renderers using it typically
    // contain a lot of code which would lead to the binary size exploding due to
    // monomorphization.
    writer: Writer,
    colorize: bool,
    stack: SmallVec<Style, 3>,
}

impl Painter {
    pub fn bytes(choice: ColorChoice) -> Self {
        let colorize = choice.resolve(None);
        let writer = Writer::Bytes(Vec::new());

        Self::new(writer, colorize)
    }

    pub fn stdout(choice: ColorChoice) -> Self {
        let colorize = choice.resolve(Some(Stream::Stdout));
        let writer = Writer::Stdout(BufWriter::new(std::io::stdout().lock()));

        Self::new(writer, colorize)
    }

    pub fn stderr(choice: ColorChoice) -> Self {
        let colorize = choice.resolve(Some(Stream::Stderr));
        let writer = Writer::Stderr(BufWriter::new(std::io::stderr().lock()));

        Self::new(writer, colorize)
    }

    fn new(writer: Writer, colorize: bool) -> Self {
        Self { writer, colorize, stack: SmallVec::new() }
    }

    pub fn set(&mut self, style: impl IntoStyle) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        let style = style.into_style();
        self.stack.push(style);
        style.write_to(&mut self.writer)
    }

    pub fn unset(&mut self) -> io::Result<()> {
        if !self.colorize {
            return Ok(());
        }

        if let Some(style) = self.stack.pop() {
            style.write_reset_to(&mut self.writer)?;
        }

        for style in &self.stack {
            style.write_to(&mut self.writer)?;
        }

        Ok(())
    }

    pub fn buffer(self) -> Vec<u8> {
        match self.writer {
            Writer::Bytes(bytes) => bytes,
            Writer::Stdout(_) | Writer::Stderr(_) => Vec::new(),
        }
    }
}

impl Write for Painter {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        self.writer.write(buffer)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

enum Writer {
    Stdout(BufWriter<StdoutLock<'static>>),
    Stderr(BufWriter<StderrLock<'static>>),
    Bytes(Vec<u8>),
}

impl Write for Writer {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout(stdout) => stdout.write(buffer),
            Self::Stderr(stderr) => stderr.write(buffer),
            Self::Bytes(bytes) => bytes.write(buffer),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout(stdout) => stdout.flush(),
            Self::Stderr(stderr) => stderr.flush(),
            Self::Bytes(bytes) => bytes.flush(),
        }
    }
}

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ColorChoice {
    #[default]
    Auto,
    Never,
    Always,
}

impl ColorChoice {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Never => "never",
            Self::Always => "always",
        }
    }

    pub fn elements() -> impl Iterator<Item = Self> {
        [Self::Auto, Self::Never, Self::Always].into_iter()
    }

    fn resolve(self, stream: Option<Stream>) -> bool /*colorize*/ {
        match (self, stream) {
            (Self::Auto, Some(stream)) => {
                supports_color::on_cached(stream).is_some_and(|level| level.has_basic)
            }
            (Self::Never, _) | (Self::Auto, None) => false,
            (Self::Always, _) => true,
        }
    }
}

impl FromStr for ColorChoice {
    type Err = ();

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::elements()
            .find(|choice| choice.name() == source)
            .ok_or(())
    }
}

pub trait IntoStyle {
    fn into_style(self) -> Style;
}

impl IntoStyle for Style {
    fn into_style(self) -> Style {
        self
    }
}

impl IntoStyle for AnsiColor {
    fn into_style(self) -> Style {
        self.on_default()
    }
}

impl IntoStyle for Effects {
    fn into_style(self) -> Style {
        Style::new().effects(self)
    }
}

pub trait ColorExt {
    fn to_bg(self) -> Style;
}

impl ColorExt for AnsiColor {
    fn to_bg(self) -> Style {
        Style::new().bg_color(Some(self.into()))
    }
}

#[cfg(test)]
mod test {
    use super::{paint_to_string, AnsiColor, ColorChoice, Effects};
    use std::io::Write;

    #[test]
    fn no_escape_sequences_without_color() {
        let output = paint_to_string(
            |p| {
                p.set(AnsiColor::Red)?;
                write!(p, "error")?;
                p.unset()
            },
            ColorChoice::Never,
        );

        assert_eq!(output.ok().as_deref(), Some("error"));
    }

    #[test]
    fn errors_while_painting_are_propagated() {
        let output = paint_to_string(
            |p| {
                write!(p, "partial")?;
                Err(std::io::Error::other("interrupted"))
            },
            ColorChoice::Never,
        );

        assert_eq!(
            output.map_err(|error| error.to_string()),
            Err("interrupted".to_owned())
        );
    }

    #[test]
    fn nested_styles_are_restored() {
        let output = paint_to_string(
            |p| {
                p.set(AnsiColor::Blue)?;
                p.set(Effects::BOLD)?;
                write!(p, "a")?;
                p.unset()?;
                write!(p, "b")?;
                p.unset()
            },
            ColorChoice::Always,
        )
        .unwrap_or_default();

        let blue = AnsiColor::Blue.on_default();
        let bold = anstyle::Style::new().effects(Effects::BOLD);
        let expected = format!(
            "{}{}a{}{}b{}",
            blue.render(),
            bold.render(),
            bold.render_reset(),
            blue.render(),
            blue.render_reset(),
        );

        assert_eq!(output, expected);
    }

    #[test]
    fn color_choices_round_trip_through_their_names() {
        for choice in ColorChoice::elements() {
            assert_eq!(choice.name().parse(), Ok(choice));
        }
        assert_eq!("sometimes".parse::<ColorChoice>(), Err(()));
    }
}
