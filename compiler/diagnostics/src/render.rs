//! The code responsible for rendering diagnostics.

// @Bug tabs in snippets mess up the alignment

use super::{Highlight, Role, Severity, Subseverity, UnboxedUntaggedDiagnostic};
use span::{LineWithHighlight, LinesWithHighlight, SourceMap};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;
use utility::paint::{paint_to_string, AnsiColor, ColorChoice, Effects, Painter};

#[cfg(test)]
mod test;

impl UnboxedUntaggedDiagnostic {
    /// Render the diagnostic resolving its highlights with the given source map.
    ///
    /// Without a source map, highlights are omitted.
    pub fn render(&self, map: Option<&SourceMap>, p: &mut Painter) -> io::Result<()> {
        self.render_header(p)?;

        let highlights: Vec<_> = match map {
            Some(map) => self
                .highlights
                .iter()
                .filter(|highlight| !highlight.span.is_unknown())
                .map(|highlight| (highlight, map.lines_with_highlight(highlight.span)))
                .collect(),
            None => Vec::new(),
        };

        let widest_line_number = highlights
            .iter()
            .map(|(_, lines)| lines.last.as_ref().unwrap_or(&lines.first).number)
            .max()
            .unwrap_or(1);

        let mut renderer = Renderer {
            padding: " ".repeat(widest_line_number.ilog10() as usize + 1),
            color: self.severity.color(),
            p,
        };

        for (index, (highlight, lines)) in highlights.iter().enumerate() {
            renderer.render_highlight(highlight, lines, index == 0)?;
        }

        for subdiagnostic in &self.subdiagnostics {
            renderer.render_subdiagnostic(subdiagnostic.severity, &subdiagnostic.message)?;
        }

        Ok(())
    }

    /// Render the diagnostic to a string without any colors.
    pub fn format(&self, map: Option<&SourceMap>) -> String {
        paint_to_string(|p| self.render(map, p), ColorChoice::Never).unwrap_or_default()
    }

    fn render_header(&self, p: &mut Painter) -> io::Result<()> {
        p.set(self.severity.color().on_default().bold())?;
        write!(p, "{}", self.severity.name())?;
        p.unset()?;

        if let Some(code) = self.code {
            p.set(self.severity.color())?;
            write!(p, "[{code}]")?;
            p.unset()?;
        }

        if let Some(message) = &self.message {
            write!(p, ": ")?;
            p.set(Effects::BOLD)?;
            write!(p, "{message}")?;
            p.unset()?;
        }

        Ok(())
    }
}

struct Renderer<'a> {
    padding: String,
    color: AnsiColor,
    p: &'a mut Painter,
}

impl Renderer<'_> {
    fn render_highlight(
        &mut self,
        highlight: &Highlight,
        lines: &LinesWithHighlight<'_>,
        first: bool,
    ) -> io::Result<()> {
        let color = match highlight.role {
            Role::Primary => self.color,
            Role::Secondary => palette::HELP,
        };
        let stroke = match highlight.role {
            Role::Primary => "═",
            Role::Secondary => "─",
        };
        let connector = if first { "┌─" } else { "├─" };

        writeln!(self.p)?;
        self.p.set(palette::FRAME)?;
        write!(
            self.p,
            "{} {connector} {}:{}:{}",
            self.padding, lines.file, lines.first.number, lines.first.highlight.start
        )?;
        self.p.unset()?;
        self.render_bar()?;

        let label = highlight.label.as_deref();

        match &lines.last {
            None => {
                self.render_line(&lines.first)?;
                self.render_underline(&lines.first, stroke, color, label)
            }
            Some(last) => {
                self.render_line(&lines.first)?;
                self.render_underline(&lines.first, stroke, color, None)?;

                if last.number - lines.first.number > 1 {
                    writeln!(self.p)?;
                    self.p.set(palette::FRAME)?;
                    write!(self.p, "{} ·", self.padding)?;
                    self.p.unset()?;
                }

                self.render_line(last)?;
                self.render_underline(last, stroke, color, label)
            }
        }
    }

    fn render_line(&mut self, line: &LineWithHighlight<'_>) -> io::Result<()> {
        let width = self.padding.len();

        writeln!(self.p)?;
        self.p.set(palette::FRAME)?;
        write!(self.p, "{:>width$} │", line.number)?;
        self.p.unset()?;
        write!(self.p, " {}", line.content)
    }

    fn render_underline(
        &mut self,
        line: &LineWithHighlight<'_>,
        stroke: &str,
        color: AnsiColor,
        label: Option<&str>,
    ) -> io::Result<()> {
        self.render_bar()?;

        let highlight = &line.highlight;

        self.p.set(color)?;
        if highlight.width == 0 {
            let padding = " ".repeat(highlight.prefix_width.saturating_sub(1));
            write!(self.p, " {padding}⟩⟨")?;
        } else {
            let padding = " ".repeat(highlight.prefix_width);
            write!(self.p, " {padding}{}", stroke.repeat(highlight.width))?;
        }

        if let Some(label) = label {
            write!(self.p, " {label}")?;
        }

        self.p.unset()
    }

    fn render_subdiagnostic(&mut self, severity: Subseverity, message: &str) -> io::Result<()> {
        writeln!(self.p)?;
        write!(self.p, "{}", self.padding)?;
        self.p.set(palette::HELP.on_default().bold())?;
        write!(self.p, "{}", severity.name())?;
        self.p.unset()?;
        write!(self.p, ": ")?;

        let mut lines = message.split('\n');

        if let Some(line) = lines.next() {
            write!(self.p, "{line}")?;
        }

        let spacing = " ".repeat(severity.name().width() + 2);

        for line in lines {
            writeln!(self.p)?;
            write!(self.p, "{}{spacing}{line}", self.padding)?;
        }

        Ok(())
    }

    fn render_bar(&mut self) -> io::Result<()> {
        writeln!(self.p)?;
        self.p.set(palette::FRAME)?;
        write!(self.p, "{} │", self.padding)?;
        self.p.unset()
    }
}

impl Severity {
    const fn name(self) -> &'static str {
        match self {
            Self::Bug => "internal compiler error",
            Self::Error => "error",
            Self::Debug => "internal debugging message",
        }
    }

    const fn color(self) -> AnsiColor {
        match self {
            Self::Bug | Self::Error => palette::ERROR,
            Self::Debug => palette::DEBUG,
        }
    }
}

mod palette {
    use utility::paint::AnsiColor;

    pub(super) const FRAME: AnsiColor = AnsiColor::BrightBlue;
    pub(super) const ERROR: AnsiColor = AnsiColor::BrightRed;
    pub(super) const HELP: AnsiColor = AnsiColor::BrightCyan;
    pub(super) const DEBUG: AnsiColor = AnsiColor::BrightMagenta;
}
