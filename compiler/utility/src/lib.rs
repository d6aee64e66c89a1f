//! Utility functionality and definitions.

use paint::{AnsiColor, ColorExt, Painter};
use std::{
    cell::Cell,
    fmt,
    io::{self, Write},
};

pub use atom::Atom;
pub use difference::{Changeset, Difference};
pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

pub mod atom;
pub mod paint;

pub type Str = std::borrow::Cow<'static, str>;

pub type SmallVec<T, const N: usize> = smallvec::SmallVec<[T; N]>;

#[macro_export]
macro_rules! obtain {
    ($expr:expr, $pat:pat $( if $guard:expr )? $(,)? => $mapping:expr $(,)?) => {
        match $expr {
            $pat $( if $guard )? => Some($mapping),
            _ => None
        }
    };
}

pub fn default<T: Default>() -> T {
    T::default()
}

pub trait ChangesetExt {
    /// Render the changeset line by line with a colored ledge in front of each line.
    ///
    /// The [`fmt::Display`] implementation provided by the crate `difference` is
    /// unreadable if only whitespace differs.
    fn render_with_ledge(&self, p: &mut Painter) -> io::Result<()>;
}

impl ChangesetExt for Changeset {
    fn render_with_ledge(&self, p: &mut Painter) -> io::Result<()> {
        for difference in &self.diffs {
            let (ledge, color, lines) = match difference {
                Difference::Same(lines) => (" ", None, lines),
                Difference::Add(lines) => ("+", Some(AnsiColor::Green), lines),
                Difference::Rem(lines) => ("-", Some(AnsiColor::Red), lines),
            };

            for line in lines.lines().chain(lines.is_empty().then_some("")) {
                match color {
                    Some(color) => {
                        p.set(color.to_bg())?;
                        write!(p, "{ledge}")?;
                        p.unset()?;
                        p.set(color)?;
                        writeln!(p, " {line}")?;
                        p.unset()?;
                    }
                    None => {
                        p.set(AnsiColor::BrightWhite.to_bg())?;
                        write!(p, "{ledge}")?;
                        p.unset()?;
                        writeln!(p, " {line}")?;
                    }
                }
            }
        }

        Ok(())
    }
}

pub trait ListingExt {
    fn list(self, conjunction: Conjunction) -> String;
}

impl<I> ListingExt for I
where
    I: Iterator + Clone,
    I::Item: fmt::Display,
{
    fn list(self, conjunction: Conjunction) -> String {
        let mut this = self.peekable();
        let mut first = true;
        let mut result = String::new();

        while let Some(item) = this.next() {
            if !first {
                if this.peek().is_some() {
                    result += ", ";
                } else {
                    result += " ";
                    result += conjunction.name();
                    result += " ";
                }
            }

            result += &item.to_string();
            first = false;
        }

        result
    }
}

#[derive(Clone, Copy)]
pub enum Conjunction {
    And,
    Or,
}

impl Conjunction {
    const fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Use the singular or the plural form of the given word depending on the given amount.
///
/// # Examples
///
/// ```
/// # use utility::pluralize;
/// assert_eq!(pluralize!(1, "factor"), "factor");
/// assert_eq!(pluralize!(15, "factor"), "factors");
/// assert_eq!(pluralize!(0, "person", "people"), "people");
/// ```
#[macro_export]
macro_rules! pluralize {
    ($amount:expr, $singular:expr, $plural:expr $(,)?) => {
        match $amount {
            1 => ::std::borrow::Cow::<'_, str>::from($singular),
            _ => $plural.into(),
        }
    };
    ($amount:expr, $singular:literal $(,)?) => {
        match $amount {
            1 => $singular,
            _ => concat!($singular, "s"),
        }
    };
}

pub trait QuoteExt {
    fn quote(self) -> String;
}

impl<D: fmt::Display> QuoteExt for D {
    fn quote(self) -> String {
        format!("‘{self}’")
    }
}

#[macro_export]
macro_rules! quoted {
    ($code:expr) => {
        concat!("‘", $code, "’")
    };
}

pub trait FormatError {
    fn format(self) -> String;
}

impl FormatError for io::Error {
    fn format(self) -> String {
        let mut message = self.to_string();
        if let Some(first) = message.get_mut(..1) {
            first.make_ascii_lowercase();
        }
        message
    }
}

pub fn displayed<'f>(
    formatter: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result + 'f,
) -> impl fmt::Display + 'f {
    Formatted(Cell::new(Some(formatter)))
}

struct Formatted<F>(Cell<Option<F>>);

impl<F: FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result> fmt::Display for Formatted<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.take() {
            Some(formatter) => formatter(f),
            None => Ok(()),
        }
    }
}
