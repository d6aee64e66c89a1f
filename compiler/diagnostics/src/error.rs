//! Error handling mechanisms.

use crate::reporter::ErasedReportedError;

pub type Result<T = (), E = ErasedReportedError> = std::result::Result<T, E>;

/// A value that is always produced together with the information whether errors
/// were reported while producing it.
#[derive(Debug)]
#[must_use]
pub struct Outcome<T> {
    pub bare: T,
    pub health: Health,
}

impl<T> Outcome<T> {
    pub const fn new(bare: T, health: Health) -> Self {
        Self { bare, health }
    }

    pub const fn untainted(bare: T) -> Self {
        Self::new(bare, Health::Untainted)
    }

    pub const fn tainted(bare: T, error: ErasedReportedError) -> Self {
        Self::new(bare, Health::Tainted(error))
    }

    pub fn map<U>(self, mapper: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome::new(mapper(self.bare), self.health)
    }
}

pub trait Stain<T> {
    fn stain(self, health: &mut Health) -> T;
}

impl<T> Stain<T> for Outcome<T> {
    fn stain(self, health: &mut Health) -> T {
        *health = health.and(self.health);
        self.bare
    }
}

impl<T: PossiblyErroneous> Stain<T> for Result<T> {
    fn stain(self, health: &mut Health) -> T {
        match self {
            Ok(value) => value,
            Err(error) => {
                health.taint(error);
                T::error(error)
            }
        }
    }
}

impl<T> From<Outcome<T>> for Result<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome.health {
            Health::Untainted => Ok(outcome.bare),
            Health::Tainted(error) => Err(error),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[must_use]
pub enum Health {
    #[default]
    Untainted,
    Tainted(ErasedReportedError),
}

impl Health {
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Untainted, Self::Untainted) => Self::Untainted,
            (Self::Tainted(error), _) | (_, Self::Tainted(error)) => Self::Tainted(error),
        }
    }

    pub fn taint(&mut self, error: ErasedReportedError) {
        if *self == Self::Untainted {
            *self = Self::Tainted(error);
        }
    }

    pub fn is_tainted(self) -> bool {
        matches!(self, Self::Tainted(_))
    }
}

impl From<Result> for Health {
    fn from(result: Result) -> Self {
        match result {
            Ok(()) => Self::Untainted,
            Err(error) => Self::Tainted(error),
        }
    }
}

impl From<Health> for Result {
    fn from(health: Health) -> Self {
        match health {
            Health::Untainted => Ok(()),
            Health::Tainted(error) => Err(error),
        }
    }
}

/// A type with a value standing in for something erroneous.
pub trait PossiblyErroneous {
    fn error(error: ErasedReportedError) -> Self;
}

impl PossiblyErroneous for ErasedReportedError {
    fn error(error: ErasedReportedError) -> Self {
        error
    }
}
