use super::{InternalError, Interrupted, SolverError};
use std::fmt::Display;

/// Everything that can unwind a computation back to its controller.
///
/// Each branch converts into `Unwind` but never into another branch, so intermediate frames can
/// propagate with `?` without being able to turn an interrupt into an ordinary failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    Interrupted(Interrupted),
    InternalError(InternalError),
    SolverError(SolverError),
}

pub type EngineResult<T> = Result<T, Box<Unwind>>;

impl Display for Unwind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interrupted(interrupted) => interrupted.fmt(f),
            Self::InternalError(err) => err.fmt(f),
            Self::SolverError(err) => err.fmt(f),
        }
    }
}

impl From<Interrupted> for Unwind {
    fn from(interrupted: Interrupted) -> Self {
        Self::Interrupted(interrupted)
    }
}

impl From<InternalError> for Unwind {
    fn from(error: InternalError) -> Self {
        Self::InternalError(error)
    }
}

impl From<SolverError> for Unwind {
    fn from(error: SolverError) -> Self {
        Self::SolverError(error)
    }
}

impl From<Interrupted> for Box<Unwind> {
    fn from(interrupted: Interrupted) -> Self {
        Box::new(Unwind::Interrupted(interrupted))
    }
}

impl From<InternalError> for Box<Unwind> {
    fn from(error: InternalError) -> Self {
        Box::new(Unwind::InternalError(error))
    }
}

impl From<SolverError> for Box<Unwind> {
    fn from(error: SolverError) -> Self {
        Box::new(Unwind::SolverError(error))
    }
}

/// Recovery from ordinary failures only.
pub trait RecoverExt<T> {
    /// Calls `f` if the result is a [`SolverError`]. Interrupts and internal errors are passed
    /// on untouched.
    fn recover<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce(SolverError) -> EngineResult<T>;
}

impl<T> RecoverExt<T> for EngineResult<T> {
    fn recover<F>(self, f: F) -> EngineResult<T>
    where
        F: FnOnce(SolverError) -> EngineResult<T>,
    {
        match self {
            Ok(value) => Ok(value),
            Err(unwind) => match *unwind {
                Unwind::SolverError(err) => f(err),
                other => Err(Box::new(other)),
            },
        }
    }
}
