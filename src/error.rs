//! Error type shared by the task bodies and board bring-up

use core::fmt;

use embedded_hal::digital;

/// Errors surfaced by ServoBench tasks and startup code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A GPIO read or write failed
    Pin(digital::ErrorKind),
    /// Sweep bounds or step leave no room for a single iteration
    InvalidSweep,
    /// Task plan declares the same task twice or has no room left
    InvalidTaskPlan,
    /// The executor refused to spawn a task (pool exhausted)
    Spawn,
}

impl Error {
    /// Map any `embedded-hal` pin error into [`Error::Pin`]
    pub fn pin<E: digital::Error>(err: E) -> Self {
        Error::Pin(err.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pin(kind) => write!(f, "pin error: {:?}", kind),
            Error::InvalidSweep => f.write_str("sweep range is empty for the given step"),
            Error::InvalidTaskPlan => f.write_str("invalid task plan"),
            Error::Spawn => f.write_str("failed to spawn task"),
        }
    }
}

impl core::error::Error for Error {}
