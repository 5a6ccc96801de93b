//! The uniform result every RPC method returns.

use std::fmt;

use crate::codes::{Code, StoreErrorKind};

/// A `(code, message)` pair describing how a call ended.
///
/// Methods report failures through the returned `Status` rather than a
/// separate error channel. A success code carries the method output to the
/// caller; any other code carries only `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl Status {
    /// Wraps any displayable value, typically an external error.
    pub fn new(code: Code, message: impl fmt::Display) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    pub fn ok() -> Self {
        Self::bare(Code::Ok)
    }

    pub fn created() -> Self {
        Self::bare(Code::Created)
    }

    pub fn accepted() -> Self {
        Self::bare(Code::Accepted)
    }

    pub fn no_content() -> Self {
        Self::bare(Code::NoContent)
    }

    pub fn not_found() -> Self {
        Self::bare(Code::NotFound)
    }

    pub fn invalid(message: impl fmt::Display) -> Self {
        Self::new(Code::INVALID, message)
    }

    pub fn internal(message: impl fmt::Display) -> Self {
        Self::new(Code::INTERNAL, message)
    }

    /// Maps a classified backing-store error, keeping its text as the message.
    pub fn from_store<E>(err: &E) -> Self
    where
        E: Classify + fmt::Display + ?Sized,
    {
        Self::new(Code::from(err.kind()), err)
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    fn bare(code: Code) -> Self {
        Self {
            code,
            message: String::new(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Status {}

impl From<Code> for Status {
    fn from(code: Code) -> Self {
        Self::bare(code)
    }
}

/// Implemented by backing-store errors so they can be turned into a [`Status`].
pub trait Classify {
    fn kind(&self) -> StoreErrorKind;
}
