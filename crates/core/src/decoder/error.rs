use std::error::Error as StdError;
use std::fmt::{self, Display};

/// The kind of decode error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The text is not syntactically valid for the format.
    Malformed,
    /// The text is well-formed but does not match the expected shape.
    SchemaViolation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Malformed => write!(f, "Malformed output"),
            ErrorKind::SchemaViolation => write!(f, "Schema violation"),
        }
    }
}

/// Describes a decode error.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error {
    kind: ErrorKind,
    reason: String,
}

impl Error {
    /// Creates a new error with the `Malformed` kind.
    #[inline]
    pub fn malformed<S: Into<String>>(reason: S) -> Self {
        Self {
            kind: ErrorKind::Malformed,
            reason: reason.into(),
        }
    }

    /// Creates a new error with the `SchemaViolation` kind.
    #[inline]
    pub fn schema_violation<S: Into<String>>(reason: S) -> Self {
        Self {
            kind: ErrorKind::SchemaViolation,
            reason: reason.into(),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the reason for the error.
    #[inline]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.reason)
    }
}

impl StdError for Error {}
