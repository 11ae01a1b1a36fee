use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The model provider could not be reached.
    Connection,
    /// The credentials were rejected by the model provider.
    InvalidCredentials,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The model provider answered with something that cannot be used,
    /// such as an empty choice list.
    MalformedResponse,
    /// The request took too long.
    Timeout,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Connection => write!(f, "Connection failure"),
            ErrorKind::InvalidCredentials => write!(f, "Invalid credentials"),
            ErrorKind::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ErrorKind::MalformedResponse => write!(f, "Malformed response"),
            ErrorKind::Timeout => write!(f, "Timeout"),
            ErrorKind::Other => write!(f, "Other error"),
        }
    }
}
