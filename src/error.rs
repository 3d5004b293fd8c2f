//! Error types.

use std::net::AddrParseError;

use thiserror::Error;

/// The error type returned by waymark's fallible startup operations.
///
/// Application-level errors (404, 500 from a panicking handler, etc.) are
/// expressed as HTTP [`Response`](crate::Response) values, not as `Error`s.
/// This type surfaces configuration and infrastructure failures: a malformed
/// route, a bad listen address, a socket that cannot be bound.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: AddrParseError,
    },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// A route pattern rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid route `{pattern}`: segment {index} is a variable with no name")]
    EmptyVariable { pattern: String, index: usize },
}

/// A session operation that could not be completed.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The OS random source failed on every attempt. No identifier was
    /// issued and the store is unchanged.
    #[error("entropy source unavailable after {attempts} attempts: {source}")]
    EntropyUnavailable {
        attempts: u32,
        #[source]
        source: rand::Error,
    },
}
