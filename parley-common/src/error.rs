//! Common error types for Parley

use thiserror::Error;

/// Common result type for Parley operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by query construction, the send/reply lifecycle and the store.
///
/// An answer that fails its shape, range, regex, file or index check is not an
/// error: it is reported as validity data and the question is asked again.
#[derive(Error, Debug)]
pub enum Error {
    /// Sender or recipient name is not in the participant whitelist
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    /// Sender and recipient resolve to the same participant
    #[error("Sender and recipient are the same participant: {0}")]
    SameParticipant(String),

    /// Question text missing or blank where one is required
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    /// Limits do not fit the reply kind or the query variant
    #[error("Invalid limits for '{query}': {reason}")]
    InvalidLimits { query: String, reason: String },

    /// Query already carries a valid reply and cannot be sent again
    #[error("Query '{0}' is already satisfied")]
    AlreadySatisfied(String),

    /// A valid reply arrived before one of the query's prerequisites was satisfied
    #[error("Query '{query}' replied before prerequisite '{prerequisite}'")]
    UnmetPrerequisite { query: String, prerequisite: String },

    /// Prerequisites of the stored queries form a cycle
    #[error("Circular dependency between queries: {}", .0.join(", "))]
    CircularDependency(Vec<String>),

    /// A recipient failed to receive or execute queries
    #[error("Recipient '{recipient}' failed: {reason}")]
    Recipient { recipient: String, reason: String },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error (wraps toml::de::Error)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
