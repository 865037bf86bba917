//! Event engine error types.
//!
//! Provides error types for payload decoding, worker pool operations and
//! registry construction.

use crate::registry::{NotaryKey, NotificationKey};

/// Payload decoding errors.
///
/// Produced by parser functions when a raw notification or notary request
/// does not have the expected shape. Decoding errors are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unexpected number of stack items.
    #[error("wrong number of stack items: expected {expected}, got {actual}")]
    WrongItemCount {
        /// Expected item count.
        expected: usize,
        /// Actual item count.
        actual: usize,
    },

    /// Stack item of an unexpected kind.
    #[error("invalid {field}: expected {expected}, got {actual}")]
    UnexpectedItem {
        /// Name of the decoded field.
        field: &'static str,
        /// Expected item kind.
        expected: &'static str,
        /// Actual item kind.
        actual: &'static str,
    },

    /// Byte array of an unexpected length.
    #[error("invalid {field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Name of the decoded field.
        field: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Integer outside of the representable range.
    #[error("invalid {field}: value {value} out of range")]
    OutOfRange {
        /// Name of the decoded field.
        field: &'static str,
        /// Decoded value.
        value: i128,
    },

    /// Notary request invokes an unexpected contract method.
    #[error("unexpected notary method: expected {expected}, got {actual}")]
    UnexpectedMethod {
        /// Expected method name.
        expected: &'static str,
        /// Actual method name.
        actual: String,
    },

    /// Malformed hex string.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}

/// Worker pool errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Requested pool size is not usable.
    #[error("invalid pool size {size}: must be in [1:{max}]")]
    InvalidSize {
        /// Requested size.
        size: usize,
        /// Largest supported size.
        max: usize,
    },

    /// No tokio runtime to spawn tasks on.
    #[error("no async runtime available for the worker pool")]
    NoRuntime,

    /// All workers are busy.
    #[error("worker pool saturated (capacity {capacity})")]
    Saturated {
        /// Pool capacity.
        capacity: usize,
    },

    /// The pool no longer accepts tasks.
    #[error("worker pool is closed")]
    Closed,
}

/// Registry construction errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two notification parsers share a key.
    #[error("duplicate notification parser for {0}")]
    DuplicateParser(NotificationKey),

    /// Two notification handlers share a key.
    #[error("duplicate notification handler for {0}")]
    DuplicateHandler(NotificationKey),

    /// Two notary parsers share a key.
    #[error("duplicate notary parser for {0}")]
    DuplicateNotaryParser(NotaryKey),

    /// Two notary handlers share a key.
    #[error("duplicate notary handler for {0}")]
    DuplicateNotaryHandler(NotaryKey),
}
