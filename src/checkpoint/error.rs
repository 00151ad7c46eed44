//! Checkpoint error types.

use thiserror::Error;

/// Errors raised while saving or resuming an instance.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Encoding to JSON or bincode failed
    #[error("Could not encode checkpoint: {0}")]
    SerializationFailed(String),

    /// Input is not a checkpoint in the expected encoding
    #[error("Could not decode checkpoint: {0}")]
    DeserializationFailed(String),

    #[error("Checkpoint format {found} cannot be read, expected {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint was taken from a machine with another root name
    #[error("Checkpoint belongs to machine '{found}', not '{expected}'")]
    MachineMismatch { expected: String, found: String },

    /// Checkpoint or transaction names an element the machine does not have
    #[error("Checkpoint does not fit this machine: {0}")]
    ValidationFailed(String),
}
