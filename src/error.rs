//! Error types used across the pipeline and the publisher.
//!
//! Errors are categorized per component, each wrapping a more specific
//! [`ErrorKind`]. Malformed input records are deliberately not represented
//! here; they are a [`crate::normalize::DropReason`] and never abort the
//! pipeline.

use thiserror::Error;

/// The main Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Specific error categories shared by all components.
#[derive(Error, Debug, Clone)]
pub enum ErrorKind {
    /// Failed to reach an external collaborator (broker, database).
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A statement against a relational store failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Encoding or decoding a record failed outside the normalizer.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Delivering a message to the topic failed.
    #[error("Publish error: {0}")]
    PublishError(String),

    /// Receiving a message from the topic failed.
    #[error("Consume error: {0}")]
    ConsumeError(String),

    /// Anything that does not fit the categories above.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Component-level errors.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Config Error - {0}")]
    ConfigError(ErrorKind),

    #[error("Transport Error - {0}")]
    TransportError(ErrorKind),

    #[error("Lookup Error - {0}")]
    LookupError(ErrorKind),

    #[error("Warehouse Error - {0}")]
    WarehouseError(ErrorKind),

    #[error("Producer Error - {0}")]
    ProducerError(ErrorKind),

    #[error("Pipeline Error - {0}")]
    PipelineError(ErrorKind),
}
