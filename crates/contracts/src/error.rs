//! Layered error definitions
//!
//! Categorized by source: config / topic / context / source / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Topic Errors =====
    /// Topic name rejected
    #[error("invalid topic name '{topic}': {message}")]
    InvalidTopicName { topic: String, message: String },

    /// Topic already registered with another message type
    #[error("topic '{topic}' carries {existing}, requested {requested}")]
    TopicTypeMismatch {
        topic: String,
        existing: &'static str,
        requested: &'static str,
    },

    /// Subscription already has a callback
    #[error("subscription on '{topic}' already has a callback")]
    AlreadySubscribed { topic: String },

    // ===== Context Errors =====
    /// Runtime context was shut down
    #[error("context has been shut down")]
    ContextShutdown,

    // ===== Source Errors =====
    /// Pose source failure (replay file, profile generator)
    #[error("pose source '{source_name}' error: {message}")]
    Source {
        source_name: String,
        message: String,
    },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid topic name error
    pub fn invalid_topic(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTopicName {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create pose source error
    pub fn source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
