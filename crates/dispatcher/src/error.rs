//! Dispatcher error types

use contracts::{ContractError, SinkConfig, SinkType};
use thiserror::Error;

/// Errors raised while building the sink set
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A configured sink could not be opened
    #[error("cannot open {sink_type:?} sink '{name}': {source}")]
    SinkCreation {
        name: String,
        sink_type: SinkType,
        #[source]
        source: ContractError,
    },

    /// Two sinks share a name
    #[error("sink name '{name}' is configured more than once")]
    DuplicateSink { name: String },
}

impl DispatcherError {
    /// Wrap the failure to open the sink described by `config`
    pub fn sink_creation(config: &SinkConfig, source: ContractError) -> Self {
        Self::SinkCreation {
            name: config.name.clone(),
            sink_type: config.sink_type,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::error::Error as _;

    #[test]
    fn test_sink_creation_keeps_cause() {
        let config = SinkConfig {
            name: "udp".to_string(),
            sink_type: SinkType::Network,
            queue_capacity: 10,
            params: HashMap::new(),
        };
        let err = DispatcherError::sink_creation(
            &config,
            ContractError::sink_write("udp", "missing 'addr' parameter"),
        );

        let text = err.to_string();
        assert!(text.contains("Network sink 'udp'"), "got: {text}");
        assert!(text.contains("missing 'addr'"), "got: {text}");
        assert!(err.source().is_some());
    }
}
