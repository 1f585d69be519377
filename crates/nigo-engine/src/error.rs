use shared_types::AccessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Document could not be decoded: {0}")]
    Decode(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<AccessError> for EngineError {
    fn from(err: AccessError) -> Self {
        EngineError::Decode(err.to_string())
    }
}

/// Failure inside one risk rule pass
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Fact unavailable: {0}")]
    Access(#[from] AccessError),
}
