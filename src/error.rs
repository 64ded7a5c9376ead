use thiserror::Error;

/// Failure to turn a single reply line into a typed value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Empty reply")]
    EmptyReply,
    #[error("Field count mismatch: expected {expected}, got {actual}")]
    FieldCountMismatch { expected: usize, actual: usize },
    #[error("Field {index} is not a valid {expected}: {raw:?}")]
    FieldParse {
        index: usize,
        raw: String,
        expected: &'static str,
    },
    #[error("Unknown {field} value: {raw:?}")]
    UnknownEnumValue { field: &'static str, raw: String },
}

/// Failure reported by the transport underneath the command layer.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error ({context}): {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },
    #[error("Connection timeout")]
    Timeout,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Connection closed by instrument")]
    Disconnected,
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum ScpiError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("IO error ({context}): {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for ScpiError {
    fn from(source: std::io::Error) -> Self {
        ScpiError::Io {
            source,
            context: "unspecified".to_string(),
        }
    }
}
