use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("{operation} is not supported for format '{format}'")]
    UnsupportedFormat {
        operation: &'static str,
        format: String,
    },

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("renderer failed: {0}")]
    Render(String),

    #[error("renderer produced no output file")]
    MissingOutput,

    #[error("renderer timed out after {0:?}")]
    Timeout(Duration),

    #[error("conversion IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    pub(crate) fn unsupported(operation: &'static str, format: &str) -> Self {
        Self::UnsupportedFormat {
            operation,
            format: format.to_string(),
        }
    }
}
