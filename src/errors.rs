use thiserror::Error;

/// Failure raised by a formatter while marshalling a pipe input.
///
/// The engine never propagates these: a failing pipe is logged and yields
/// an empty string.
#[derive(Debug, Error)]
pub enum FormatError {
    // The input value (or a parameter) has the wrong JSON type
    #[error("type error: expected {expected}, got {got}")]
    Type { expected: &'static str, got: &'static str },

    // A required pipe parameter was not given
    #[error("missing parameter at index {0}")]
    MissingParam(usize),

    // Any other formatter-specific failure, with a message
    #[error("{0}")]
    Custom(String),
}

impl FormatError {
    pub fn custom(msg: impl Into<String>) -> Self {
        FormatError::Custom(msg.into())
    }
}

// Type alias for results returned by formatters
pub type Result<T> = std::result::Result<T, FormatError>;
