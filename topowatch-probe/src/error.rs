use thiserror::Error;

/// Errors raised while producing or publishing reports.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("reporter {name} failed: {message}")]
    Reporter { name: String, message: String },

    #[error("tagger {name} failed: {message}")]
    Tagger { name: String, message: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ProbeError {
    pub fn reporter(name: impl Into<String>, message: impl ToString) -> Self {
        ProbeError::Reporter {
            name: name.into(),
            message: message.to_string(),
        }
    }

    pub fn tagger(name: impl Into<String>, message: impl ToString) -> Self {
        ProbeError::Tagger {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
