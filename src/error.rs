use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("show '{show}': no scored reference time, DER is undefined")]
    DegenerateShow { show: String },
    #[error("assignment failed while {context}: {message}")]
    Assignment {
        context: &'static str,
        message: String,
    },
}

impl ScoringError {
    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn degenerate_show(show: impl Into<String>) -> Self {
        Self::DegenerateShow { show: show.into() }
    }

    pub(crate) fn assignment(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Assignment {
            context,
            message: err.to_string(),
        }
    }
}
