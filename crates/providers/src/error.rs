use reqwest::StatusCode;

/// Broad failure classes for a remote assistant call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Endpoint or credential missing or unusable
    Configuration,
    /// Network-level failure, including timeouts
    Transport,
    /// Endpoint answered, but not with a usable reply
    Protocol,
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Assistant not configured: {reason}")]
    NotConfigured { reason: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },
}

impl AssistantError {
    pub fn not_configured(reason: impl Into<String>) -> Self {
        Self::NotConfigured {
            reason: reason.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AssistantError::NotConfigured { .. } => ErrorKind::Configuration,
            AssistantError::Transport(_) => ErrorKind::Transport,
            AssistantError::Status { .. } | AssistantError::MalformedResponse { .. } => {
                ErrorKind::Protocol
            }
        }
    }
}
