// Error types shared across the sync engine
use thiserror::Error;

/// Error type covering the whole channel-manager pipeline, from wire
/// building through transport to local conflict handling.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("SOAP fault: {code} - {message}")]
    SoapFault { code: String, message: String },

    #[error("OTA error {code}: {message}")]
    Ota { code: String, message: String },

    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {message}")]
    Authentication { message: String, token_expired: bool },
}

impl ChannelError {
    /// Whether the sync orchestrator may retry the failed operation with
    /// backoff. Remote systems that answered definitively (faults, OTA
    /// errors) and local mistakes (validation, conflicts) are never retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChannelError::Network(_) | ChannelError::Timeout(_) => true,
            ChannelError::Authentication { token_expired, .. } => *token_expired,
            ChannelError::SoapFault { .. }
            | ChannelError::Ota { .. }
            | ChannelError::XmlParse(_)
            | ChannelError::Validation(_)
            | ChannelError::Conflict(_) => false,
        }
    }
}

/// Result alias for sync-engine operations
pub type ChannelResult<T> = Result<T, ChannelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(ChannelError::Network("refused".to_string()).is_retryable());
        assert!(ChannelError::Timeout(5000).is_retryable());
        assert!(ChannelError::Authentication {
            message: "token expired".to_string(),
            token_expired: true
        }
        .is_retryable());

        assert!(!ChannelError::Authentication {
            message: "bad credentials".to_string(),
            token_expired: false
        }
        .is_retryable());
        assert!(!ChannelError::Validation("empty room type".to_string()).is_retryable());
        assert!(!ChannelError::SoapFault {
            code: "soap:Client".to_string(),
            message: "bad request".to_string()
        }
        .is_retryable());
        assert!(!ChannelError::Ota {
            code: "450".to_string(),
            message: "unknown rate plan".to_string()
        }
        .is_retryable());
    }
}
