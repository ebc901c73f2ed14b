use thiserror::Error;

/// Errors raised while talking to the text-generation service.
///
/// None of these reach callers of [`crate::select_best_match`]: every
/// variant is logged and turned into a no-match decision.
#[derive(Debug, Error)]
pub enum ArbiterError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("text-generation service returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("text-generation service did not answer within {secs}s")]
    Timeout { secs: u64 },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
