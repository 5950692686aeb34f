//! Client error types

use thiserror::Error;

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to a Fabric server.
///
/// All of these surface synchronously from the client methods. Failures that
/// happen after a chat stream has been established are delivered in-band as
/// [`StreamMessage::Error`](crate::protocol::StreamMessage::Error) instead,
/// because the stream is the only remaining return channel at that point.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured server URL could not be used as a request base
    #[error("invalid server URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The HTTP client itself could not be constructed
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// The request could not be sent or its response body could not be read
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code
    #[error("HTTP request to {url} failed with status code {status}{}", status_body_suffix(.body))]
    Status {
        url: String,
        status: u16,
        body: Option<String>,
    },

    /// A request body could not be serialized to JSON
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A response body could not be decoded from JSON
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A required environment variable was missing
    #[error("environment variable {name} is not set")]
    MissingEnv { name: &'static str },
}

fn status_body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(": body: {body}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_url_status_and_body() {
        let err = Error::Status {
            url: "http://localhost:8080/chat".to_string(),
            status: 404,
            body: Some("not found".to_string()),
        };
        let text = err.to_string();
        assert!(text.contains("http://localhost:8080/chat"));
        assert!(text.contains("404"));
        assert!(text.contains("not found"));
    }

    #[test]
    fn status_error_omits_body_when_absent() {
        let err = Error::Status {
            url: "http://localhost:8080/config".to_string(),
            status: 500,
            body: None,
        };
        let text = err.to_string();
        assert!(text.contains("500"));
        assert!(!text.contains("body:"));
    }
}
