//! Client error types.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure: connection, TLS, timeout, or body decoding.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success HTTP status.
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("not authenticated; call authenticate() first")]
    NotAuthenticated,

    /// Credentials were refused or no token came back.
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// The command ran but reported a failure status.
    #[error("command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    /// The response did not have the expected shape.
    #[error("unexpected response to `{command}`: {detail}")]
    UnexpectedResponse { command: String, detail: String },
}

impl ClientError {
    pub(crate) fn http(url: &str, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
