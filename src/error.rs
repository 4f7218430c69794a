use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing credential: no auth override and ${env_var} is not set")]
    MissingCredential { env_var: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("hf_endpoint says: {snippet} (http status {status})")]
    Endpoint { status: u16, snippet: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Builds an endpoint error from a raw response body, shortening it for display.
    pub fn endpoint(status: u16, body: &str) -> Self {
        Self::Endpoint {
            status,
            snippet: crate::text::shorten(body, crate::text::SNIPPET_WIDTH),
        }
    }
}
