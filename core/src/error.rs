use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayErr>;

#[derive(Error, Debug)]
pub enum RelayErr {
    /// The conversation endpoint answered with anything but `200 OK`.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("could not find home directory")]
    MissingHome,

    /// A configured header name or value cannot be sent over HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("failed to parse config: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to edit config: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}
