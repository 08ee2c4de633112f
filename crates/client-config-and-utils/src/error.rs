use thiserror::Error;

/// Failures while loading configuration or preparing the client directory.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("api_url is not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("config file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Home directory missing or a directory could not be created.
    #[error("{0}")]
    Path(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
