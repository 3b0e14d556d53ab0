mod color;
mod ident;

pub use color::Rgba;
pub use ident::normalize_variable_id;

/// Common error types
#[derive(thiserror::Error, Debug)]
pub enum TokenlensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("host error: {0}")]
    Host(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid color literal: {0}")]
    Color(String),

    #[error("scan cancelled")]
    Cancelled,

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TokenlensError>;
