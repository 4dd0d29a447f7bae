use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid parameters: {0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("lecture fetch failed: {0}")]
    Fetch(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("network timeout")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
