use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing configuration key: {0}")]
    MissingKey(&'static str),

    #[error("Invalid credentials blob: {0}")]
    Credentials(String),

    #[error("Retry budget must allow at least 2 attempts, got {0}")]
    RetryBudget(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
