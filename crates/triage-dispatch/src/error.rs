use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("worker process error: {0}")]
    Process(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
