use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Completion service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// True when the page simply did not match the expected layout.
    pub fn is_element_miss(&self) -> bool {
        matches!(self, AppError::ElementNotFound(_) | AppError::NotInteractable(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
