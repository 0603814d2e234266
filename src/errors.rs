use astra::Response;
use thiserror::Error;

/// Errors originating from either the server logic
/// (routing, validation, auth) or downstream layers (DB, blob store, sgID).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Unprocessable Entity: {0}")]
    Unprocessable(String),
    #[error("Payload Too Large")]
    PayloadTooLarge,
    #[error("Database Error: {0}")]
    DbError(String),
    #[error("Storage Error: {0}")]
    StorageError(String),
    #[error("Identity Provider Error: {0}")]
    IdentityError(String),
    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Unprocessable(_) => 422,
            ServerError::PayloadTooLarge => 413,
            ServerError::IdentityError(_) => 502,
            ServerError::DbError(_) | ServerError::StorageError(_) | ServerError::InternalError => {
                500
            }
        }
    }
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;
