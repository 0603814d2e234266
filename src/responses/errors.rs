use crate::errors::ServerError;
use crate::templates::pages::error_page;
use astra::{Body, Response, ResponseBuilder};
use tracing::{error, warn};

/// Convert a ServerError into a proper HTML response.
/// Server-side failures are logged in full but shown generically.
pub fn error_to_response(err: ServerError) -> Response {
    let status = err.status();
    let message = match &err {
        ServerError::NotFound => "Not Found".to_string(),
        ServerError::BadRequest(msg)
        | ServerError::Unauthorized(msg)
        | ServerError::Unprocessable(msg) => msg.clone(),
        ServerError::PayloadTooLarge => "The upload is too large".to_string(),
        ServerError::IdentityError(_) => "Sign-in is unavailable, please try again".to_string(),
        ServerError::DbError(_) | ServerError::StorageError(_) | ServerError::InternalError => {
            "Internal Server Error".to_string()
        }
    };

    if status >= 500 {
        error!(status, error = %err, "request failed");
    } else {
        warn!(status, error = %err, "request rejected");
    }

    html_error_response(status, &message)
}

/// Build an HTML error page
pub fn html_error_response(status: u16, message: &str) -> Response {
    let html = error_page(status, message).into_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(html))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
