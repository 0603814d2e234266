// responses/file.rs
use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use mime::Mime;

/// Serve a stored image. Keys are random and never reused, so the
/// response can be cached indefinitely.
pub fn blob_response(data: Vec<u8>, content_type: &Mime) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", content_type.as_ref())
        .header("Cache-Control", "public, max-age=31536000, immutable")
        .header("X-Content-Type-Options", "nosniff")
        .header("Content-Security-Policy", "default-src 'none'; sandbox")
        .body(Body::from(data))
        .map_err(|_| ServerError::InternalError)
}
