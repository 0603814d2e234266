pub mod cookies;
pub mod forms;
pub mod multipart;

use std::io::Read;

use astra::Request;

use crate::errors::ServerError;

pub use cookies::{clear_cookie, get_cookie, set_cookie};
pub use forms::parse_query;
pub use multipart::parse_multipart;

/// Read the whole request body, refusing anything over `limit` bytes.
pub fn read_body(req: &mut Request, limit: u64) -> Result<Vec<u8>, ServerError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("failed to read body: {e}")))?;

    if buf.len() as u64 > limit {
        return Err(ServerError::PayloadTooLarge);
    }
    Ok(buf)
}

pub fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}
