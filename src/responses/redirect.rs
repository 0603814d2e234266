use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

/// 302 to `location`.
pub fn redirect(location: &str) -> ResultResp {
    redirect_with_cookies(location, &[])
}

/// 302 to `location`, attaching one `Set-Cookie` header per entry.
pub fn redirect_with_cookies(location: &str, cookies: &[String]) -> ResultResp {
    let mut builder = ResponseBuilder::new()
        .status(302)
        .header("Location", location);
    for cookie in cookies {
        builder = builder.header("Set-Cookie", cookie.as_str());
    }
    builder
        .body(Body::empty())
        .map_err(|_| ServerError::InternalError)
}
