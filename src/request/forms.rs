use std::collections::HashMap;

use astra::Request;
use url::form_urlencoded;

/// Decode the query string. Later duplicates win.
pub fn parse_query(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| parse_form(q.as_bytes()))
        .unwrap_or_default()
}

/// Decode an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    form_urlencoded::parse(body).into_owned().collect()
}
