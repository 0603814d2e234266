// src/request/multipart.rs
//
// `multipart/form-data` for the new-listing form. The body is already
// buffered (bounded by `read_body`), so multer runs to completion on the
// calling worker thread.

use std::collections::HashMap;

use bytes::Bytes;
use futures::executor::block_on;
use futures::stream;
use mime::Mime;
use multer::Multipart;

use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, FilePart>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        self.files.remove(name)
    }
}

/// Pull the boundary out of a `multipart/form-data` content type.
pub fn boundary(content_type: &str) -> Result<String, ServerError> {
    let mime: Mime = content_type
        .parse()
        .map_err(|_| ServerError::BadRequest("invalid content type".into()))?;

    if mime.type_() != mime::MULTIPART || mime.subtype() != mime::FORM_DATA {
        return Err(ServerError::BadRequest(format!(
            "expected multipart/form-data, got {mime}"
        )));
    }

    mime.get_param(mime::BOUNDARY)
        .map(|b| b.as_str().trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ServerError::BadRequest("multipart boundary missing".into()))
}

pub fn parse_multipart(content_type: &str, body: &[u8]) -> Result<MultipartForm, ServerError> {
    let boundary = boundary(content_type)?;
    let body = Bytes::copy_from_slice(body);
    let stream = stream::once(async move { Ok::<_, std::io::Error>(body) });

    block_on(collect(Multipart::new(stream, boundary)))
}

async fn collect(mut multipart: Multipart<'_>) -> Result<MultipartForm, ServerError> {
    let malformed =
        |e: multer::Error| ServerError::BadRequest(format!("malformed multipart body: {e}"));
    let mut form = MultipartForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(|m| m.to_string());
                let data = field.bytes().await.map_err(malformed)?;
                form.files.insert(
                    name,
                    FilePart {
                        filename: Some(filename).filter(|f| !f.is_empty()),
                        content_type,
                        data: data.to_vec(),
                    },
                );
            }
            None => {
                let value = field.text().await.map_err(malformed)?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

#[cfg(test)]
pub(crate) fn encode(
    boundary: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((name, filename, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
