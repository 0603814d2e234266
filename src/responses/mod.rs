pub mod errors;
pub mod file;
pub mod html;
pub mod redirect;

pub use crate::errors::ResultResp;
pub use errors::error_to_response;
pub use file::blob_response;
pub use html::html_response;
pub use redirect::{redirect, redirect_with_cookies};
