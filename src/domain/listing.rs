use mime::Mime;

use crate::errors::ServerError;

pub const CATEGORIES: [&str; 7] = [
    "Furniture",
    "Electronics",
    "Clothing",
    "Books",
    "Kitchenware",
    "Toys",
    "Others",
];

pub const LOCATIONS: [&str; 5] = ["Central", "North", "North-East", "East", "West"];

const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_SHORT_FIELD_CHARS: usize = 200;

/// Row returned by the search query, in projection order.
#[derive(Debug, Clone)]
pub struct ListingSummary {
    pub id: i64,
    pub description: String,
    pub location: String,
    pub created_at: i64,
    pub image_key: String,
    pub category: String,
}

/// A listing as its owner sees it on the account page.
#[derive(Debug, Clone)]
pub struct OwnListing {
    pub id: i64,
    pub description: String,
    pub category: String,
    pub location: String,
    pub pickup: String,
    pub contact: String,
    pub image_key: String,
    pub created_at: i64,
}

/// Raw text fields from the new-listing form.
#[derive(Debug, Default)]
pub struct ListingForm {
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub pickup: Option<String>,
    pub contact: Option<String>,
}

/// Validated listing fields, ready to insert once the image is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub description: String,
    pub category: String,
    pub location: String,
    pub pickup: String,
    pub contact: String,
}

impl ListingForm {
    /// Every field is required; category and location must be known values.
    pub fn validate(self) -> Result<NewListing, ServerError> {
        let description = required("description", self.description, MAX_DESCRIPTION_CHARS)?;
        let category = required("category", self.category, MAX_SHORT_FIELD_CHARS)?;
        let location = required("location", self.location, MAX_SHORT_FIELD_CHARS)?;
        let pickup = required("pickup", self.pickup, MAX_SHORT_FIELD_CHARS)?;
        let contact = required("contact", self.contact, MAX_SHORT_FIELD_CHARS)?;

        if !CATEGORIES.contains(&category.as_str()) {
            return Err(ServerError::Unprocessable(format!(
                "unknown category {category:?}"
            )));
        }
        if !LOCATIONS.contains(&location.as_str()) {
            return Err(ServerError::Unprocessable(format!(
                "unknown location {location:?}"
            )));
        }

        Ok(NewListing {
            description,
            category,
            location,
            pickup,
            contact,
        })
    }
}

fn required(name: &str, value: Option<String>, max_chars: usize) -> Result<String, ServerError> {
    let value = value.as_deref().map(str::trim).unwrap_or("");
    if value.is_empty() {
        return Err(ServerError::Unprocessable(format!("{name} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(ServerError::Unprocessable(format!(
            "{name} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

pub const IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Check an uploaded image part and return its parsed content type,
/// stripped of parameters.
pub fn validate_image(
    content_type: Option<&str>,
    len: usize,
    max_bytes: u64,
) -> Result<Mime, ServerError> {
    if len == 0 {
        return Err(ServerError::Unprocessable("image is required".into()));
    }
    if len as u64 > max_bytes {
        return Err(ServerError::PayloadTooLarge);
    }

    let mime: Mime = content_type
        .unwrap_or("application/octet-stream")
        .parse()
        .map_err(|_| ServerError::Unprocessable("invalid image content type".into()))?;

    // Raster formats only; SVG can carry script.
    if !IMAGE_TYPES.contains(&mime.essence_str()) {
        return Err(ServerError::Unprocessable(format!(
            "image must be JPEG, PNG, GIF or WebP, got {}",
            mime.essence_str()
        )));
    }
    mime.essence_str()
        .parse()
        .map_err(|_| ServerError::Unprocessable("invalid image content type".into()))
}
