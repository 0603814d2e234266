use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use crate::domain::listing::{ListingSummary, NewListing, OwnListing};
use crate::domain::query::{listing_query, SearchFilters, Viewer};
use crate::errors::ServerError;

/// Listings visible to `viewer` that match `filters`, newest first.
pub fn search_listings(
    conn: &Connection,
    viewer: &Viewer,
    filters: &SearchFilters,
) -> Result<Vec<ListingSummary>, ServerError> {
    let q = listing_query(viewer, filters);
    debug!(viewer = %viewer, bindings = q.bindings.len(), "searching listings");

    let mut stmt = conn
        .prepare(&q.query)
        .map_err(|e| ServerError::DbError(format!("prepare listing search failed: {e}")))?;

    let rows = stmt
        .query_map(params_from_iter(q.bindings.iter()), |row| {
            Ok(ListingSummary {
                id: row.get(0)?,
                description: row.get(1)?,
                location: row.get(2)?,
                created_at: row.get(3)?,
                image_key: row.get(4)?,
                category: row.get(5)?,
            })
        })
        .map_err(|e| ServerError::DbError(format!("listing search failed: {e}")))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

pub fn insert_listing(
    conn: &Connection,
    owner_id: &str,
    listing: &NewListing,
    image_key: &str,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        INSERT INTO listing (
            listing_owner_id,
            listing_description,
            listing_category,
            listing_location,
            listing_pickup,
            listing_contact,
            listing_image_key,
            listing_created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            owner_id,
            listing.description,
            listing.category,
            listing.location,
            listing.pickup,
            listing.contact,
            image_key,
            now
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert listing failed: {e}")))?;

    Ok(conn.last_insert_rowid())
}

/// Every listing owned by `owner_id`, regardless of age.
pub fn list_owned(conn: &Connection, owner_id: &str) -> Result<Vec<OwnListing>, ServerError> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT listing_id, listing_description, listing_category, listing_location,
                   listing_pickup, listing_contact, listing_image_key, listing_created_at
            FROM listing
            WHERE listing_owner_id = ?1
            ORDER BY listing_created_at DESC, listing_id DESC
            "#,
        )
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let rows = stmt
        .query_map(params![owner_id], |row| {
            Ok(OwnListing {
                id: row.get(0)?,
                description: row.get(1)?,
                category: row.get(2)?,
                location: row.get(3)?,
                pickup: row.get(4)?,
                contact: row.get(5)?,
                image_key: row.get(6)?,
                created_at: row.get(7)?,
            })
        })
        .map_err(|e| ServerError::DbError(e.to_string()))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
    }
    Ok(out)
}

/// Delete a listing if `owner_id` owns it. Returns the image key of the
/// removed row, or `None` when there was nothing of theirs to delete.
pub fn delete_owned(
    conn: &Connection,
    listing_id: i64,
    owner_id: &str,
) -> Result<Option<String>, ServerError> {
    conn.query_row(
        "DELETE FROM listing
         WHERE listing_id = ?1 AND listing_owner_id = ?2
         RETURNING listing_image_key",
        params![listing_id, owner_id],
        |r| r.get(0),
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("delete listing failed: {e}")))
}
