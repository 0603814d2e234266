// src/db/login_requests.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

/// A sign-in started at `/login` and not yet completed at `/callback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub state: String,
    pub code_verifier: String,
    pub nonce: String,
    pub return_to: String,
    pub created_at: i64,
    pub expires_at: i64,
}

pub fn insert_login_request(conn: &Connection, req: &LoginRequest) -> Result<(), ServerError> {
    conn.execute(
        "insert into login_requests (state, code_verifier, nonce, return_to, created_at, expires_at)
         values (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            req.state,
            req.code_verifier,
            req.nonce,
            req.return_to,
            req.created_at,
            req.expires_at
        ],
    )
    .map_err(|e| ServerError::DbError(format!("insert login request failed: {e}")))?;

    // Opportunistic cleanup of abandoned sign-ins.
    conn.execute(
        "delete from login_requests where expires_at <= ?1",
        params![req.created_at],
    )
    .map_err(|e| ServerError::DbError(format!("prune login requests failed: {e}")))?;
    Ok(())
}

/// Consume a login request by state:
/// - must exist
/// - must be unexpired (expires_at > now)
/// The row is deleted either way, so a state can only ever be redeemed once.
pub fn consume_login_request(
    conn: &mut Connection,
    state: &str,
    now: i64,
) -> Result<Option<LoginRequest>, ServerError> {
    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let row = tx
        .query_row(
            "delete from login_requests where state = ?1
             returning state, code_verifier, nonce, return_to, created_at, expires_at",
            params![state],
            |r| {
                Ok(LoginRequest {
                    state: r.get(0)?,
                    code_verifier: r.get(1)?,
                    nonce: r.get(2)?,
                    return_to: r.get(3)?,
                    created_at: r.get(4)?,
                    expires_at: r.get(5)?,
                })
            },
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("consume login request failed: {e}")))?;

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;

    Ok(row.filter(|r| r.expires_at > now))
}
