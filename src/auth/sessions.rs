// src/auth/sessions.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::auth::token::{hash_token, random_token};
use crate::db::accounts::Account;
use crate::errors::ServerError;

pub const SESSION_COOKIE: &str = "session";

/// Create a session and return the raw token for the cookie.
/// Only the SHA-256 of the token is stored.
pub fn create_session(
    conn: &Connection,
    account_id: &str,
    now: i64,
    ttl_secs: i64,
) -> Result<String, ServerError> {
    let raw_token = random_token();
    let hash = hash_token(&raw_token);
    let expires_at = now + ttl_secs;

    conn.execute(
        r#"
        insert into sessions (account_id, token_hash, created_at, expires_at)
        values (?1, ?2, ?3, ?4)
        "#,
        params![account_id, hash.as_slice(), now, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(raw_token)
}

pub fn load_account_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<Account>, ServerError> {
    let hash = hash_token(raw_token);

    conn.query_row(
        r#"
        select a.account_id, a.account_charity, a.account_created_at
        from sessions s
        join account a on a.account_id = s.account_id
        where s.token_hash = ?1
          and s.expires_at > ?2
          and s.revoked_at is null
        "#,
        params![hash.as_slice(), now],
        |row| {
            Ok(Account {
                id: row.get(0)?,
                charity: row.get(1)?,
                created_at: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

pub fn revoke_session(conn: &Connection, raw_token: &str, now: i64) -> Result<(), ServerError> {
    let hash = hash_token(raw_token);
    conn.execute(
        "update sessions set revoked_at = ?1 where token_hash = ?2 and revoked_at is null",
        params![now, hash.as_slice()],
    )
    .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;
    Ok(())
}
