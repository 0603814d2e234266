// src/db/accounts.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Identity provider subject.
    pub id: String,
    pub charity: bool,
    pub created_at: i64,
}

/// Insert the account on first sign-in; later sign-ins leave it untouched.
pub fn ensure_account(conn: &Connection, account_id: &str, now: i64) -> Result<(), ServerError> {
    conn.execute(
        "insert into account (account_id, account_created_at) values (?1, ?2)
         on conflict do nothing",
        params![account_id, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert account failed: {e}")))?;
    Ok(())
}

pub fn get_account(conn: &Connection, account_id: &str) -> Result<Option<Account>, ServerError> {
    conn.query_row(
        "select account_id, account_charity, account_created_at
         from account
         where account_id = ?1",
        params![account_id],
        |r| {
            Ok(Account {
                id: r.get(0)?,
                charity: r.get(1)?,
                created_at: r.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select account failed: {e}")))
}

pub fn set_charity(conn: &Connection, account_id: &str, charity: bool) -> Result<(), ServerError> {
    let updated = conn
        .execute(
            "update account set account_charity = ?1 where account_id = ?2",
            params![charity, account_id],
        )
        .map_err(|e| ServerError::DbError(format!("update account charity failed: {e}")))?;
    if updated == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}
