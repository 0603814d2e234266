pub mod accounts;
pub mod connection;
pub mod listings;
pub mod login_requests;

pub use connection::{init_db, Database};
