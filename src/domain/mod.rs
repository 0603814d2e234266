pub mod listing;
pub mod query;
pub mod time;
