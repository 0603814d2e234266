pub mod account;
pub mod error;
pub mod home;
pub mod new_listing;

pub use account::{account_page, AccountVm};
pub use error::error_page;
pub use home::{home_page, HomeVm};
pub use new_listing::new_listing_page;
