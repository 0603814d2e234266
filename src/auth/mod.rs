pub mod sessions;
pub mod sgid;
pub mod token;

pub use sgid::{IdentityProvider, SgidClient};
