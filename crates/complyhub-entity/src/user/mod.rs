//! User domain entities.

pub mod model;
pub mod status;

pub use model::{CreateUser, UpdateProfile, User, UserSummary};
pub use status::AccountStatus;
