//! User profile and administration services.

pub mod service;

pub use service::UserService;
