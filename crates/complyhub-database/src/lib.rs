//! # complyhub-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all ComplyHub entities. Every multi-row invariant
//! (membership pairs, cascading deletes, the single current document
//! version) is maintained inside one transaction.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
