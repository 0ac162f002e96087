//! Aggregate roots persisted by the core.
//!
//! # Responsibility
//! - Define the identity/audit contract every persisted record satisfies.
//! - Define address, person, user, blog and guest book aggregates.
//!
//! # Invariants
//! - Aggregates reference each other by foreign-key id, never by embedded
//!   object.
//! - Persisted state is derived from id presence only.

pub mod address;
pub mod blog;
pub mod guest_book;
pub mod person;
pub mod persistent;
pub mod user;
pub mod validation;
