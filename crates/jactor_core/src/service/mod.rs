//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Route every write through [`persistence_handler::PersistenceHandler`].
//!
//! # Invariants
//! - Services never bypass repository validation or the stamp/upsert
//!   pipeline.
//! - Services are generic over repository traits and stay storage-agnostic.

pub mod address_service;
pub mod blog_service;
pub mod guest_book_service;
pub mod person_service;
pub mod persistence_handler;
pub mod user_service;
