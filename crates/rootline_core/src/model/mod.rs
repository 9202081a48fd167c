//! Persisted domain model for imported genealogy records.
//!
//! # Responsibility
//! - Define the canonical row shapes produced by one import run.
//! - Keep tenant scoping explicit on every persisted record.
//!
//! # Invariants
//! - Every persisted object is identified by a stable UUID.
//! - Every person/couple row carries the `TeamId` of exactly one tenant.

pub mod couple;
pub mod person;
pub mod team;
