//! Import use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, parsing and the two import phases into
//!   one transactional run.
//! - Keep callers decoupled from parser and storage details.

mod family_import;
mod individual_import;

pub mod import_service;
