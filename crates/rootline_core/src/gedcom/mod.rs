//! GEDCOM 5.5 import subsystem: validation, parsing and normalization.
//!
//! # Responsibility
//! - Gatekeep externally-authored files before any parsing happens.
//! - Turn validated text into a structural document model.
//! - Provide the pure normalization helpers used by the import phases.
//!
//! # Invariants
//! - Nothing in this module touches persistence; semantic extraction
//!   feeds the service layer, which owns all row creation.

pub mod date;
pub mod event;
pub mod parser;
pub mod security;

pub use date::{normalize_date, DatePrecision, NormalizedDate};
pub use event::{first_event, Event, EventKind};
pub use parser::{parse, Family, GedcomDocument, Individual, ParseError, RawName};
pub use security::{validate, GedcomSource, SecurityViolation};
