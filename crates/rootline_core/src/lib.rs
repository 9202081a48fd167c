//! Core import engine for Rootline.
//! This crate is the single source of truth for GEDCOM import invariants.

pub mod audit;
pub mod db;
pub mod gedcom;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use audit::{AuditContext, AuditSink, LogAuditSink};
pub use gedcom::{
    first_event, normalize_date, parse, validate, DatePrecision, Event, EventKind, Family,
    GedcomDocument, GedcomSource, Individual, NormalizedDate, ParseError, SecurityViolation,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::couple::{Couple, CoupleId};
pub use model::person::{Person, PersonId, Sex};
pub use model::team::{Team, TeamId, UserId};
pub use repo::couple_repo::{CoupleRepository, SqliteCoupleRepository};
pub use repo::person_repo::{PersonRepository, SqlitePersonRepository};
pub use repo::team_repo::{SqliteTeamRepository, TeamRepository};
pub use repo::{RepoError, RepoResult};
pub use service::import_service::{
    import_file, import_source, ImportError, ImportReport, ImportRequest, ImportState, ImportStats,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
