//! Import orchestration: one GEDCOM file to one committed tenant.
//!
//! # Responsibility
//! - Sequence validation, parsing, tenant creation and the two import
//!   phases inside a single transaction.
//! - Produce the final report and audit trail of one run.
//!
//! # Invariants
//! - The transaction spans tenant creation through commit; a failure
//!   after tenant creation rolls everything back, so either the whole
//!   record set becomes visible or nothing does.
//! - Per-record problems only increment `stats.errors`; fatal errors
//!   never return a partial report.
//!
//! # See also
//! - crate::service::individual_import
//! - crate::service::family_import

use log::info;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;
use std::time::Instant;

use crate::audit::{AuditContext, AuditSink, LogAuditSink};
use crate::db::DbError;
use crate::gedcom::parser::{self, GedcomDocument, ParseError};
use crate::gedcom::security::{self, GedcomSource, SecurityViolation};
use crate::model::person::PersonId;
use crate::model::team::{Team, UserId};
use crate::repo::couple_repo::SqliteCoupleRepository;
use crate::repo::person_repo::SqlitePersonRepository;
use crate::repo::team_repo::{SqliteTeamRepository, TeamRepository};
use crate::repo::RepoError;
use crate::service::{family_import, individual_import};

/// Fatal import failure. Any of these aborts the whole run; rows
/// created before the failure are rolled back.
#[derive(Debug)]
pub enum ImportError {
    Io(io::Error),
    Security(SecurityViolation),
    Parse(ParseError),
    Repo(RepoError),
    Db(DbError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "could not read import source: {err}"),
            Self::Security(err) => write!(f, "import rejected: {err}"),
            Self::Parse(err) => write!(f, "import failed: {err}"),
            Self::Repo(err) => write!(f, "import failed: {err}"),
            Self::Db(err) => write!(f, "import failed: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Security(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<io::Error> for ImportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SecurityViolation> for ImportError {
    fn from(value: SecurityViolation) -> Self {
        Self::Security(value)
    }
}

impl From<ParseError> for ImportError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Caller-supplied parameters of one import request.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub team_name: String,
    pub team_description: Option<String>,
    /// Declared upload filename, used for audit attribution only.
    pub source_filename: String,
    /// Authenticated caller owning the new tenant.
    pub initiating_user: UserId,
}

/// Aggregate counters of one run.
///
/// A nonzero `errors` count means "import succeeded but review
/// recommended", not failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    /// Person rows created.
    pub individuals: u32,
    /// Couple rows created.
    pub families: u32,
    /// Recoverable per-record problems, logged and skipped.
    pub errors: u32,
}

/// Terminal result of one committed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub team: Team,
    pub stats: ImportStats,
}

/// Pipeline stage of one run. `Failed` is reachable from every state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    Validating,
    Parsing,
    CreatingTenant,
    ImportingIndividuals,
    ImportingFamilies,
    Committed,
    Failed,
}

impl ImportState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Parsing => "parsing",
            Self::CreatingTenant => "creating_tenant",
            Self::ImportingIndividuals => "importing_individuals",
            Self::ImportingFamilies => "importing_families",
            Self::Committed => "committed",
            Self::Failed => "failed",
        }
    }
}

/// Transient per-run state shared by the two import phases.
///
/// The source-id map is populated only during Phase 1 and read-only
/// during Phase 2; it never lives past the run.
pub(crate) struct ImportSession {
    /// Write-once map from source pointer ids to created person rows.
    pub(crate) id_map: HashMap<String, PersonId>,
    pub(crate) stats: ImportStats,
}

impl ImportSession {
    fn new() -> Self {
        Self {
            id_map: HashMap::new(),
            stats: ImportStats::default(),
        }
    }
}

/// Runs one import with the default log-backed audit sink, reading the
/// source from disk.
pub fn import_file(
    conn: &mut Connection,
    path: impl AsRef<Path>,
    request: ImportRequest,
) -> Result<ImportReport, ImportError> {
    let source = GedcomSource::from_path(path)?;
    import_source(conn, &source, request, &LogAuditSink)
}

/// Runs one import end to end.
///
/// Validation and parsing happen before any persistence; the
/// transaction opens at tenant creation and commits only after both
/// phases finished. On error nothing is visible.
pub fn import_source(
    conn: &mut Connection,
    source: &GedcomSource,
    request: ImportRequest,
    audit: &dyn AuditSink,
) -> Result<ImportReport, ImportError> {
    let started_at = Instant::now();
    let mut state = ImportState::Validating;

    let result = run_import(conn, source, &request, audit, &mut state);
    match &result {
        Ok(report) => {
            info!(
                "event=import module=import status=ok team={} individuals={} families={} errors={} duration_ms={}",
                report.team.uuid,
                report.stats.individuals,
                report.stats.families,
                report.stats.errors,
                started_at.elapsed().as_millis()
            );
        }
        Err(err) => {
            state = ImportState::Failed;
            audit.record(
                "import_failed",
                &AuditContext::new()
                    .with("filename", &request.source_filename)
                    .with("reason", err),
            );
            info!(
                "event=import module=import status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
        }
    }
    debug_assert!(matches!(
        state,
        ImportState::Committed | ImportState::Failed
    ));

    result
}

fn run_import(
    conn: &mut Connection,
    source: &GedcomSource,
    request: &ImportRequest,
    audit: &dyn AuditSink,
    state: &mut ImportState,
) -> Result<ImportReport, ImportError> {
    transition(state, ImportState::Validating, audit, request);
    security::validate(source)?;
    audit.record(
        "security_pass",
        &AuditContext::new()
            .with("filename", source.filename())
            .with("size_bytes", source.byte_len()),
    );

    transition(state, ImportState::Parsing, audit, request);
    let document = parser::parse(source.text())?;

    let tx = conn.transaction()?;
    let mut session = ImportSession::new();
    // Malformed lines the parser skipped count toward the review
    // total.
    session.stats.errors = document.warnings;

    transition(state, ImportState::CreatingTenant, audit, request);
    let team = Team::new(
        request.team_name.clone(),
        request.team_description.clone(),
        request.initiating_user,
    );
    SqliteTeamRepository::new(&tx).create_team(&team)?;

    run_phases(&tx, &mut session, &team, &document, audit, state, request);

    tx.commit()?;
    transition(state, ImportState::Committed, audit, request);
    audit.record(
        "import_committed",
        &AuditContext::new()
            .with("team", team.uuid)
            .with("individuals", session.stats.individuals)
            .with("families", session.stats.families)
            .with("errors", session.stats.errors),
    );

    Ok(ImportReport {
        team,
        stats: session.stats,
    })
}

fn run_phases(
    tx: &rusqlite::Transaction<'_>,
    session: &mut ImportSession,
    team: &Team,
    document: &GedcomDocument,
    audit: &dyn AuditSink,
    state: &mut ImportState,
    request: &ImportRequest,
) {
    let person_repo = SqlitePersonRepository::new(tx);
    let couple_repo = SqliteCoupleRepository::new(tx);

    transition(state, ImportState::ImportingIndividuals, audit, request);
    individual_import::run(&person_repo, session, team.uuid, &document.individuals);

    // Phase 2 must only start once the map covers every individual
    // that imported; this sequencing is what makes the result
    // independent of record order in the source file.
    transition(state, ImportState::ImportingFamilies, audit, request);
    family_import::run(
        &person_repo,
        &couple_repo,
        session,
        team.uuid,
        &document.families,
    );
}

fn transition(
    state: &mut ImportState,
    next: ImportState,
    audit: &dyn AuditSink,
    request: &ImportRequest,
) {
    *state = next;
    audit.record(
        "import_state",
        &AuditContext::new()
            .with("state", next.name())
            .with("filename", &request.source_filename),
    );
}
