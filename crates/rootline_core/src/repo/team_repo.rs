//! Team repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Create and read tenant workspace rows.
//!
//! # Invariants
//! - A team row is only ever created inside an import transaction.

use crate::model::team::{Team, TeamId};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for tenant workspaces.
pub trait TeamRepository {
    /// Creates one team row and returns its stable id.
    fn create_team(&self, team: &Team) -> RepoResult<TeamId>;
    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>>;
}

/// SQLite-backed team repository.
pub struct SqliteTeamRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeamRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TeamRepository for SqliteTeamRepository<'_> {
    fn create_team(&self, team: &Team) -> RepoResult<TeamId> {
        self.conn.execute(
            "INSERT INTO teams (uuid, name, description, owner_uuid)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                team.uuid.to_string(),
                team.name.as_str(),
                team.description.as_deref(),
                team.owner.to_string(),
            ],
        )?;

        Ok(team.uuid)
    }

    fn get_team(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, name, description, owner_uuid FROM teams WHERE uuid = ?1;",
        )?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_team_row(row)?));
        }
        Ok(None)
    }
}

fn parse_team_row(row: &Row<'_>) -> RepoResult<Team> {
    Ok(Team {
        uuid: parse_uuid(row.get::<_, String>("uuid")?, "teams.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        owner: parse_uuid(row.get::<_, String>("owner_uuid")?, "teams.owner_uuid")?,
    })
}

pub(crate) fn parse_uuid(text: String, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(&text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{text}` in {column}")))
}
