//! Couple repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist couple rows created during Phase 2.
//!
//! # Invariants
//! - At least one spouse column is non-NULL (schema CHECK mirrors the
//!   Phase 2 resolution rule).

use crate::model::couple::{Couple, CoupleId};
use crate::model::team::TeamId;
use crate::repo::person_repo::{date_to_db, parse_opt_date, parse_opt_uuid};
use crate::repo::team_repo::parse_uuid;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const COUPLE_SELECT_SQL: &str = "SELECT
    uuid,
    team_uuid,
    person1_uuid,
    person2_uuid,
    marriage_date,
    marriage_year,
    divorced,
    divorce_date
FROM couples";

/// Repository interface for couple rows.
pub trait CoupleRepository {
    /// Creates one couple row and returns its stable id.
    fn create_couple(&self, couple: &Couple) -> RepoResult<CoupleId>;
    /// Lists all couples of one team, in creation order.
    fn list_for_team(&self, team: TeamId) -> RepoResult<Vec<Couple>>;
}

/// SQLite-backed couple repository.
pub struct SqliteCoupleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCoupleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CoupleRepository for SqliteCoupleRepository<'_> {
    fn create_couple(&self, couple: &Couple) -> RepoResult<CoupleId> {
        self.conn.execute(
            "INSERT INTO couples (
                uuid,
                team_uuid,
                person1_uuid,
                person2_uuid,
                marriage_date,
                marriage_year,
                divorced,
                divorce_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                couple.uuid.to_string(),
                couple.team.to_string(),
                couple.person1.map(|id| id.to_string()),
                couple.person2.map(|id| id.to_string()),
                couple.marriage_date.map(date_to_db),
                couple.marriage_year,
                i64::from(couple.divorced),
                couple.divorce_date.map(date_to_db),
            ],
        )?;

        Ok(couple.uuid)
    }

    fn list_for_team(&self, team: TeamId) -> RepoResult<Vec<Couple>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COUPLE_SELECT_SQL} WHERE team_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![team.to_string()])?;
        let mut couples = Vec::new();
        while let Some(row) = rows.next()? {
            couples.push(parse_couple_row(row)?);
        }
        Ok(couples)
    }
}

fn parse_couple_row(row: &Row<'_>) -> RepoResult<Couple> {
    let divorced = match row.get::<_, i64>("divorced")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid divorced value `{other}` in couples.divorced"
            )));
        }
    };

    Ok(Couple {
        uuid: parse_uuid(row.get::<_, String>("uuid")?, "couples.uuid")?,
        team: parse_uuid(row.get::<_, String>("team_uuid")?, "couples.team_uuid")?,
        person1: parse_opt_uuid(row.get("person1_uuid")?, "couples.person1_uuid")?,
        person2: parse_opt_uuid(row.get("person2_uuid")?, "couples.person2_uuid")?,
        marriage_date: parse_opt_date(row.get("marriage_date")?, "couples.marriage_date")?,
        marriage_year: row.get("marriage_year")?,
        divorced,
        divorce_date: parse_opt_date(row.get("divorce_date")?, "couples.divorce_date")?,
    })
}
