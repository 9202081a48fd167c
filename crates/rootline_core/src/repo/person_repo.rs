//! Person repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist person rows created during Phase 1.
//! - Apply parent linkage resolved during Phase 2.
//!
//! # Invariants
//! - `set_parents` only ever writes ids resolved from the same import
//!   run; callers must not pass ids from another tenant.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::person::{Person, PersonId, Sex};
use crate::model::team::TeamId;
use crate::repo::team_repo::parse_uuid;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const PERSON_SELECT_SQL: &str = "SELECT
    uuid,
    team_uuid,
    firstname,
    surname,
    nickname,
    sex,
    birth_date,
    birth_year,
    birth_place,
    death_date,
    death_year,
    death_place,
    father_uuid,
    mother_uuid
FROM persons";

/// Repository interface for person rows.
pub trait PersonRepository {
    /// Creates one person row and returns its stable id.
    fn create_person(&self, person: &Person) -> RepoResult<PersonId>;
    /// Sets the parent references of one person. `None` sides are
    /// written as NULL.
    fn set_parents(
        &self,
        id: PersonId,
        father: Option<PersonId>,
        mother: Option<PersonId>,
    ) -> RepoResult<()>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Lists all persons of one team, in creation order.
    fn list_for_team(&self, team: TeamId) -> RepoResult<Vec<Person>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &Person) -> RepoResult<PersonId> {
        self.conn.execute(
            "INSERT INTO persons (
                uuid,
                team_uuid,
                firstname,
                surname,
                nickname,
                sex,
                birth_date,
                birth_year,
                birth_place,
                death_date,
                death_year,
                death_place,
                father_uuid,
                mother_uuid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                person.uuid.to_string(),
                person.team.to_string(),
                person.firstname.as_deref(),
                person.surname.as_deref(),
                person.nickname.as_deref(),
                person.sex.map(Sex::as_code),
                person.birth_date.map(date_to_db),
                person.birth_year,
                person.birth_place.as_deref(),
                person.death_date.map(date_to_db),
                person.death_year,
                person.death_place.as_deref(),
                person.father.map(|id| id.to_string()),
                person.mother.map(|id| id.to_string()),
            ],
        )?;

        Ok(person.uuid)
    }

    fn set_parents(
        &self,
        id: PersonId,
        father: Option<PersonId>,
        mother: Option<PersonId>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE persons SET father_uuid = ?1, mother_uuid = ?2 WHERE uuid = ?3;",
            params![
                father.map(|id| id.to_string()),
                mother.map(|id| id.to_string()),
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }

    fn list_for_team(&self, team: TeamId) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PERSON_SELECT_SQL} WHERE team_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![team.to_string()])?;
        let mut persons = Vec::new();
        while let Some(row) = rows.next()? {
            persons.push(parse_person_row(row)?);
        }
        Ok(persons)
    }
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let sex = match row.get::<_, Option<String>>("sex")? {
        Some(code) => Some(Sex::from_code(&code).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid sex code `{code}` in persons.sex"))
        })?),
        None => None,
    };

    Ok(Person {
        uuid: parse_uuid(row.get::<_, String>("uuid")?, "persons.uuid")?,
        team: parse_uuid(row.get::<_, String>("team_uuid")?, "persons.team_uuid")?,
        firstname: row.get("firstname")?,
        surname: row.get("surname")?,
        nickname: row.get("nickname")?,
        sex,
        birth_date: parse_opt_date(row.get("birth_date")?, "persons.birth_date")?,
        birth_year: row.get("birth_year")?,
        birth_place: row.get("birth_place")?,
        death_date: parse_opt_date(row.get("death_date")?, "persons.death_date")?,
        death_year: row.get("death_year")?,
        death_place: row.get("death_place")?,
        father: parse_opt_uuid(row.get("father_uuid")?, "persons.father_uuid")?,
        mother: parse_opt_uuid(row.get("mother_uuid")?, "persons.mother_uuid")?,
    })
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_opt_date(
    text: Option<String>,
    column: &str,
) -> RepoResult<Option<NaiveDate>> {
    match text {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                RepoError::InvalidData(format!("invalid date value `{text}` in {column}"))
            }),
        None => Ok(None),
    }
}

pub(crate) fn parse_opt_uuid(
    text: Option<String>,
    column: &str,
) -> RepoResult<Option<PersonId>> {
    match text {
        Some(text) => parse_uuid(text, column).map(Some),
        None => Ok(None),
    }
}
