//! Person domain model.
//!
//! # Responsibility
//! - Define the persisted shape of one imported individual.
//! - Provide the sex-code mapping used by the import pipeline.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another person.
//! - `team` is immutable after creation.
//! - `father`/`mother` only ever reference persons of the same team.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::team::TeamId;

/// Stable identifier for a persisted person row.
pub type PersonId = Uuid;

/// Biological sex as recorded in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    /// Recorded as unknown in the source (`U` code).
    #[serde(rename = "X")]
    Other,
}

impl Sex {
    /// Maps a raw GEDCOM `SEX` code.
    ///
    /// `M`/`F`/`U` are the only defined inputs; any other code is
    /// treated as absent, which is a documented fallback rather than
    /// an error.
    pub fn from_gedcom(code: Option<&str>) -> Option<Self> {
        match code.map(str::trim) {
            Some("M") => Some(Self::Male),
            Some("F") => Some(Self::Female),
            Some("U") => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "X",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            "X" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Persisted record for one individual, scoped to its owning team.
///
/// Date fields keep the year separately from the exact date because
/// many source records carry only a year, and display code renders the
/// year even when no exact date exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable global ID used for parent linkage and couple rows.
    pub uuid: PersonId,
    /// Owning tenant. Immutable after creation.
    pub team: TeamId,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub nickname: Option<String>,
    pub sex: Option<Sex>,
    pub birth_date: Option<NaiveDate>,
    pub birth_year: Option<i32>,
    pub birth_place: Option<String>,
    pub death_date: Option<NaiveDate>,
    pub death_year: Option<i32>,
    pub death_place: Option<String>,
    /// Weak reference to another person row in the same team.
    pub father: Option<PersonId>,
    /// Weak reference to another person row in the same team.
    pub mother: Option<PersonId>,
}

impl Person {
    /// Creates an empty person shell for the given team.
    ///
    /// All extracted fields start as `None`; the import pipeline fills
    /// in whatever the source record provides.
    pub fn new(team: TeamId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            team,
            firstname: None,
            surname: None,
            nickname: None,
            sex: None,
            birth_date: None,
            birth_year: None,
            birth_place: None,
            death_date: None,
            death_year: None,
            death_place: None,
            father: None,
            mother: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Sex;

    #[test]
    fn sex_maps_defined_codes() {
        assert_eq!(Sex::from_gedcom(Some("M")), Some(Sex::Male));
        assert_eq!(Sex::from_gedcom(Some("F")), Some(Sex::Female));
        assert_eq!(Sex::from_gedcom(Some("U")), Some(Sex::Other));
    }

    #[test]
    fn sex_treats_unknown_codes_as_absent() {
        assert_eq!(Sex::from_gedcom(Some("Q")), None);
        assert_eq!(Sex::from_gedcom(Some("male")), None);
        assert_eq!(Sex::from_gedcom(None), None);
    }
}
