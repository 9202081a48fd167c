//! Phase 1: individual records to person rows.
//!
//! # Responsibility
//! - Extract name, sex, birth and death from each `INDI` record.
//! - Create one person row per individual and fill the source-id map.
//!
//! # Invariants
//! - The map is write-once per source id; a duplicate id is a
//!   per-record error, not a second row.
//! - A failing record is logged, counted and skipped; it never aborts
//!   the run.
//! - No couple or parent linkage happens in this phase.

use log::warn;

use crate::gedcom::date::normalize_date;
use crate::gedcom::event::{first_event, EventKind};
use crate::gedcom::parser::{Individual, RawName};
use crate::model::person::{Person, Sex};
use crate::model::team::TeamId;
use crate::repo::person_repo::PersonRepository;
use crate::service::import_service::ImportSession;

/// Imports every individual in document order.
pub(crate) fn run<R: PersonRepository>(
    repo: &R,
    session: &mut ImportSession,
    team: TeamId,
    individuals: &[Individual],
) {
    for individual in individuals {
        if session.id_map.contains_key(&individual.source_id) {
            warn!(
                "event=individual_import module=import status=error source_id={} reason=duplicate_source_id",
                individual.source_id
            );
            session.stats.errors += 1;
            continue;
        }

        let person = build_person(team, individual);
        match repo.create_person(&person) {
            Ok(person_id) => {
                session.id_map.insert(individual.source_id.clone(), person_id);
                session.stats.individuals += 1;
            }
            Err(err) => {
                warn!(
                    "event=individual_import module=import status=error source_id={} error={}",
                    individual.source_id, err
                );
                session.stats.errors += 1;
            }
        }
    }
}

fn build_person(team: TeamId, individual: &Individual) -> Person {
    let mut person = Person::new(team);

    let (firstname, surname, nickname) = extract_name(&individual.name);
    person.firstname = firstname;
    person.surname = surname;
    person.nickname = nickname;
    person.sex = Sex::from_gedcom(individual.sex.as_deref());

    if let Some(birth) = first_event(&individual.events, EventKind::Birth) {
        let normalized = normalize_date(birth.date.as_deref());
        person.birth_date = normalized.date;
        person.birth_year = normalized.year;
        person.birth_place = birth.place.clone();
    }
    if let Some(death) = first_event(&individual.events, EventKind::Death) {
        let normalized = normalize_date(death.date.as_deref());
        person.death_date = normalized.date;
        person.death_year = normalized.year;
        person.death_place = death.place.clone();
    }

    person
}

/// Extracts `(firstname, surname, nickname)` from a raw name.
///
/// Structured `GIVN`/`SURN`/`NICK` sub-fields win per field; missing
/// fields fall back to splitting the legacy `Given /Surname/ [nick]`
/// form of the concatenated `NAME` value.
fn extract_name(raw: &RawName) -> (Option<String>, Option<String>, Option<String>) {
    let (split_given, split_surname, split_nick) = raw
        .value
        .as_deref()
        .map(split_legacy_name)
        .unwrap_or((None, None, None));

    (
        clean_field(raw.given.clone()).or(split_given),
        clean_field(raw.surname.clone()).or(split_surname),
        clean_field(raw.nickname.clone()).or(split_nick),
    )
}

/// Splits `John Doe /Smith/ "Johnny"`: text before the first slash is
/// the given name, text between the slashes the surname, a trailing
/// remainder (quotes stripped) the nickname.
fn split_legacy_name(value: &str) -> (Option<String>, Option<String>, Option<String>) {
    let Some(open) = value.find('/') else {
        return (clean_field(Some(value.to_string())), None, None);
    };

    let given = clean_field(Some(value[..open].to_string()));
    let rest = &value[open + 1..];
    let Some(close) = rest.find('/') else {
        return (given, clean_field(Some(rest.to_string())), None);
    };

    let surname = clean_field(Some(rest[..close].to_string()));
    let nickname = clean_field(Some(
        rest[close + 1..].trim().trim_matches(['"', '\'']).to_string(),
    ));
    (given, surname, nickname)
}

fn clean_field(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{extract_name, split_legacy_name};
    use crate::gedcom::parser::RawName;

    #[test]
    fn legacy_name_splits_given_and_surname() {
        let (given, surname, nickname) = split_legacy_name("John Doe /Smith/");
        assert_eq!(given.as_deref(), Some("John Doe"));
        assert_eq!(surname.as_deref(), Some("Smith"));
        assert_eq!(nickname, None);
    }

    #[test]
    fn legacy_name_keeps_trailing_nickname() {
        let (given, surname, nickname) = split_legacy_name("John /Smith/ \"Johnny\"");
        assert_eq!(given.as_deref(), Some("John"));
        assert_eq!(surname.as_deref(), Some("Smith"));
        assert_eq!(nickname.as_deref(), Some("Johnny"));
    }

    #[test]
    fn legacy_name_without_slashes_is_all_given() {
        let (given, surname, nickname) = split_legacy_name("Madonna");
        assert_eq!(given.as_deref(), Some("Madonna"));
        assert_eq!(surname, None);
        assert_eq!(nickname, None);
    }

    #[test]
    fn structured_fields_win_over_legacy_split() {
        let raw = RawName {
            value: Some("Wrong /Name/".to_string()),
            given: Some("Right".to_string()),
            surname: Some("Proper".to_string()),
            nickname: None,
        };
        let (given, surname, nickname) = extract_name(&raw);
        assert_eq!(given.as_deref(), Some("Right"));
        assert_eq!(surname.as_deref(), Some("Proper"));
        assert_eq!(nickname, None);
    }

    #[test]
    fn missing_structured_fields_fall_back_per_field() {
        let raw = RawName {
            value: Some("John /Smith/".to_string()),
            given: None,
            surname: Some("Smythe".to_string()),
            nickname: None,
        };
        let (given, surname, _) = extract_name(&raw);
        assert_eq!(given.as_deref(), Some("John"));
        assert_eq!(surname.as_deref(), Some("Smythe"));
    }
}
