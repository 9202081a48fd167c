//! GEDCOM 5.5 tokenizer and structural record builder.
//!
//! # Responsibility
//! - Reconstruct record hierarchy purely from per-line level integers.
//! - Collect `INDI`/`FAM` records with their name/event sub-records.
//!
//! # Invariants
//! - No semantic interpretation happens here; raw strings are captured
//!   verbatim for the import phases to normalize.
//! - Malformed lines are skipped with a warning and counted, never
//!   escalated; only empty input is fatal.
//!
//! # See also
//! - crate::gedcom::date
//! - crate::gedcom::event

use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::gedcom::event::{Event, EventKind};

/// Structural parse failure. Per-line problems are warnings; only an
/// input without a single usable line aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    EmptyInput,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "input contains no GEDCOM lines"),
        }
    }
}

impl Error for ParseError {}

/// Raw name payload of one `NAME` line and its structured sub-fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawName {
    /// Concatenated legacy form, e.g. `John Doe /Smith/`.
    pub value: Option<String>,
    pub given: Option<String>,
    pub surname: Option<String>,
    pub nickname: Option<String>,
}

/// One `INDI` record as found in the source, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    /// Source pointer id, bracket form (`@I1@`).
    pub source_id: String,
    pub name: RawName,
    /// Raw `SEX` line value.
    pub sex: Option<String>,
    /// Birth/death events in file order.
    pub events: Vec<Event>,
}

/// One `FAM` record as found in the source, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    /// Source pointer id, bracket form (`@F1@`).
    pub source_id: String,
    /// `HUSB` pointer reference, unresolved.
    pub husband: Option<String>,
    /// `WIFE` pointer reference, unresolved.
    pub wife: Option<String>,
    /// `CHIL` pointer references in file order.
    pub children: Vec<String>,
    /// Marriage/divorce events in file order.
    pub events: Vec<Event>,
}

/// Immutable in-memory document for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GedcomDocument {
    /// Individuals in file order.
    pub individuals: Vec<Individual>,
    /// Families in file order.
    pub families: Vec<Family>,
    /// Count of malformed lines skipped during parsing.
    pub warnings: u32,
}

/// One tokenized GEDCOM line: `<level> [@id@] <tag> [value]`.
///
/// The pointer precedes the tag on record openers (`0 @I1@ INDI`) and
/// trails as the value on reference lines (`1 HUSB @I1@`).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    level: u32,
    pointer: Option<String>,
    tag: String,
    value: Option<String>,
}

fn tokenize(raw: &str) -> Option<Line> {
    let mut parts = raw.trim().splitn(2, ' ');
    let level: u32 = parts.next()?.parse().ok()?;
    let rest = parts.next()?.trim_start();

    let mut tokens = rest.splitn(2, ' ');
    let first = tokens.next()?;
    let remainder = tokens.next().map(|value| value.trim().to_string());

    if first.len() >= 3 && first.starts_with('@') && first.ends_with('@') {
        let tag = remainder?;
        let mut tag_parts = tag.splitn(2, ' ');
        let tag_name = tag_parts.next()?.to_string();
        let value = tag_parts
            .next()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        return Some(Line {
            level,
            pointer: Some(first.to_string()),
            tag: tag_name,
            value,
        });
    }

    Some(Line {
        level,
        pointer: None,
        tag: first.to_string(),
        value: remainder.filter(|value| !value.is_empty()),
    })
}

/// Open top-level record being assembled.
enum Record {
    None,
    Individual(Individual),
    Family(Family),
}

/// Open level-1 context that level-2 lines attach to.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SubContext {
    None,
    Name,
    Event,
}

/// Parses validated GEDCOM text into a structural document.
///
/// Hierarchy is reconstructed from level integers alone: a line's
/// sub-records are the immediately-following lines at level + 1, until
/// a line at the same or lower level closes the scope.
pub fn parse(text: &str) -> Result<GedcomDocument, ParseError> {
    let mut document = GedcomDocument::default();
    let mut record = Record::None;
    let mut sub = SubContext::None;
    let mut previous_level: u32 = 0;
    let mut saw_line = false;

    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }

        let Some(line) = tokenize(raw) else {
            warn!(
                "event=gedcom_parse module=gedcom status=warn line={} reason=unparseable_line",
                index + 1
            );
            document.warnings += 1;
            continue;
        };

        // A level can only grow one step at a time; a deeper jump means
        // the sub-record lost its parent.
        if saw_line && line.level > previous_level + 1 {
            warn!(
                "event=gedcom_parse module=gedcom status=warn line={} level={} reason=orphaned_subrecord",
                index + 1,
                line.level
            );
            document.warnings += 1;
            continue;
        }
        if !saw_line && line.level > 0 {
            warn!(
                "event=gedcom_parse module=gedcom status=warn line={} level={} reason=orphaned_subrecord",
                index + 1,
                line.level
            );
            document.warnings += 1;
            continue;
        }
        saw_line = true;
        previous_level = line.level;

        match line.level {
            0 => {
                close_record(&mut document, &mut record);
                sub = SubContext::None;
                record = open_record(&line);
            }
            1 => {
                sub = attach_level1(&mut record, &line);
            }
            2 => attach_level2(&mut record, sub, &line),
            // Deeper structure (e.g. source citations under DATE) is
            // outside the consumed subset.
            _ => {}
        }
    }

    if !saw_line {
        return Err(ParseError::EmptyInput);
    }

    close_record(&mut document, &mut record);
    Ok(document)
}

fn open_record(line: &Line) -> Record {
    match (line.tag.as_str(), &line.pointer) {
        ("INDI", Some(pointer)) => Record::Individual(Individual {
            source_id: pointer.clone(),
            name: RawName::default(),
            sex: None,
            events: Vec::new(),
        }),
        ("FAM", Some(pointer)) => Record::Family(Family {
            source_id: pointer.clone(),
            husband: None,
            wife: None,
            children: Vec::new(),
            events: Vec::new(),
        }),
        // HEAD, TRLR, submitter records etc. carry no imported data.
        _ => Record::None,
    }
}

fn close_record(document: &mut GedcomDocument, record: &mut Record) {
    match std::mem::replace(record, Record::None) {
        Record::Individual(individual) => document.individuals.push(individual),
        Record::Family(family) => document.families.push(family),
        Record::None => {}
    }
}

fn attach_level1(record: &mut Record, line: &Line) -> SubContext {
    match record {
        Record::Individual(individual) => match line.tag.as_str() {
            "NAME" => {
                // First NAME wins; repeated NAME lines are alternate
                // spellings outside the consumed subset.
                if individual.name.value.is_none() {
                    individual.name.value = line.value.clone();
                    return SubContext::Name;
                }
                SubContext::None
            }
            "SEX" => {
                individual.sex = line.value.clone();
                SubContext::None
            }
            "BIRT" => {
                individual.events.push(Event::new(EventKind::Birth));
                SubContext::Event
            }
            "DEAT" => {
                individual.events.push(Event::new(EventKind::Death));
                SubContext::Event
            }
            // Family membership is resolved from the FAM side.
            "FAMS" | "FAMC" => SubContext::None,
            _ => SubContext::None,
        },
        Record::Family(family) => match line.tag.as_str() {
            "HUSB" => {
                family.husband = line.value.clone();
                SubContext::None
            }
            "WIFE" => {
                family.wife = line.value.clone();
                SubContext::None
            }
            "CHIL" => {
                if let Some(value) = &line.value {
                    family.children.push(value.clone());
                }
                SubContext::None
            }
            "MARR" => {
                family.events.push(Event::new(EventKind::Marriage));
                SubContext::Event
            }
            "DIV" => {
                family.events.push(Event::new(EventKind::Divorce));
                SubContext::Event
            }
            _ => SubContext::None,
        },
        Record::None => SubContext::None,
    }
}

fn attach_level2(record: &mut Record, sub: SubContext, line: &Line) {
    match (record, sub) {
        (Record::Individual(individual), SubContext::Name) => match line.tag.as_str() {
            "GIVN" => individual.name.given = line.value.clone(),
            "SURN" => individual.name.surname = line.value.clone(),
            "NICK" => individual.name.nickname = line.value.clone(),
            _ => {}
        },
        (Record::Individual(individual), SubContext::Event) => {
            attach_event_payload(individual.events.last_mut(), line);
        }
        (Record::Family(family), SubContext::Event) => {
            attach_event_payload(family.events.last_mut(), line);
        }
        _ => {}
    }
}

fn attach_event_payload(event: Option<&mut Event>, line: &Line) {
    let Some(event) = event else {
        return;
    };
    match line.tag.as_str() {
        "DATE" => event.date = line.value.clone(),
        "PLAC" => event.place = line.value.clone(),
        _ => {}
    }
}
