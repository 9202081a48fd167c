//! Generic GEDCOM event sub-records and first-match selection.
//!
//! # Responsibility
//! - Model `BIRT`/`DEAT`/`MARR`/`DIV` sub-records as one tagged shape.
//! - Select the event an import phase asks for.
//!
//! # Invariants
//! - Selection returns the first match in file order; later duplicates
//!   (e.g. conflicting sources) are ignored.

use serde::{Deserialize, Serialize};

/// Event category discriminator for individual and family records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Birth,
    Death,
    Marriage,
    Divorce,
}

/// One nested event sub-record with its optional date/place payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    /// Raw `DATE` line value, not yet normalized.
    pub date: Option<String>,
    pub place: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            date: None,
            place: None,
        }
    }
}

/// Returns the first event of the requested kind, in file order.
///
/// GEDCOM permits repeated events per record; this deliberately keeps
/// the first occurrence and discards the rest.
pub fn first_event(events: &[Event], kind: EventKind) -> Option<&Event> {
    events.iter().find(|event| event.kind == kind)
}
