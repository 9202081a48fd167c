//! Couple domain model.
//!
//! # Responsibility
//! - Define the persisted shape of one imported family union.
//!
//! # Invariants
//! - At least one of `person1`/`person2` is set; the other side may be
//!   `None` for single-parent families.
//! - Both sides, when set, reference persons of the same team.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::person::PersonId;
use crate::model::team::TeamId;

/// Stable identifier for a persisted couple row.
pub type CoupleId = Uuid;

/// Persisted record for one family union, scoped to its owning team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Couple {
    pub uuid: CoupleId,
    /// Owning tenant. Immutable after creation.
    pub team: TeamId,
    /// Husband side of the source record, when it resolved.
    pub person1: Option<PersonId>,
    /// Wife side of the source record, when it resolved.
    pub person2: Option<PersonId>,
    pub marriage_date: Option<NaiveDate>,
    pub marriage_year: Option<i32>,
    pub divorced: bool,
    pub divorce_date: Option<NaiveDate>,
}

impl Couple {
    /// Creates a couple shell for the given team and resolved spouses.
    pub fn new(team: TeamId, person1: Option<PersonId>, person2: Option<PersonId>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            team,
            person1,
            person2,
            marriage_date: None,
            marriage_year: None,
            divorced: false,
            divorce_date: None,
        }
    }
}
