//! Team (tenant) domain model.
//!
//! # Responsibility
//! - Define the isolated workspace created to hold one import's records.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another team.
//! - A team row is only visible once the import that created it committed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a tenant workspace.
pub type TeamId = Uuid;

/// Opaque reference to the authenticated caller that owns a team.
///
/// Only used for ownership/audit attribution; the engine never
/// dereferences it.
pub type UserId = Uuid;

/// Isolated workspace holding the persons and couples of one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable global ID referenced by every row the import creates.
    pub uuid: TeamId,
    pub name: String,
    pub description: Option<String>,
    /// Owning user, attributed at creation and never changed.
    pub owner: UserId,
}

impl Team {
    /// Creates a new team with a generated stable ID.
    pub fn new(name: impl Into<String>, description: Option<String>, owner: UserId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            description,
            owner,
        }
    }
}
