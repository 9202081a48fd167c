//! Phase 2: family records to couple rows and parent linkage.
//!
//! # Responsibility
//! - Resolve spouse/child source ids through the completed Phase 1
//!   map.
//! - Create one couple row per resolvable family and set child
//!   father/mother references.
//!
//! # Invariants
//! - Runs strictly after Phase 1; the map is read-only here, which
//!   makes the result independent of record order in the source file.
//! - A couple is only created when at least one spouse resolved; the
//!   unresolved side stays NULL (single-parent families).
//! - Parent references are only ever set to ids present in the map.

use log::warn;

use crate::gedcom::date::normalize_date;
use crate::gedcom::event::{first_event, EventKind};
use crate::gedcom::parser::Family;
use crate::model::couple::Couple;
use crate::model::person::PersonId;
use crate::model::team::TeamId;
use crate::repo::couple_repo::CoupleRepository;
use crate::repo::person_repo::PersonRepository;
use crate::service::import_service::ImportSession;

/// Imports every family in document order.
pub(crate) fn run<P: PersonRepository, C: CoupleRepository>(
    persons: &P,
    couples: &C,
    session: &mut ImportSession,
    team: TeamId,
    families: &[Family],
) {
    for family in families {
        let husband = resolve_spouse(session, family.husband.as_deref());
        let wife = resolve_spouse(session, family.wife.as_deref());

        if husband.is_none() && wife.is_none() {
            warn!(
                "event=family_import module=import status=error source_id={} reason=no_resolvable_spouse",
                family.source_id
            );
            session.stats.errors += 1;
            continue;
        }

        let mut couple = Couple::new(team, husband, wife);
        if let Some(marriage) = first_event(&family.events, EventKind::Marriage) {
            let normalized = normalize_date(marriage.date.as_deref());
            couple.marriage_date = normalized.date;
            couple.marriage_year = normalized.year;
        }
        if let Some(divorce) = first_event(&family.events, EventKind::Divorce) {
            couple.divorced = true;
            couple.divorce_date = normalize_date(divorce.date.as_deref()).date;
        }

        match couples.create_couple(&couple) {
            Ok(_) => session.stats.families += 1,
            Err(err) => {
                warn!(
                    "event=family_import module=import status=error source_id={} error={}",
                    family.source_id, err
                );
                session.stats.errors += 1;
                continue;
            }
        }

        link_children(persons, session, family, husband, wife);
    }
}

fn resolve_spouse(session: &ImportSession, pointer: Option<&str>) -> Option<PersonId> {
    session.id_map.get(pointer?).copied()
}

fn link_children<P: PersonRepository>(
    persons: &P,
    session: &mut ImportSession,
    family: &Family,
    father: Option<PersonId>,
    mother: Option<PersonId>,
) {
    for child_pointer in &family.children {
        let Some(child_id) = session.id_map.get(child_pointer).copied() else {
            warn!(
                "event=family_import module=import status=warn source_id={} child={} reason=child_never_imported",
                family.source_id, child_pointer
            );
            session.stats.errors += 1;
            continue;
        };

        if let Err(err) = persons.set_parents(child_id, father, mother) {
            warn!(
                "event=family_import module=import status=error source_id={} child={} error={}",
                family.source_id, child_pointer, err
            );
            session.stats.errors += 1;
        }
    }
}
