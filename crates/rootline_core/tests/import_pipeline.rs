use std::cell::RefCell;

use rootline_core::db::open_db_in_memory;
use rootline_core::{
    import_source, AuditContext, AuditSink, CoupleRepository, GedcomSource, ImportRequest,
    LogAuditSink, Person, PersonRepository, Sex, SqliteCoupleRepository, SqlitePersonRepository,
    SqliteTeamRepository, TeamRepository, UserId,
};

const FULL_TREE: &str = "\
0 HEAD
1 SOUR rootline-test
1 GEDC
2 VERS 5.5
0 @I1@ INDI
1 NAME John Doe /Smith/
1 SEX M
1 BIRT
2 DATE 1 JAN 1960
2 PLAC Springfield
1 DEAT
2 DATE 2020
0 @I2@ INDI
1 NAME Mary /Jones/
2 GIVN Mary
2 SURN Jones
1 SEX F
1 BIRT
2 DATE JUN 1962
0 @I3@ INDI
1 NAME Sam /Smith/ \"Sammy\"
1 SEX U
1 BIRT
2 DATE ABT 1990
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
1 MARR
2 DATE 12 JUN 1985
0 TRLR
";

fn request(team_name: &str) -> ImportRequest {
    ImportRequest {
        team_name: team_name.to_string(),
        team_description: Some("imported tree".to_string()),
        source_filename: "tree.ged".to_string(),
        initiating_user: UserId::new_v4(),
    }
}

fn find_person<'a>(persons: &'a [Person], surname: &str, firstname: &str) -> &'a Person {
    persons
        .iter()
        .find(|person| {
            person.surname.as_deref() == Some(surname)
                && person.firstname.as_deref() == Some(firstname)
        })
        .unwrap_or_else(|| panic!("person {firstname} {surname} should exist"))
}

#[test]
fn full_tree_imports_all_rows_scoped_to_one_team() {
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(FULL_TREE, "tree.ged");

    let report = import_source(&mut conn, &source, request("Smith family"), &LogAuditSink).unwrap();
    assert_eq!(report.stats.individuals, 3);
    assert_eq!(report.stats.families, 1);
    assert_eq!(report.stats.errors, 0);

    let team = SqliteTeamRepository::new(&conn)
        .get_team(report.team.uuid)
        .unwrap()
        .expect("team row should exist");
    assert_eq!(team.name, "Smith family");
    assert_eq!(team.owner, report.team.owner);

    let persons = SqlitePersonRepository::new(&conn)
        .list_for_team(team.uuid)
        .unwrap();
    assert_eq!(persons.len(), 3);
    assert!(persons.iter().all(|person| person.team == team.uuid));

    let john = find_person(&persons, "Smith", "John Doe");
    assert_eq!(john.sex, Some(Sex::Male));
    assert_eq!(
        john.birth_date.map(|date| date.to_string()).as_deref(),
        Some("1960-01-01")
    );
    assert_eq!(john.birth_year, Some(1960));
    assert_eq!(john.birth_place.as_deref(), Some("Springfield"));
    assert_eq!(john.death_date, None);
    assert_eq!(john.death_year, Some(2020));

    let mary = find_person(&persons, "Jones", "Mary");
    assert_eq!(mary.sex, Some(Sex::Female));
    assert_eq!(
        mary.birth_date.map(|date| date.to_string()).as_deref(),
        Some("1962-06-01")
    );

    let sam = find_person(&persons, "Smith", "Sam");
    assert_eq!(sam.sex, Some(Sex::Other));
    assert_eq!(sam.nickname.as_deref(), Some("Sammy"));
    assert_eq!(sam.birth_date, None);
    assert_eq!(sam.birth_year, Some(1990));
    assert_eq!(sam.father, Some(john.uuid));
    assert_eq!(sam.mother, Some(mary.uuid));

    let couples = SqliteCoupleRepository::new(&conn)
        .list_for_team(team.uuid)
        .unwrap();
    assert_eq!(couples.len(), 1);
    let couple = &couples[0];
    assert_eq!(couple.team, team.uuid);
    assert_eq!(couple.person1, Some(john.uuid));
    assert_eq!(couple.person2, Some(mary.uuid));
    assert_eq!(
        couple.marriage_date.map(|date| date.to_string()).as_deref(),
        Some("1985-06-12")
    );
    assert_eq!(couple.marriage_year, Some(1985));
    assert!(!couple.divorced);
}

#[test]
fn divorce_event_sets_flag_and_date() {
    let text = "\
0 HEAD
1 SOUR rootline-test
0 @I1@ INDI
1 NAME A /One/
1 SEX M
0 @I2@ INDI
1 NAME B /Two/
1 SEX F
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 MARR
2 DATE 1 MAY 2000
1 DIV
2 DATE 3 APR 2010
0 TRLR
";
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(text, "divorce.ged");
    let report = import_source(&mut conn, &source, request("Divorced"), &LogAuditSink).unwrap();

    let couples = SqliteCoupleRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    assert_eq!(couples.len(), 1);
    assert!(couples[0].divorced);
    assert_eq!(
        couples[0]
            .divorce_date
            .map(|date| date.to_string())
            .as_deref(),
        Some("2010-04-03")
    );
}

#[test]
fn duplicate_source_id_is_counted_not_reimported() {
    let text = "\
0 HEAD
1 SOUR rootline-test
0 @I1@ INDI
1 NAME First /Copy/
1 SEX M
0 @I1@ INDI
1 NAME Second /Copy/
1 SEX F
0 TRLR
";
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(text, "dupes.ged");
    let report = import_source(&mut conn, &source, request("Dupes"), &LogAuditSink).unwrap();

    assert_eq!(report.stats.individuals, 1);
    assert_eq!(report.stats.errors, 1);

    let persons = SqlitePersonRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    assert_eq!(persons.len(), 1);
    assert_eq!(persons[0].firstname.as_deref(), Some("First"));
}

#[test]
fn report_serializes_for_api_consumers() {
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(FULL_TREE, "tree.ged");
    let report = import_source(&mut conn, &source, request("Serialized"), &LogAuditSink).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stats"]["individuals"], 3);
    assert_eq!(json["stats"]["families"], 1);
    assert_eq!(json["stats"]["errors"], 0);
    assert_eq!(json["team"]["name"], "Serialized");
}

#[derive(Default)]
struct RecordingSink {
    events: RefCell<Vec<String>>,
}

impl AuditSink for RecordingSink {
    fn record(&self, event: &str, context: &AuditContext) {
        let mut line = event.to_string();
        for (key, value) in context.pairs() {
            if *key == "state" {
                line.push(':');
                line.push_str(value);
            }
        }
        self.events.borrow_mut().push(line);
    }
}

#[test]
fn audit_trail_follows_state_machine_order() {
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(FULL_TREE, "tree.ged");
    let sink = RecordingSink::default();

    import_source(&mut conn, &source, request("Audited"), &sink).unwrap();

    let events = sink.events.borrow();
    let expected = [
        "import_state:validating",
        "security_pass",
        "import_state:parsing",
        "import_state:creating_tenant",
        "import_state:importing_individuals",
        "import_state:importing_families",
        "import_state:committed",
        "import_committed",
    ];
    assert_eq!(events.as_slice(), &expected);
}

#[test]
fn fatal_rejection_emits_failed_audit_event() {
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text("0 NOTE not gedcom\n", "bad.ged");
    let sink = RecordingSink::default();

    import_source(&mut conn, &source, request("Rejected"), &sink).unwrap_err();

    let events = sink.events.borrow();
    assert_eq!(events.first().map(String::as_str), Some("import_state:validating"));
    assert_eq!(events.last().map(String::as_str), Some("import_failed"));
}
