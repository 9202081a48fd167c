use rootline_core::db::open_db_in_memory;
use rootline_core::{
    import_source, CoupleRepository, GedcomSource, ImportRequest, LogAuditSink, PersonRepository,
    SqliteCoupleRepository, SqlitePersonRepository, UserId,
};

fn request(team_name: &str) -> ImportRequest {
    ImportRequest {
        team_name: team_name.to_string(),
        team_description: None,
        source_filename: "linkage.ged".to_string(),
        initiating_user: UserId::new_v4(),
    }
}

#[test]
fn family_before_its_individuals_still_links_parents() {
    // The FAM record appears first; both spouses and the child are
    // declared later in the file.
    let text = "\
0 HEAD
1 SOUR rootline-test
0 @F1@ FAM
1 HUSB @I1@
1 WIFE @I2@
1 CHIL @I3@
0 @I1@ INDI
1 NAME Hans /Berg/
1 SEX M
0 @I2@ INDI
1 NAME Ida /Berg/
1 SEX F
0 @I3@ INDI
1 NAME Kid /Berg/
0 TRLR
";
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(text, "linkage.ged");
    let report = import_source(&mut conn, &source, request("Order"), &LogAuditSink).unwrap();

    assert_eq!(report.stats.individuals, 3);
    assert_eq!(report.stats.families, 1);
    assert_eq!(report.stats.errors, 0);

    let persons = SqlitePersonRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    let hans = persons
        .iter()
        .find(|person| person.firstname.as_deref() == Some("Hans"))
        .unwrap();
    let ida = persons
        .iter()
        .find(|person| person.firstname.as_deref() == Some("Ida"))
        .unwrap();
    let kid = persons
        .iter()
        .find(|person| person.firstname.as_deref() == Some("Kid"))
        .unwrap();

    assert_eq!(kid.father, Some(hans.uuid));
    assert_eq!(kid.mother, Some(ida.uuid));
}

#[test]
fn wife_only_family_creates_single_parent_couple() {
    let text = "\
0 HEAD
1 SOUR rootline-test
0 @I2@ INDI
1 NAME Solo /Mother/
1 SEX F
0 @I3@ INDI
1 NAME Only /Child/
0 @F1@ FAM
1 HUSB @I9@
1 WIFE @I2@
1 CHIL @I3@
0 TRLR
";
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(text, "linkage.ged");
    let report = import_source(&mut conn, &source, request("Single"), &LogAuditSink).unwrap();

    assert_eq!(report.stats.families, 1);

    let persons = SqlitePersonRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    let mother = persons
        .iter()
        .find(|person| person.firstname.as_deref() == Some("Solo"))
        .unwrap();
    let child = persons
        .iter()
        .find(|person| person.firstname.as_deref() == Some("Only"))
        .unwrap();

    let couples = SqliteCoupleRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    assert_eq!(couples.len(), 1);
    assert_eq!(couples[0].person1, None);
    assert_eq!(couples[0].person2, Some(mother.uuid));

    // The unresolved husband side stays NULL on the child as well.
    assert_eq!(child.father, None);
    assert_eq!(child.mother, Some(mother.uuid));
}

#[test]
fn family_without_resolvable_spouses_is_skipped_and_counted() {
    let text = "\
0 HEAD
1 SOUR rootline-test
0 @I1@ INDI
1 NAME Bystander /Person/
0 @F1@ FAM
1 HUSB @I8@
1 WIFE @I9@
1 CHIL @I1@
0 TRLR
";
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(text, "linkage.ged");
    let report = import_source(&mut conn, &source, request("Skipped"), &LogAuditSink).unwrap();

    assert_eq!(report.stats.individuals, 1);
    assert_eq!(report.stats.families, 0);
    assert_eq!(report.stats.errors, 1);

    let couples = SqliteCoupleRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    assert!(couples.is_empty());

    // The child of a skipped family keeps NULL parents.
    let persons = SqlitePersonRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    assert_eq!(persons[0].father, None);
    assert_eq!(persons[0].mother, None);
}

#[test]
fn unresolvable_child_is_logged_and_counted_without_aborting() {
    let text = "\
0 HEAD
1 SOUR rootline-test
0 @I1@ INDI
1 NAME Father /Here/
1 SEX M
0 @I2@ INDI
1 NAME Child /Here/
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I2@
1 CHIL @I7@
0 TRLR
";
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text(text, "linkage.ged");
    let report = import_source(&mut conn, &source, request("Partial"), &LogAuditSink).unwrap();

    assert_eq!(report.stats.families, 1);
    assert_eq!(report.stats.errors, 1);

    let persons = SqlitePersonRepository::new(&conn)
        .list_for_team(report.team.uuid)
        .unwrap();
    let child = persons
        .iter()
        .find(|person| person.firstname.as_deref() == Some("Child"))
        .unwrap();
    assert!(child.father.is_some());
    assert_eq!(child.mother, None);
}
