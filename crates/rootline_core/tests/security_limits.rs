use rootline_core::db::open_db_in_memory;
use rootline_core::{
    import_source, GedcomSource, ImportError, ImportRequest, LogAuditSink, SecurityViolation,
    UserId,
};
use rusqlite::Connection;

fn request() -> ImportRequest {
    ImportRequest {
        team_name: "Rejected tree".to_string(),
        team_description: None,
        source_filename: "suspect.ged".to_string(),
        initiating_user: UserId::new_v4(),
    }
}

fn team_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM teams;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn header_failure_never_creates_a_team() {
    let mut conn = open_db_in_memory().unwrap();
    // Everything after the broken header is perfectly well-formed.
    let text = "\
0 NOTE wrong opener
0 @I1@ INDI
1 NAME Fine /Record/
1 SEX M
0 TRLR
";
    let source = GedcomSource::from_text(text, "suspect.ged");

    let err = import_source(&mut conn, &source, request(), &LogAuditSink).unwrap_err();
    match err {
        ImportError::Security(SecurityViolation::InvalidHeader) => {}
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(team_count(&conn), 0);
}

#[test]
fn blocklisted_content_never_creates_a_team() {
    let mut conn = open_db_in_memory().unwrap();
    let text = "\
0 HEAD
1 SOUR rootline-test
0 @I1@ INDI
1 NAME <script>alert(1)</script> /Evil/
0 TRLR
";
    let source = GedcomSource::from_text(text, "suspect.ged");

    let err = import_source(&mut conn, &source, request(), &LogAuditSink).unwrap_err();
    assert!(matches!(
        err,
        ImportError::Security(SecurityViolation::SuspiciousContent { .. })
    ));
    assert_eq!(team_count(&conn), 0);
}

#[test]
fn empty_input_fails_before_any_persistence() {
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text("", "empty.ged");

    let err = import_source(&mut conn, &source, request(), &LogAuditSink).unwrap_err();
    assert!(matches!(err, ImportError::Security(_)));
    assert_eq!(team_count(&conn), 0);
}

#[test]
fn fatal_error_reason_is_human_readable() {
    let mut conn = open_db_in_memory().unwrap();
    let source = GedcomSource::from_text("0 NOTE x\n", "suspect.ged");

    let err = import_source(&mut conn, &source, request(), &LogAuditSink).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("rejected"), "got: {message}");
    assert!(message.contains("header"), "got: {message}");
}
