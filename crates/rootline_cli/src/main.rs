//! One-shot import entry point.
//!
//! # Responsibility
//! - Run a single GEDCOM import from the command line.
//! - Keep output deterministic: team id plus final counters.

use std::process::ExitCode;

use rootline_core::db::open_db;
use rootline_core::{default_log_level, import_file, init_logging, ImportRequest, UserId};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        eprintln!("usage: rootline_cli <gedcom-file> <db-file> <team-name> [owner-uuid]");
        return ExitCode::from(2);
    }

    if let Ok(log_dir) = std::env::var("ROOTLINE_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let owner = match args.get(3) {
        Some(raw) => match raw.parse::<UserId>() {
            Ok(owner) => owner,
            Err(_) => {
                eprintln!("invalid owner uuid: {raw}");
                return ExitCode::from(2);
            }
        },
        None => uuid::Uuid::new_v4(),
    };

    let mut conn = match open_db(&args[1]) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("could not open database: {err}");
            return ExitCode::FAILURE;
        }
    };

    let request = ImportRequest {
        team_name: args[2].clone(),
        team_description: None,
        source_filename: args[0].clone(),
        initiating_user: owner,
    };

    match import_file(&mut conn, &args[0], request) {
        Ok(report) => {
            println!("team={}", report.team.uuid);
            println!(
                "individuals={} families={} errors={}",
                report.stats.individuals, report.stats.families, report.stats.errors
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
