use super::*;

const LOC: &str = "6f1c2b8e-3d4a-4e5f-9a0b-1c2d3e4f5a6b";

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["locintel-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_db_migrate_command() {
    let cli = Cli::try_parse_from(["locintel-cli", "db", "migrate"]).expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn parses_location_add_with_optional_fields() {
    let cli = Cli::try_parse_from([
        "locintel-cli",
        "location",
        "add",
        "--client",
        "0d8e6a3e-8f0a-4a57-9a51-2f3c0b1d7e11",
        "--agency",
        "a2b6c4d8-1e3f-4a5b-8c7d-9e0f1a2b3c4d",
        "--name",
        "Harbor Dental",
        "--address",
        "1 Main St",
    ])
    .expect("valid args");

    match cli.command {
        Some(Commands::Location {
            command:
                LocationCommands::Add {
                    name,
                    place_id,
                    address,
                    ..
                },
        }) => {
            assert_eq!(name, "Harbor Dental");
            assert!(place_id.is_none());
            assert_eq!(address.as_deref(), Some("1 Main St"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn location_add_requires_a_name() {
    let result = Cli::try_parse_from([
        "locintel-cli",
        "location",
        "add",
        "--client",
        LOC,
        "--agency",
        LOC,
    ]);
    assert!(result.is_err());
}

#[test]
fn rejects_malformed_location_ids() {
    let result = Cli::try_parse_from(["locintel-cli", "location", "show", "--location", "42"]);
    assert!(result.is_err());
}

#[test]
fn parses_keyword_add() {
    let cli = Cli::try_parse_from([
        "locintel-cli",
        "keyword",
        "add",
        "--location",
        LOC,
        "--keyword",
        "dentist near me",
    ])
    .expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Keyword {
            command: KeywordCommands::Add { ref keyword, .. }
        }) if keyword == "dentist near me"
    ));
}

#[test]
fn audit_history_limit_defaults_to_ten() {
    let cli = Cli::try_parse_from(["locintel-cli", "audit", "history", "--location", LOC])
        .expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Audit {
            command: AuditCommands::History { limit: 10, .. }
        })
    ));
}

#[test]
fn sync_without_locations_targets_all() {
    let cli = Cli::try_parse_from(["locintel-cli", "sync"]).expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Sync { ref locations }) if locations.is_empty()
    ));
}

#[test]
fn sync_accepts_repeated_locations() {
    let cli = Cli::try_parse_from([
        "locintel-cli",
        "sync",
        "--location",
        LOC,
        "--location",
        "0d8e6a3e-8f0a-4a57-9a51-2f3c0b1d7e11",
    ])
    .expect("valid args");
    assert!(matches!(
        cli.command,
        Some(Commands::Sync { ref locations }) if locations.len() == 2
    ));
}

#[test]
fn missing_request_file_means_empty_audit() {
    let request = audit::read_request(None).expect("default request");
    assert_eq!(request, locintel_engine::AuditRequest::default());
}

#[test]
fn request_file_is_parsed_as_json() {
    let path = std::env::temp_dir().join(format!("locintel-audit-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"{"scores":{"citation":80.0},"issues_found":["no photos"],"internal_notes":"call owner"}"#,
    )
    .expect("write temp file");

    let request = audit::read_request(Some(&path)).expect("parsed request");
    std::fs::remove_file(&path).ok();

    assert_eq!(request.scores.and_then(|s| s.citation), Some(80.0));
    assert_eq!(request.notes.issues_found, vec!["no photos".to_string()]);
    assert_eq!(request.notes.internal_notes.as_deref(), Some("call owner"));
}

#[test]
fn malformed_request_file_is_an_error() {
    let path = std::env::temp_dir().join(format!("locintel-audit-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, "{not json").expect("write temp file");
    let result = audit::read_request(Some(&path));
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}
