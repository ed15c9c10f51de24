//! End-to-end command execution through the CLI route table.

use playlog::access::{Action, Grant};
use playlog::cli::{Collection, Commands, OutputFormat, QueryCommands, RunContext};
use playlog::config::{PlaylogConfig, TokenConfig};
use playlog::error::ApiError;
use playlog::types::GroupId;
use serde_json::Value;
use tempfile::TempDir;

use super::support::{ten_contexts, GAME, GROUP, TEST_TOKEN};

fn seeded(temp: &TempDir, token: Option<&str>) -> RunContext {
    let mut config = PlaylogConfig::default();
    config.service.game = GAME.to_string();
    config.storage.store_path = temp.path().join("store");
    config.auth.tokens.push(TokenConfig {
        token: TEST_TOKEN.to_string(),
        user_id: "test-user".to_string(),
        grants: vec![
            Grant::blanket(Action::ReadWrite, GAME),
            Grant::for_group(Action::ReadData, GAME, GroupId::new(GROUP.to_string())),
        ],
    });
    let context = RunContext::with_config(config, token.map(str::to_string)).unwrap();

    let file = temp.path().join("contexts.jsonl");
    let lines: Vec<String> = ten_contexts()
        .iter()
        .map(|c| serde_json::to_string(c).unwrap())
        .collect();
    std::fs::write(&file, lines.join("\n")).unwrap();
    context
        .execute(&Commands::Load {
            collection: Collection::Contexts,
            file,
        })
        .unwrap();
    context
}

fn list(collection: Collection, format: OutputFormat) -> Commands {
    Commands::List {
        collection,
        query: Some(r#"{"data.someNumber": {"$gte": 5}}"#.to_string()),
        sort: Some("+data.someNumber".to_string()),
        skip: 2,
        limit: 2,
        url: None,
        format,
    }
}

#[test]
fn test_list_json_output() {
    let temp = TempDir::new().unwrap();
    let context = seeded(&temp, Some(TEST_TOKEN));
    let out = context
        .execute(&list(Collection::Contexts, OutputFormat::Json))
        .unwrap();
    let value: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["meta"]["total"], 5);
    assert_eq!(value["records"][0]["data"]["someNumber"], 7);
    assert_eq!(value["records"][1]["data"]["someNumber"], 8);
    assert_eq!(value["links"]["pages"]["next"], "/contexts?limit=2&skip=4");
}

#[test]
fn test_list_text_output() {
    let temp = TempDir::new().unwrap();
    let context = seeded(&temp, Some(TEST_TOKEN));
    let out = context
        .execute(&list(Collection::Contexts, OutputFormat::Text))
        .unwrap();
    assert!(out.contains("ctx-7"));
    assert!(out.contains("ctx-8"));
    assert!(out.contains("3m 00s"));
    assert!(out.contains("Showing 2 of 5 contexts"));
}

#[test]
fn test_submit_and_resolve_through_cli() {
    let temp = TempDir::new().unwrap();
    let context = seeded(&temp, Some(TEST_TOKEN));
    let out = context
        .execute(&Commands::Query {
            command: QueryCommands::Submit {
                collection: Collection::Contexts,
                request: r#"{"type":"avg","key":"duration","query":{}}"#.to_string(),
                format: OutputFormat::Json,
            },
        })
        .unwrap();
    let submission: Value = serde_json::from_str(&out).unwrap();
    let query_id = submission["queryId"].as_str().unwrap().to_string();

    let out = context
        .execute(&Commands::Query {
            command: QueryCommands::Result {
                collection: Collection::Contexts,
                query_id,
                format: OutputFormat::Text,
            },
        })
        .unwrap();
    assert_eq!(out, "avg: 180000");
}

#[test]
fn test_get_and_missing_file() {
    let temp = TempDir::new().unwrap();
    let context = seeded(&temp, Some(TEST_TOKEN));
    let out = context
        .execute(&Commands::Get {
            collection: Collection::Contexts,
            id: "ctx-0".to_string(),
        })
        .unwrap();
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["duration"], 180000);

    let err = context
        .execute(&Commands::Load {
            collection: Collection::Events,
            file: temp.path().join("absent.jsonl"),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::StorageError(_)));
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let mut config = PlaylogConfig::default();
    config.storage.store_path = temp.path().join("store");
    config.service.game = String::new();
    assert!(matches!(
        RunContext::with_config(config, None),
        Err(ApiError::ConfigError(_))
    ));
}
