use clap::Parser;
use search_cli::{load_documents, run, Cli};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_pets(dir: &Path) {
    let jsonl = [
        r#"{"id": 0, "text": "белый кот и модный ошейник", "ratings": [8, -3]}"#,
        r#"{"id": 1, "text": "пушистый кот пушистый хвост", "ratings": [7, 2, 7]}"#,
        "",
        r#"{"id": 2, "text": "ухоженный пёс выразительные глаза", "ratings": [5, -12, 2, 1]}"#,
    ];
    fs::write(dir.join("a.jsonl"), jsonl.join("\n")).unwrap();
    let json = r#"[{"id": 3, "text": "ухоженный скворец евгений", "status": "banned", "ratings": [9]},
                   {"id": 4, "text": "пушистый кот пушистый хвост"}]"#;
    fs::write(dir.join("b.json"), json).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();
}

fn run_args(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    run(cli, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn loads_json_and_jsonl_from_directory() {
    let dir = tempdir().unwrap();
    write_pets(dir.path());
    let docs = load_documents(dir.path()).unwrap();
    let ids: Vec<i32> = docs.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert!(docs[4].ratings.is_empty());
}

#[test]
fn search_prints_paged_results() {
    let dir = tempdir().unwrap();
    write_pets(dir.path());
    let input = dir.path().to_string_lossy().to_string();
    for parallel in [false, true] {
        let mut args = vec!["search-cli", "search", "--input", input.as_str(), "--stop-words", "и в на", "--query", "ухоженный кот"];
        if parallel {
            args.push("--parallel");
        }
        let out = run_args(&args);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5, "{out}");
        assert_eq!(lines[2], "Page break");
        assert!(lines[0].starts_with("{ document_id = 2,"), "{out}");
    }
}

#[test]
fn search_json_output_by_status() {
    let dir = tempdir().unwrap();
    write_pets(dir.path());
    let input = dir.path().to_string_lossy().to_string();
    let out = run_args(&["search-cli", "search", "--input", input.as_str(), "--query", "ухоженный", "--status", "banned", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["id"].as_i64(), Some(3));
}

#[test]
fn match_and_dedup_commands() {
    let dir = tempdir().unwrap();
    write_pets(dir.path());
    let input = dir.path().to_string_lossy().to_string();
    let out = run_args(&["search-cli", "match", "--input", input.as_str(), "--query", "кот хвост -ошейник", "--id", "1"]);
    assert_eq!(out.trim(), "{ document_id = 1, status = Actual, words = кот хвост}");

    let out = run_args(&["search-cli", "dedup", "--input", input.as_str()]);
    assert_eq!(out.lines().collect::<Vec<_>>(), vec!["Found duplicate document id 4", "4 documents left"]);
}

#[test]
fn batch_runs_every_query() {
    let dir = tempdir().unwrap();
    write_pets(dir.path());
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "пушистый\n\nглаза -пёс\n").unwrap();
    let input = dir.path().join("a.jsonl").to_string_lossy().to_string();
    let queries = queries.to_string_lossy().to_string();
    let out = run_args(&["search-cli", "batch", "--input", input.as_str(), "--queries", queries.as_str()]);
    assert!(out.starts_with("1 documents for query [пушистый]"), "{out}");
    assert!(out.contains("0 documents for query [глаза -пёс]"));

    let out = run_args(&["search-cli", "batch", "--input", input.as_str(), "--queries", queries.as_str(), "--joined"]);
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn missing_input_is_an_error() {
    let cli = Cli::try_parse_from(["search-cli", "dedup", "--input", "/definitely/not/here"]).unwrap();
    assert!(run(cli, &mut Vec::new()).is_err());
}
