use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn ah_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ah");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let files_dir = root.join("files");
    fs::create_dir_all(&files_dir).unwrap();
    fs::write(
        files_dir.join("alpha.md"),
        "# Inventory Setup\n\nConfigure warehouses, items and opening stock before the first sales order.",
    )
    .unwrap();
    fs::write(
        files_dir.join("beta.txt"),
        "Payroll runs monthly. Employees are paid on the last working day.",
    )
    .unwrap();

    let uploads_dir = root.join("uploads");
    fs::create_dir_all(&uploads_dir).unwrap();
    fs::write(
        uploads_dir.join("gamma.md"),
        "Purchase orders need manager approval above the spending limit.",
    )
    .unwrap();

    let config_content = format!(
        r#"[corpus]
paths = ["{root}/files/alpha.md", "{root}/files/beta.txt"]
uploads_dir = "{root}/uploads"

[chunking]
max_words = 220

[retrieval]
top_k = 4

[answer]
header = "Relevant material:"
insufficient_message = "Not enough information in the current material."

[server]
bind = "127.0.0.1:7341"
"#,
        root = root.display().to_string().replace('\\', "/")
    );

    let config_path = config_dir.join("answer.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ah(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ah_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ah binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_ingest_reports_counts() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_ah(&config, &["ingest"]);
    assert!(success, "ingest failed: {}", stderr);
    assert!(stdout.contains("documents read: 3"), "stdout: {}", stdout);
    assert!(stdout.contains("chunks indexed: 3"), "stdout: {}", stdout);
    assert!(stdout.contains("ok"));
}

#[test]
fn test_ingest_reports_missing_file() {
    let (tmp, config) = setup_test_env();
    fs::remove_file(tmp.path().join("files/beta.txt")).unwrap();

    let (stdout, stderr, success) = run_ah(&config, &["ingest"]);
    assert!(success, "ingest failed: {}", stderr);
    assert!(stdout.contains("chunks indexed: 2"), "stdout: {}", stdout);
    assert!(stdout.contains("skipped:"), "stdout: {}", stdout);
    assert!(stdout.contains("beta.txt"));
}

#[test]
fn test_search_text_output() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_ah(&config, &["search", "inventory setup", "--top-k", "1"]);
    assert!(success, "search failed: {}", stderr);
    assert!(stdout.contains("1. ["), "stdout: {}", stdout);
    assert!(stdout.contains("alpha.md::0"));
    assert!(!stdout.contains("2. ["));
}

#[test]
fn test_search_json_output() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_ah(&config, &["search", "purchase approval", "--json"]);
    assert!(success, "search failed: {}", stderr);

    let hits: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["id"], "gamma.md::0");
    assert!(hits[0]["score"].as_f64().unwrap() > 0.0);
    assert_eq!(hits[2]["score"].as_f64().unwrap(), 0.0);
}

#[test]
fn test_ask_builtin_answer() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_ah(
        &config,
        &["ask", "How do I set up inventory warehouses?", "--industry", "retail"],
    );
    assert!(success, "ask failed: {}", stderr);
    assert!(stdout.starts_with("Relevant material:"), "stdout: {}", stdout);
    assert!(stdout.contains("Industry: retail"));
    assert!(stdout.contains("[alpha.md #0]"));
    assert!(stdout.contains("confidence: "));
}

#[test]
fn test_ask_json_without_match() {
    let (_tmp, config) = setup_test_env();
    let (stdout, stderr, success) = run_ah(&config, &["ask", "quantum chromodynamics", "--json"]);
    assert!(success, "ask failed: {}", stderr);

    let answer: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        answer["answer"],
        "Not enough information in the current material."
    );
    assert_eq!(answer["sources"].as_array().unwrap().len(), 0);
    assert_eq!(answer["confidence"].as_f64().unwrap(), 0.0);
    assert_eq!(answer["generated"], false);
}

#[test]
fn test_empty_question_fails() {
    let (_tmp, config) = setup_test_env();
    let (_stdout, stderr, success) = run_ah(&config, &["search", "   "]);
    assert!(!success);
    assert!(stderr.contains("question must not be empty"), "stderr: {}", stderr);
}

#[test]
fn test_invalid_config_fails() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config/bad.toml");
    fs::write(&bad, "[corpus]\npaths = []\n\n[retrieval]\ntop_k = 0\n").unwrap();

    let (_stdout, stderr, success) = run_ah(&bad, &["ingest"]);
    assert!(!success);
    assert!(stderr.contains("top_k"), "stderr: {}", stderr);
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_stdout, stderr, success) = run_ah(&tmp.path().join("nope.toml"), &["ingest"]);
    assert!(!success);
    assert!(!stderr.is_empty());
}
