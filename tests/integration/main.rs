//! Integration tests for Codescope
//!
//! These drive the built binary against a mock chat-completions endpoint.

use serde_json::Value;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT_PATH: &str = "/api/v1/chat/completions";

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

async fn mock_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT_PATH))
        .respond_with(completion(
            "# File Analysis\n\n## Overall Purpose\nHelpers\n\n## Main Functions\n1. **f** - calls g",
        ))
        .mount(&server)
        .await;
    server
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Working directory with a settings file pointing at `endpoint`.
fn workspace(endpoint: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "codescope.toml",
        &format!("[inference]\nendpoint = \"{}\"\n\n[limits]\ncalls_per_window = 100\n", endpoint),
    );
    dir
}

async fn codescope(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_codescope"))
        .args(args)
        .current_dir(cwd)
        .env("OPENROUTER_API_KEY", "test-key")
        .env_remove("RUST_LOG")
        .env_remove("CODESCOPE_MODEL")
        .env_remove("CODESCOPE_MAX_CONCURRENCY")
        .env_remove("CODESCOPE_CALLS_PER_WINDOW")
        .env_remove("CODESCOPE_WINDOW_SECS")
        .output()
        .await
        .expect("failed to run codescope")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = codescope(dir.path(), &["--help"]).await;

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("codescope"));
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("clear"));
}

#[tokio::test]
async fn test_version() {
    let dir = TempDir::new().unwrap();
    let output = codescope(dir.path(), &["version"]).await;

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_end_to_end_two_files() {
    let server = mock_endpoint().await;
    let dir = workspace(&format!("{}{}", server.uri(), ENDPOINT_PATH));
    write(dir.path(), "src/a.py", "def f():\n    return g()\n");
    write(dir.path(), "src/b.py", "def g():\n    pass\n");

    let output = codescope(dir.path(), &["analyze", "src", "--output", "out.json"]).await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    // two files, one batch summary, one call-graph analysis
    let first_calls = server.received_requests().await.unwrap().len();
    assert_eq!(first_calls, 4);

    let bundle = read_json(&dir.path().join("out.json"));
    let files = bundle["file_analyses"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["file_path"], "a.py");
    assert_eq!(files[0]["file_type"], "Python");
    assert!(files[0]["analysis"].as_str().unwrap().contains("Helpers"));
    assert!(bundle["global_analysis"].as_str().unwrap().contains("Total Files Analyzed: 2"));
    assert!(bundle["call_graph_analysis"].as_str().unwrap().contains("Helpers"));

    let links = bundle["call_graph"]["links"].as_array().unwrap();
    assert!(links
        .iter()
        .any(|l| l["source"] == "f" && l["target"] == "g" && l["kind"] == "calls"));

    let cache = read_json(&dir.path().join("src/.codescope/analysis_cache.json"));
    let entries = cache.as_object().unwrap();
    assert_eq!(entries.len(), 2);
    for key in ["a.py", "b.py"] {
        assert_eq!(entries[key]["hash"].as_str().unwrap().len(), 64);
        assert_eq!(entries[key]["analysis"]["file_type"], "Python");
        assert!(entries[key]["analysis"]["analysis"].as_str().unwrap().contains("Helpers"));
    }

    // unchanged tree: no new calls and the same bundle
    let output = codescope(dir.path(), &["analyze", "src", "--output", "again.json"]).await;
    assert!(output.status.success());
    assert_eq!(server.received_requests().await.unwrap().len(), first_calls);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("out.json")).unwrap(),
        std::fs::read_to_string(dir.path().join("again.json")).unwrap()
    );
}

#[tokio::test]
async fn test_failing_file_does_not_abort_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("FAIL_ME"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(completion("## Overall Purpose\nFine"))
        .mount(&server)
        .await;

    let dir = workspace(&format!("{}{}", server.uri(), ENDPOINT_PATH));
    for i in 1..=4 {
        let marker = if i == 3 { "FAIL_ME" } else { "ok" };
        write(dir.path(), &format!("tree/f{}.py", i), &format!("# {}\ndef f{}():\n    pass\n", marker, i));
    }

    let output = codescope(dir.path(), &["analyze", "tree", "-o", "out.json"]).await;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bundle = read_json(&dir.path().join("out.json"));
    let files = bundle["file_analyses"].as_array().unwrap();
    assert_eq!(files.len(), 4);
    for file in files {
        let analysis = file["analysis"].as_str().unwrap();
        if file["file_path"] == "f3.py" {
            assert!(analysis.contains("Analysis failed for chunk 1 of f3.py: API error: 500 - model overloaded"));
        } else {
            assert!(analysis.contains("Fine"));
        }
    }

    let cache = read_json(&dir.path().join("tree/.codescope/analysis_cache.json"));
    assert_eq!(cache.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unwritable_output_is_fatal() {
    let dir = workspace("http://127.0.0.1:1/api/v1/chat/completions");
    write(dir.path(), "tree/empty.js", "");

    let output = codescope(dir.path(), &["analyze", "tree", "--output", "missing/dir/out.json"]).await;

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to write results"));
}

#[tokio::test]
async fn test_missing_root_is_fatal() {
    let dir = workspace("http://127.0.0.1:1/api/v1/chat/completions");

    let output = codescope(dir.path(), &["analyze", "does-not-exist"]).await;

    assert!(!output.status.success());
}

#[tokio::test]
async fn test_clear_removes_cache() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tree/.codescope/analysis_cache.json", "{}");

    let output = codescope(dir.path(), &["clear", "tree"]).await;

    assert!(output.status.success());
    assert!(!dir.path().join("tree/.codescope").exists());
    assert!(dir.path().join("tree").exists());
}
