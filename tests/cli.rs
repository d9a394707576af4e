//! End-to-end tests driving the `mqa` binary.
//!
//! Providers stay disabled, so nothing here touches the network: commands
//! that need embeddings or completions are expected to fail cleanly.

use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn mqa_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("mqa");
    path
}

/// Single-page PDF whose content stream shows `text` in Helvetica.
/// Byte offsets in the xref table are computed so pdf-extract can parse it.
fn minimal_pdf_with_text(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let o1 = out.len();
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    let o2 = out.len();
    out.extend_from_slice(b"2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj\n");
    let o3 = out.len();
    out.extend_from_slice(b"3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >> endobj\n");
    let o4 = out.len();
    out.extend_from_slice(
        format!(
            "4 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
            stream.len(),
            stream
        )
        .as_bytes(),
    );
    let o5 = out.len();
    out.extend_from_slice(
        b"5 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    let xref_start = out.len();
    out.extend_from_slice(b"xref\n0 6\n");
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in [o1, o2, o3, o4, o5] {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(b"trailer << /Size 6 /Root 1 0 R >>\nstartxref\n");
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

const MANUAL_TEXT: &str = "The hydraulic press is designed for continuous operation in metal \
forming shops. Operators should read this manual fully before starting the machine for the first time.";

fn setup_test_env(bind: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let manuals_dir = root.join("manuals");
    fs::create_dir_all(&manuals_dir).unwrap();

    fs::write(
        manuals_dir.join("press.pdf"),
        minimal_pdf_with_text(MANUAL_TEXT),
    )
    .unwrap();
    fs::write(manuals_dir.join("notes.txt"), "not a manual").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/manuals.sqlite"

[server]
bind = "{}"
"#,
        root.display(),
        bind
    );

    let config_path = config_dir.join("mqa.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_mqa(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = mqa_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run mqa binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_is_idempotent() {
    let (tmp, config_path) = setup_test_env("127.0.0.1:0");

    let (stdout, stderr, success) = run_mqa(&config_path, &["init"]);
    assert!(success, "init failed: {}", stderr);
    assert!(stdout.contains("Database initialized successfully"));
    assert!(tmp.path().join("data/manuals.sqlite").exists());

    let (_, stderr, success) = run_mqa(&config_path, &["init"]);
    assert!(success, "second init failed: {}", stderr);
}

#[test]
fn test_classify_needs_no_config() {
    let (stdout, _, success) = run_mqa(
        Path::new("/nonexistent/mqa.toml"),
        &["classify", "What is the torque spec for the spindle?"],
    );
    assert!(success);
    assert_eq!(stdout.trim(), "specification");

    let (stdout, _, _) = run_mqa(
        Path::new("/nonexistent/mqa.toml"),
        &["classify", "Is there a hazard near the blade?"],
    );
    assert_eq!(stdout.trim(), "safety");
}

#[test]
fn test_missing_config_fails() {
    let (_, stderr, success) = run_mqa(Path::new("/nonexistent/mqa.toml"), &["stats"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"), "stderr: {}", stderr);
}

#[test]
fn test_dry_run_segments_without_writing() {
    let (tmp, config_path) = setup_test_env("127.0.0.1:0");
    run_mqa(&config_path, &["init"]);

    let pdf = tmp.path().join("manuals/press.pdf");
    let (stdout, stderr, success) = run_mqa(
        &config_path,
        &["ingest", pdf.to_str().unwrap(), "--dry-run", "--progress", "off"],
    );
    assert!(success, "dry run failed: stdout={} stderr={}", stdout, stderr);
    assert!(stdout.contains("ingest press.pdf (dry-run)"), "stdout: {}", stdout);
    assert!(stdout.contains("pages: 1"), "stdout: {}", stdout);
    assert!(stdout.contains("content"), "stdout: {}", stdout);

    let (stats, _, _) = run_mqa(&config_path, &["stats"]);
    assert!(stats.contains("Chunks:      0"), "stats: {}", stats);
}

#[test]
fn test_non_pdf_is_rejected() {
    let (tmp, config_path) = setup_test_env("127.0.0.1:0");
    let txt = tmp.path().join("manuals/notes.txt");
    let (_, stderr, success) = run_mqa(
        &config_path,
        &["ingest", txt.to_str().unwrap(), "--dry-run"],
    );
    assert!(!success);
    assert!(stderr.contains("Only PDF files are supported"), "stderr: {}", stderr);
}

#[test]
fn test_ingest_with_embeddings_disabled_writes_nothing() {
    let (tmp, config_path) = setup_test_env("127.0.0.1:0");
    run_mqa(&config_path, &["init"]);

    let pdf = tmp.path().join("manuals/press.pdf");
    let (_, stderr, success) = run_mqa(
        &config_path,
        &["ingest", pdf.to_str().unwrap(), "--progress", "off"],
    );
    assert!(!success);
    assert!(stderr.contains("disabled"), "stderr: {}", stderr);

    let (stats, _, success) = run_mqa(&config_path, &["stats"]);
    assert!(success);
    assert!(stats.contains("Chunks:      0"), "stats: {}", stats);
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, _) = setup_test_env("127.0.0.1:0");
    let bad = tmp.path().join("config/bad.toml");
    fs::write(
        &bad,
        "[db]\npath = \"x.sqlite\"\n[chunking]\nchunk_size = 100\nchunk_overlap = 200\n",
    )
    .unwrap();
    let (_, stderr, success) = run_mqa(&bad, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("chunk_overlap"), "stderr: {}", stderr);
}

// ============ HTTP server ============

struct ServerGuard(Child);

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn wait_for_health(base: &str) {
    let client = reqwest::blocking::Client::new();
    let deadline = Instant::now() + Duration::from_secs(20);
    while Instant::now() < deadline {
        if let Ok(resp) = client.get(format!("{}/health", base)).send() {
            if resp.status().is_success() {
                return;
            }
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    panic!("server at {} did not become healthy", base);
}

#[test]
fn test_server_endpoints() {
    let port = free_port();
    let bind = format!("127.0.0.1:{}", port);
    let (_tmp, config_path) = setup_test_env(&bind);
    run_mqa(&config_path, &["init"]);

    let child = Command::new(mqa_binary())
        .arg("--config")
        .arg(&config_path)
        .arg("serve")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let _guard = ServerGuard(child);

    let base = format!("http://{}", bind);
    wait_for_health(&base);
    let client = reqwest::blocking::Client::new();

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(health["status"], "ok");

    let info: serde_json::Value = client
        .get(format!("{}/session_info/line-3", base))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(info["session_id"], "line-3");
    assert_eq!(info["message_count"], 0);
    assert_eq!(info["active"], false);

    let cleared: serde_json::Value = client
        .post(format!("{}/clear_history", base))
        .json(&serde_json::json!({ "session_id": "line-3" }))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(cleared["status"], "not_found");

    let resp = client
        .post(format!("{}/chat", base))
        .json(&serde_json::json!({
            "session_id": "line-3",
            "question": "What torque is required?",
            "question_type": "gossip"
        }))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let resp = client
        .post(format!("{}/chat", base))
        .json(&serde_json::json!({
            "session_id": "line-3",
            "question": "What torque is required?"
        }))
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["error"]["code"], "chat_failed");
    assert_eq!(body["error"]["message"], "Failed to process question");

    let resp = client
        .post(format!("{}/ingest?filename=notes.txt", base))
        .body("plain text")
        .send()
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let stats: serde_json::Value = client
        .get(format!("{}/stats", base))
        .send()
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(stats["documents_in_db"], 0);
}
