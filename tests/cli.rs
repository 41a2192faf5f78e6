//! Integration test: run the driver binary against the bundled payload.

use std::path::PathBuf;
use std::process::Command;

fn bundled_payload() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/getReviews.response.json")
}

/// Config that keeps the log file out of the user's state directory.
fn temp_config(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let log = dir.join("reviewfeed.log");
    let config = dir.join("config.toml");
    std::fs::write(
        &config,
        format!("log_file_path = {:?}\n", log.to_string_lossy()),
    )
    .expect("write config");
    config
}

#[test]
fn prints_every_row_and_the_footer() {
    let config = temp_config("reviewfeed_cli_rows");
    let output = Command::new(env!("CARGO_BIN_EXE_reviewfeed"))
        .arg(bundled_payload())
        .arg("--config")
        .arg(&config)
        .args(["--limit", "20"])
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout.lines().count(), 46, "got: {stdout}");
    assert!(stdout.lines().last().is_some_and(|l| l.ends_with("45 отзывов")), "got: {stdout}");
    assert!(stdout.contains("Анна Иванова"), "got: {stdout}");
}

#[test]
fn runs_without_arguments_from_the_repository_root() {
    let config = temp_config("reviewfeed_cli_default");
    let output = Command::new(env!("CARGO_BIN_EXE_reviewfeed"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to execute binary");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.lines().last().is_some_and(|l| l.ends_with("45 отзывов")), "got: {stdout}");
}

#[test]
fn expand_all_removes_show_more_markers() {
    let config = temp_config("reviewfeed_cli_expand");
    let run = |extra: &[&str]| {
        let output = Command::new(env!("CARGO_BIN_EXE_reviewfeed"))
            .arg(bundled_payload())
            .arg("--config")
            .arg(&config)
            .args(extra)
            .output()
            .expect("Failed to execute binary");
        String::from_utf8_lossy(&output.stdout).into_owned()
    };

    let collapsed = run(&[]);
    let expanded = run(&["--expand-all"]);

    assert!(collapsed.contains("· ещё"), "got: {collapsed}");
    assert!(!expanded.contains("· ещё"), "got: {expanded}");
}

#[test]
fn missing_payload_fails() {
    let config = temp_config("reviewfeed_cli_missing");
    let output = Command::new(env!("CARGO_BIN_EXE_reviewfeed"))
        .arg(std::env::temp_dir().join("reviewfeed_cli_no_such_payload.json"))
        .arg("--config")
        .arg(&config)
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .to_lowercase()
            .contains("unavailable"),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
