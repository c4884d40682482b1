use std::process::{Command, Output};

use tempfile::TempDir;

const OPEN: &str =
    r#"status in ("To Do", "Open", "In Progress", "Reopened", "In Review", "Blocked")"#;

fn bin(config_home: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_jurka"));
    command
        .env("JURKA_CONFIG_HOME", config_home.path())
        .env_remove("JIRA_BASE_URL")
        .env_remove("JIRA_BEARER_TOKEN")
        .env_remove("JURKA_LOG");
    command
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn version_prints_package_version() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home).arg("version").output().expect("run");
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("jurka {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn whoami_without_configuration_reports_missing_base_url() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home).args(["auth", "whoami"]).output().expect("run");
    assert!(!output.status.success());
    assert!(
        stderr(&output).contains("No base URL configured"),
        "stderr: {}",
        stderr(&output)
    );
}

#[test]
fn logout_without_configuration_is_a_no_op() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home).args(["auth", "logout"]).output().expect("run");
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "No base URL configured.");
}

#[test]
fn list_dry_run_prints_default_query() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .args([
            "--base-url",
            "https://jira.example.com/",
            "--token",
            "t0ken",
            "issue",
            "list",
            "-p",
            "PP",
            "--dry-run",
        ])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        format!(r#"project = "PP" AND {OPEN} ORDER BY created DESC"#)
    );
    assert!(!stdout(&output).contains("t0ken"));
    assert!(!stderr(&output).contains("t0ken"));
}

#[test]
fn list_dry_run_appends_extra_jql() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .args([
            "issue",
            "list",
            "-p",
            "PP",
            "--jql",
            "labels = foo",
            "--dry-run",
            "--base-url",
            "https://jira.example.com",
            "--token",
            "t",
        ])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        format!(r#"project = "PP" AND {OPEN} AND (labels = foo) ORDER BY created DESC"#)
    );
}

#[test]
fn list_dry_run_explicit_assignee_beats_mine() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .args([
            "issue",
            "list",
            "-p",
            "PP",
            "--all",
            "--mine",
            "--assignee",
            "jdoe",
            "--dry-run",
            "--base-url",
            "https://jira.example.com",
            "--token",
            "t",
        ])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        r#"project = "PP" AND assignee = "jdoe" ORDER BY created DESC"#
    );
}

#[test]
fn list_dry_run_empty_assignee_lists_unassigned() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .args([
            "issue",
            "list",
            "-p",
            "PP",
            "--all",
            "--assignee",
            "",
            "--dry-run",
            "--base-url",
            "https://jira.example.com",
            "--token",
            "t",
        ])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        r#"project = "PP" AND assignee is EMPTY ORDER BY created DESC"#
    );
}

#[test]
fn list_rejects_zero_limit() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .args([
            "issue",
            "list",
            "-p",
            "PP",
            "-n",
            "0",
            "--dry-run",
            "--base-url",
            "https://jira.example.com",
            "--token",
            "t",
        ])
        .output()
        .expect("run");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("limit must be greater than zero"));
}

#[test]
fn open_print_uses_environment_base_url() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .env("JIRA_BASE_URL", "https://env.example.com/")
        .args(["issue", "open", "pp-42", "--no-validate", "--print"])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "https://env.example.com/browse/PP-42"
    );
}

#[test]
fn open_print_prefers_override_over_environment() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .env("JIRA_BASE_URL", "https://env.example.com")
        .args([
            "--base-url",
            "https://override.example.com",
            "issue",
            "open",
            "PP-1",
            "--no-validate",
            "--print",
        ])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "https://override.example.com/browse/PP-1"
    );
}

#[test]
fn open_print_reads_saved_config() {
    let home = TempDir::new().expect("tempdir");
    std::fs::write(
        home.path().join("config.toml"),
        "base_url = \"https://saved.example.com\"\n",
    )
    .expect("config");
    let output = bin(&home)
        .args(["issue", "open", "PP-7", "--no-validate", "--print"])
        .output()
        .expect("run");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "https://saved.example.com/browse/PP-7"
    );
}

#[test]
fn open_rejects_malformed_issue_key() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .args([
            "--base-url",
            "https://jira.example.com",
            "issue",
            "open",
            "not a key",
            "--no-validate",
            "--print",
        ])
        .output()
        .expect("run");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid issue key"));
}

#[test]
fn assign_rejects_multiple_identity_flags() {
    let home = TempDir::new().expect("tempdir");
    let output = bin(&home)
        .args([
            "--base-url",
            "https://jira.example.com",
            "--token",
            "t",
            "issue",
            "assign",
            "PP-1",
            "--email",
            "jane@example.com",
            "--user",
            "jdoe",
        ])
        .output()
        .expect("run");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("use only one of"));
}
