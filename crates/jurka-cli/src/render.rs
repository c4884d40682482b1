use std::fmt::Write as _;

use chrono::DateTime;
use serde_json::Value;

use jurka_core::identity::{HandleKind, IdentityMatch};

const KEY_WIDTH: usize = 11;
const TYPE_WIDTH: usize = 8;
const STATUS_WIDTH: usize = 12;
const PRIORITY_WIDTH: usize = 8;
const ASSIGNEE_WIDTH: usize = 18;
const UPDATED_WIDTH: usize = 16;

pub fn principal_line(principal: &IdentityMatch) -> String {
    if principal.display_name == principal.handle {
        principal.handle.clone()
    } else {
        format!("{} ({})", principal.display_name, principal.handle)
    }
}

pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Jira timestamps look like `2024-05-01T10:22:33.000+0000`.
pub fn format_updated(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|parsed| parsed.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn user_table(users: &[IdentityMatch]) -> String {
    let mut out = String::new();
    let header = format!(
        "{:<40}  {:<20}  {:<30}  EMAIL",
        "ACCOUNT ID", "USERNAME", "DISPLAY NAME"
    );
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(header.len()));
    for user in users {
        let account_id = match user.kind {
            HandleKind::AccountId => user.handle.as_str(),
            HandleKind::Username => "",
        };
        let username = user.username.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "{:<40}  {:<20}  {:<30}  {}",
            account_id,
            username,
            user.display_name,
            user.email_address.as_deref().unwrap_or("")
        );
    }
    out
}

fn field_name<'a>(fields: &'a Value, field: &str) -> &'a str {
    fields
        .get(field)
        .and_then(|value| value.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("")
}

pub fn issue_table(result: &Value) -> String {
    let issues = result
        .get("issues")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    if issues.is_empty() {
        return "No issues found.\n".to_string();
    }
    let mut out = String::new();
    let header = format!(
        "{:<KEY_WIDTH$}  {:<TYPE_WIDTH$}  {:<STATUS_WIDTH$}  {:<PRIORITY_WIDTH$}  {:<ASSIGNEE_WIDTH$}  {:<UPDATED_WIDTH$}  SUMMARY",
        "KEY", "TYPE", "STATUS", "PRIORITY", "ASSIGNEE", "UPDATED"
    );
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));
    for issue in issues {
        let key = issue.get("key").and_then(Value::as_str).unwrap_or("");
        let fields = issue.get("fields").unwrap_or(&Value::Null);
        let summary = fields.get("summary").and_then(Value::as_str).unwrap_or("");
        let assignee = fields
            .get("assignee")
            .and_then(|assignee| {
                assignee
                    .get("displayName")
                    .or_else(|| assignee.get("name"))
                    .and_then(Value::as_str)
            })
            .unwrap_or("");
        let updated = fields
            .get("updated")
            .and_then(Value::as_str)
            .map(format_updated)
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<KEY_WIDTH$}  {:<TYPE_WIDTH$}  {:<STATUS_WIDTH$}  {:<PRIORITY_WIDTH$}  {:<ASSIGNEE_WIDTH$}  {:<UPDATED_WIDTH$}  {}",
            truncate(key, KEY_WIDTH),
            truncate(field_name(fields, "issuetype"), TYPE_WIDTH),
            truncate(field_name(fields, "status"), STATUS_WIDTH),
            truncate(field_name(fields, "priority"), PRIORITY_WIDTH),
            truncate(assignee, ASSIGNEE_WIDTH),
            truncate(&updated, UPDATED_WIDTH),
            summary
        );
    }
    let total = result
        .get("total")
        .and_then(Value::as_u64)
        .unwrap_or(issues.len() as u64);
    let _ = writeln!(
        out,
        "\nShowing {} of ~{} matching issues.",
        issues.len(),
        total
    );
    out
}
