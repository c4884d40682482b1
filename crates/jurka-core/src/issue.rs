use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueType {
    #[default]
    Task,
    Bug,
    Story,
    Spike,
}

impl IssueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Bug => "Bug",
            Self::Story => "Story",
            Self::Spike => "Spike",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "bug" => Ok(Self::Bug),
            "story" => Ok(Self::Story),
            "spike" => Ok(Self::Spike),
            other => Err(format!(
                "unknown issue type '{other}' (expected Task, Bug, Story or Spike)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssueRequest {
    pub project_key: String,
    pub summary: String,
    pub issue_type: IssueType,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub priority: Option<String>,
}

impl CreateIssueRequest {
    pub fn to_payload(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("project".to_string(), json!({ "key": self.project_key }));
        fields.insert("summary".to_string(), json!(self.summary));
        fields.insert(
            "issuetype".to_string(),
            json!({ "name": self.issue_type.as_str() }),
        );
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            fields.insert("description".to_string(), json!(description));
        }
        if !self.labels.is_empty() {
            fields.insert("labels".to_string(), json!(self.labels));
        }
        if let Some(priority) = self.priority.as_deref().filter(|p| !p.trim().is_empty()) {
            fields.insert("priority".to_string(), json!({ "name": priority.trim() }));
        }
        json!({ "fields": fields })
    }
}

fn issue_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9_]*-\d+$").expect("issue key regex"))
}

/// Upper-case and validate an issue key such as `pp-12`.
pub fn normalize_issue_key(raw: &str) -> CoreResult<String> {
    let key = raw.trim().to_uppercase();
    if issue_key_regex().is_match(&key) {
        Ok(key)
    } else {
        Err(CoreError::InvalidIssueKey(raw.to_string()))
    }
}

pub fn browse_url(base_url: &str, issue_key: &str) -> String {
    format!("{}/browse/{}", base_url.trim_end_matches('/'), issue_key)
}
