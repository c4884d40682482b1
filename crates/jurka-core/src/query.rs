//! JQL construction for `issue list`.
//!
//! Clauses are appended in a fixed order (project, status, assignee, extra)
//! and joined with `AND`; the ordering clause always comes last.

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::identity::{DisambiguationPolicy, IdentityMatch, IdentityQuery, IdentityResolver};

/// Status names treated as open when `include_all_statuses` is off.
pub const OPEN_STATUSES: [&str; 6] = [
    "To Do",
    "Open",
    "In Progress",
    "Reopened",
    "In Review",
    "Blocked",
];

pub const ORDER_BY: &str = "ORDER BY created DESC";
pub const UNASSIGNED_CLAUSE: &str = "assignee is EMPTY";
pub const DEFAULT_LIMIT: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilters {
    pub project: String,
    pub mine: bool,
    pub include_all_statuses: bool,
    /// `Some("")` means "unassigned"; `None` means no assignee filter.
    pub assignee_raw: Option<String>,
    pub extra_query: Option<String>,
    pub limit: u32,
}

impl ListFilters {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            mine: false,
            include_all_statuses: false,
            assignee_raw: None,
            extra_query: None,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.project.trim().is_empty() {
            return Err(CoreError::InvalidQueryState(
                "project key is required".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(CoreError::InvalidQueryState(
                "limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// True when the filters need the caller's own identity resolved.
    pub fn needs_current_principal(&self) -> bool {
        self.mine && self.assignee_raw.is_none()
    }
}

/// Quote a JQL string literal.
pub fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn open_status_clause() -> String {
    let statuses: Vec<String> = OPEN_STATUSES.iter().map(|status| quote(status)).collect();
    format!("status in ({})", statuses.join(", "))
}

pub struct QueryBuilder<'a> {
    identities: &'a IdentityResolver<'a>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(identities: &'a IdentityResolver<'a>) -> Self {
        Self { identities }
    }

    pub fn build(
        &self,
        filters: &ListFilters,
        current_principal: Option<&IdentityMatch>,
    ) -> CoreResult<String> {
        filters.validate()?;
        let mut clauses: Vec<String> = Vec::new();

        clauses.push(format!("project = {}", quote(filters.project.trim())));

        if !filters.include_all_statuses {
            clauses.push(open_status_clause());
        }

        if let Some(clause) = self.assignee_clause(filters, current_principal)? {
            clauses.push(clause);
        }

        if let Some(extra) = filters
            .extra_query
            .as_deref()
            .filter(|extra| !extra.trim().is_empty())
        {
            clauses.push(format!("({extra})"));
        }

        let jql = format!("{} {ORDER_BY}", clauses.join(" AND "));
        debug!(jql = %jql, "built issue query");
        Ok(jql)
    }

    fn assignee_clause(
        &self,
        filters: &ListFilters,
        current_principal: Option<&IdentityMatch>,
    ) -> CoreResult<Option<String>> {
        // An explicit assignee, even an empty one, takes precedence over `mine`.
        if let Some(raw) = filters.assignee_raw.as_deref() {
            if raw.trim().is_empty() {
                return Ok(Some(UNASSIGNED_CLAUSE.to_string()));
            }
            let resolved = self.identities.resolve(
                &IdentityQuery::classify(raw),
                DisambiguationPolicy::FailOnMultiple,
            )?;
            return Ok(Some(format!("assignee = {}", quote(&resolved.handle))));
        }
        if filters.mine {
            let principal = current_principal.ok_or_else(|| {
                CoreError::InvalidQueryState(
                    "filtering by mine requires the current principal".to_string(),
                )
            })?;
            return Ok(Some(format!("assignee = {}", quote(&principal.handle))));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quote_escapes_quotes_and_backslashes() {
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn open_status_clause_lists_every_open_status() {
        assert_eq!(
            open_status_clause(),
            r#"status in ("To Do", "Open", "In Progress", "Reopened", "In Review", "Blocked")"#
        );
    }

    #[test]
    fn validate_rejects_blank_project_and_zero_limit() {
        assert!(ListFilters::new("  ").validate().is_err());
        let mut filters = ListFilters::new("PP");
        filters.limit = 0;
        assert!(filters.validate().is_err());
    }

    #[test]
    fn principal_needed_only_for_mine_without_assignee() {
        let mut filters = ListFilters::new("PP");
        assert!(!filters.needs_current_principal());
        filters.mine = true;
        assert!(filters.needs_current_principal());
        filters.assignee_raw = Some("jdoe".to_string());
        assert!(!filters.needs_current_principal());
    }
}
