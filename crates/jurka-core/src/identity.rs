//! Turning a human-supplied user reference into the handle the tracker expects.

use serde::Serialize;
use tracing::debug;

use crate::credentials::Credential;
use crate::error::{CoreError, CoreResult};
use crate::tracker::TrackerClient;

/// One user reference. `AccountId` and `Username` are taken literally;
/// `EmailFragment` goes through the tracker's user search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityQuery {
    AccountId(String),
    Username(String),
    EmailFragment(String),
}

impl IdentityQuery {
    /// Build a query from optional CLI-style parts. Exactly one part must be non-empty.
    pub fn from_parts(
        account_id: Option<&str>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> CoreResult<Self> {
        let present = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        match (present(account_id), present(username), present(email)) {
            (Some(value), None, None) => Ok(Self::AccountId(value)),
            (None, Some(value), None) => Ok(Self::Username(value)),
            (None, None, Some(value)) => Ok(Self::EmailFragment(value)),
            (None, None, None) => Err(CoreError::InvalidQueryState(
                "provide one of: account id, username, or email".to_string(),
            )),
            _ => Err(CoreError::InvalidQueryState(
                "use only one of: account id, username, or email".to_string(),
            )),
        }
    }

    /// A raw assignee string containing `@` is searched as an email fragment;
    /// anything else is a literal username.
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim().to_string();
        if trimmed.contains('@') {
            Self::EmailFragment(trimmed)
        } else {
            Self::Username(trimmed)
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::AccountId(value) | Self::Username(value) | Self::EmailFragment(value) => value,
        }
    }
}

/// Which field of the tracker's user record the handle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleKind {
    AccountId,
    Username,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityMatch {
    pub display_name: String,
    pub handle: String,
    pub kind: HandleKind,
    /// Server/DC login name, kept for display even when `handle` is an account id.
    pub username: Option<String>,
    pub email_address: Option<String>,
}

impl IdentityMatch {
    pub fn literal(handle: &str, kind: HandleKind) -> Self {
        Self {
            display_name: handle.to_string(),
            handle: handle.to_string(),
            kind,
            username: (kind == HandleKind::Username).then(|| handle.to_string()),
            email_address: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisambiguationPolicy {
    #[default]
    FailOnMultiple,
    /// Take the first result in the tracker's order. That order is not stable
    /// across tracker versions.
    TakeFirst,
}

/// Collapse search results to one match.
///
/// With `prefer_exact_email`, a single candidate whose email equals the
/// fragment (ignoring case) wins outright; several exact matches are
/// disambiguated among themselves.
pub fn disambiguate(
    fragment: &str,
    candidates: Vec<IdentityMatch>,
    policy: DisambiguationPolicy,
    prefer_exact_email: bool,
) -> CoreResult<IdentityMatch> {
    let candidates = if prefer_exact_email {
        let exact: Vec<IdentityMatch> = candidates
            .iter()
            .filter(|candidate| {
                candidate
                    .email_address
                    .as_deref()
                    .map(|email| email.eq_ignore_ascii_case(fragment))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        if exact.is_empty() {
            candidates
        } else {
            exact
        }
    } else {
        candidates
    };

    if candidates.len() > 1 && policy == DisambiguationPolicy::FailOnMultiple {
        return Err(CoreError::AmbiguousIdentity {
            fragment: fragment.to_string(),
            candidates,
        });
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::IdentityNotFound(fragment.to_string()))
}

pub struct IdentityResolver<'a> {
    tracker: &'a dyn TrackerClient,
    credential: &'a Credential,
    prefer_exact_email: bool,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(tracker: &'a dyn TrackerClient, credential: &'a Credential) -> Self {
        Self {
            tracker,
            credential,
            prefer_exact_email: false,
        }
    }

    pub fn prefer_exact_email(mut self, enabled: bool) -> Self {
        self.prefer_exact_email = enabled;
        self
    }

    pub fn resolve(
        &self,
        query: &IdentityQuery,
        policy: DisambiguationPolicy,
    ) -> CoreResult<IdentityMatch> {
        match query {
            IdentityQuery::AccountId(value) => {
                debug!(handle = %value, "using literal account id");
                Ok(IdentityMatch::literal(value, HandleKind::AccountId))
            }
            IdentityQuery::Username(value) => {
                debug!(handle = %value, "using literal username");
                Ok(IdentityMatch::literal(value, HandleKind::Username))
            }
            IdentityQuery::EmailFragment(fragment) => {
                let candidates = self.tracker.search_users(self.credential, fragment)?;
                debug!(
                    fragment = %fragment,
                    candidates = candidates.len(),
                    policy = ?policy,
                    "user search returned"
                );
                disambiguate(fragment, candidates, policy, self.prefer_exact_email)
            }
        }
    }
}
