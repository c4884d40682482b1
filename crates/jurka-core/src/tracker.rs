use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::credentials::Credential;
use crate::error::TrackerError;
use crate::identity::{HandleKind, IdentityMatch};
use crate::issue::CreateIssueRequest;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fields requested for `list_issues`; enough to render the issue table.
pub const LIST_FIELDS: [&str; 7] = [
    "key",
    "summary",
    "issuetype",
    "status",
    "assignee",
    "priority",
    "updated",
];

/// HTTP surface of the issue tracker. Implementations never retry.
pub trait TrackerClient {
    fn myself(&self, credential: &Credential) -> Result<IdentityMatch, TrackerError>;
    fn search_users(
        &self,
        credential: &Credential,
        fragment: &str,
    ) -> Result<Vec<IdentityMatch>, TrackerError>;
    fn list_issues(
        &self,
        credential: &Credential,
        jql: &str,
        limit: u32,
    ) -> Result<Value, TrackerError>;
    fn get_issue(&self, credential: &Credential, issue_key: &str) -> Result<Value, TrackerError>;
    fn create_issue(
        &self,
        credential: &Credential,
        request: &CreateIssueRequest,
    ) -> Result<Value, TrackerError>;
    fn add_comment(
        &self,
        credential: &Credential,
        issue_key: &str,
        body: &str,
    ) -> Result<Value, TrackerError>;
    /// `None` clears the assignee.
    fn assign_issue(
        &self,
        credential: &Credential,
        issue_key: &str,
        assignee: Option<&IdentityMatch>,
    ) -> Result<(), TrackerError>;
}

/// User record as returned by `/myself` and `/user/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerUser {
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

impl TrackerUser {
    /// Cloud deployments identify users by `accountId`, Server/DC by `name`.
    pub fn into_match(self) -> Option<IdentityMatch> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.trim().is_empty());
        let username = non_empty(self.name);
        let (handle, kind) = match (non_empty(self.account_id), username.clone()) {
            (Some(account_id), _) => (account_id, HandleKind::AccountId),
            (None, Some(name)) => (name, HandleKind::Username),
            (None, None) => return None,
        };
        Some(IdentityMatch {
            display_name: non_empty(self.display_name).unwrap_or_else(|| handle.clone()),
            handle,
            kind,
            username,
            email_address: non_empty(self.email_address),
        })
    }
}

/// Jira flavour behind a base URL, as far as it affects request shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    Cloud,
    Server,
}

impl Deployment {
    /// Atlassian-hosted sites live under `atlassian.net` (or the legacy `jira.com`).
    pub fn detect(base_url: &str) -> Self {
        let host = reqwest::Url::parse(base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_ascii_lowercase));
        match host {
            Some(host)
                if host.ends_with(".atlassian.net") || host.ends_with(".jira.com") =>
            {
                Self::Cloud
            }
            _ => Self::Server,
        }
    }
}

/// Cloud rejects `username` under GDPR strict mode; Server/DC ignores `query`.
pub fn user_search_params(deployment: Deployment, fragment: &str) -> Vec<(&'static str, &str)> {
    match deployment {
        Deployment::Cloud => vec![("query", fragment)],
        Deployment::Server => vec![("username", fragment)],
    }
}

pub fn assignee_payload(assignee: Option<&IdentityMatch>) -> Value {
    match assignee {
        Some(user) if user.kind == HandleKind::AccountId => json!({ "accountId": user.handle }),
        Some(user) => json!({ "name": user.handle }),
        None => json!({ "name": Value::Null, "accountId": Value::Null }),
    }
}

pub fn search_payload(jql: &str, limit: u32) -> Value {
    json!({
        "jql": jql,
        "startAt": 0,
        "maxResults": limit,
        "fields": LIST_FIELDS,
    })
}

/// Jira REST v2 client using bearer authentication.
#[derive(Debug, Clone)]
pub struct HttpTrackerClient {
    client: Client,
}

impl HttpTrackerClient {
    pub fn new() -> Result<Self, TrackerError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TrackerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|error| {
                TrackerError::Transport(format!("failed to build HTTP client: {error}"))
            })?;
        Ok(Self { client })
    }

    fn authorized(&self, request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.bearer_auth(credential.token().expose_secret())
    }

    fn send(&self, request: RequestBuilder) -> Result<String, TrackerError> {
        let response = request
            .send()
            .map_err(|error| TrackerError::Transport(error.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|error| TrackerError::Transport(format!("response read failed: {error}")))?;
        if !status.is_success() {
            return Err(TrackerError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn request_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TrackerError> {
        let body = self.send(request)?;
        serde_json::from_str(&body).map_err(|error| TrackerError::Malformed(error.to_string()))
    }
}

impl TrackerClient for HttpTrackerClient {
    fn myself(&self, credential: &Credential) -> Result<IdentityMatch, TrackerError> {
        let request = self.client.get(credential.endpoint("rest/api/2/myself"));
        let user: TrackerUser = self.request_json(self.authorized(request, credential))?;
        user.into_match().ok_or_else(|| {
            TrackerError::Malformed("myself response has neither accountId nor name".to_string())
        })
    }

    fn search_users(
        &self,
        credential: &Credential,
        fragment: &str,
    ) -> Result<Vec<IdentityMatch>, TrackerError> {
        let deployment = Deployment::detect(credential.base_url());
        let request = self
            .client
            .get(credential.endpoint("rest/api/2/user/search"))
            .query(&user_search_params(deployment, fragment));
        let users: Vec<TrackerUser> = self.request_json(self.authorized(request, credential))?;
        Ok(users
            .into_iter()
            .filter_map(TrackerUser::into_match)
            .collect())
    }

    fn list_issues(
        &self,
        credential: &Credential,
        jql: &str,
        limit: u32,
    ) -> Result<Value, TrackerError> {
        let request = self
            .client
            .post(credential.endpoint("rest/api/2/search"))
            .json(&search_payload(jql, limit));
        self.request_json(self.authorized(request, credential))
    }

    fn get_issue(&self, credential: &Credential, issue_key: &str) -> Result<Value, TrackerError> {
        let request = self
            .client
            .get(credential.endpoint(&format!("rest/api/2/issue/{issue_key}")));
        self.request_json(self.authorized(request, credential))
    }

    fn create_issue(
        &self,
        credential: &Credential,
        request: &CreateIssueRequest,
    ) -> Result<Value, TrackerError> {
        let http = self
            .client
            .post(credential.endpoint("rest/api/2/issue"))
            .json(&request.to_payload());
        self.request_json(self.authorized(http, credential))
    }

    fn add_comment(
        &self,
        credential: &Credential,
        issue_key: &str,
        body: &str,
    ) -> Result<Value, TrackerError> {
        let request = self
            .client
            .post(credential.endpoint(&format!("rest/api/2/issue/{issue_key}/comment")))
            .json(&json!({ "body": body }));
        self.request_json(self.authorized(request, credential))
    }

    fn assign_issue(
        &self,
        credential: &Credential,
        issue_key: &str,
        assignee: Option<&IdentityMatch>,
    ) -> Result<(), TrackerError> {
        let request = self
            .client
            .put(credential.endpoint(&format!("rest/api/2/issue/{issue_key}/assignee")))
            .json(&assignee_payload(assignee));
        self.send(self.authorized(request, credential)).map(|_| ())
    }
}
