#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use jurka_core::config::ConfigStore;
use jurka_core::credentials::Credential;
use jurka_core::identity::{HandleKind, IdentityMatch};
use jurka_core::issue::CreateIssueRequest;
use jurka_core::secrets::SecretStore;
use jurka_core::tracker::TrackerClient;
use jurka_core::{CoreResult, StoreError, TrackerError};

#[derive(Debug, Default)]
pub struct StubConfigStore {
    base_url: RefCell<Option<String>>,
    reads: Cell<usize>,
}

impl StubConfigStore {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: RefCell::new(Some(base_url.to_string())),
            reads: Cell::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl ConfigStore for StubConfigStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        self.reads.set(self.reads.get() + 1);
        Ok(self.base_url.borrow().clone())
    }

    fn set(&self, base_url: &str) -> CoreResult<()> {
        *self.base_url.borrow_mut() = Some(base_url.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StubSecretStore {
    tokens: RefCell<HashMap<String, String>>,
    lookups: RefCell<Vec<String>>,
}

impl StubSecretStore {
    pub fn with_tokens(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (base_url, token) in entries {
            store
                .tokens
                .borrow_mut()
                .insert(base_url.to_string(), token.to_string());
        }
        store
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.borrow().clone()
    }
}

impl SecretStore for StubSecretStore {
    fn get(&self, base_url: &str) -> Result<Option<SecretString>, StoreError> {
        self.lookups.borrow_mut().push(base_url.to_string());
        Ok(self
            .tokens
            .borrow()
            .get(base_url)
            .cloned()
            .map(SecretString::from))
    }

    fn set(&self, base_url: &str, token: &SecretString) -> Result<(), StoreError> {
        self.tokens
            .borrow_mut()
            .insert(base_url.to_string(), token.expose_secret().to_string());
        Ok(())
    }

    fn delete(&self, base_url: &str) -> Result<(), StoreError> {
        self.tokens.borrow_mut().remove(base_url);
        Ok(())
    }
}

/// Secret store whose reads always fail, as a locked keyring would.
#[derive(Debug, Default)]
pub struct FailingSecretStore;

impl SecretStore for FailingSecretStore {
    fn get(&self, _base_url: &str) -> Result<Option<SecretString>, StoreError> {
        Err(StoreError::Keyring("keyring is locked".to_string()))
    }

    fn set(&self, _base_url: &str, _token: &SecretString) -> Result<(), StoreError> {
        Err(StoreError::Keyring("keyring is locked".to_string()))
    }

    fn delete(&self, _base_url: &str) -> Result<(), StoreError> {
        Err(StoreError::Keyring("keyring is locked".to_string()))
    }
}

#[derive(Debug, Default)]
pub struct StubTracker {
    users: Vec<IdentityMatch>,
    searches: RefCell<Vec<String>>,
    search_failure: Option<u16>,
}

impl StubTracker {
    pub fn with_users(users: Vec<IdentityMatch>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    pub fn failing_search(status: u16) -> Self {
        Self {
            search_failure: Some(status),
            ..Self::default()
        }
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.borrow().clone()
    }
}

fn not_stubbed() -> TrackerError {
    TrackerError::Transport("stub tracker does not implement this call".to_string())
}

impl TrackerClient for StubTracker {
    fn myself(&self, _credential: &Credential) -> Result<IdentityMatch, TrackerError> {
        Err(not_stubbed())
    }

    fn search_users(
        &self,
        _credential: &Credential,
        fragment: &str,
    ) -> Result<Vec<IdentityMatch>, TrackerError> {
        self.searches.borrow_mut().push(fragment.to_string());
        if let Some(status) = self.search_failure {
            return Err(TrackerError::Status {
                status,
                body: "upstream failure".to_string(),
            });
        }
        Ok(self.users.clone())
    }

    fn list_issues(
        &self,
        _credential: &Credential,
        _jql: &str,
        _limit: u32,
    ) -> Result<Value, TrackerError> {
        Err(not_stubbed())
    }

    fn get_issue(&self, _credential: &Credential, _issue_key: &str) -> Result<Value, TrackerError> {
        Err(not_stubbed())
    }

    fn create_issue(
        &self,
        _credential: &Credential,
        _request: &CreateIssueRequest,
    ) -> Result<Value, TrackerError> {
        Err(not_stubbed())
    }

    fn add_comment(
        &self,
        _credential: &Credential,
        _issue_key: &str,
        _body: &str,
    ) -> Result<Value, TrackerError> {
        Err(not_stubbed())
    }

    fn assign_issue(
        &self,
        _credential: &Credential,
        _issue_key: &str,
        _assignee: Option<&IdentityMatch>,
    ) -> Result<(), TrackerError> {
        Err(not_stubbed())
    }
}

pub fn credential() -> Credential {
    Credential::new(
        "https://jira.example.com",
        SecretString::from("test-token".to_string()),
    )
    .expect("credential")
}

pub fn cloud_user(display_name: &str, account_id: &str, email: &str) -> IdentityMatch {
    IdentityMatch {
        display_name: display_name.to_string(),
        handle: account_id.to_string(),
        kind: HandleKind::AccountId,
        username: None,
        email_address: Some(email.to_string()),
    }
}
