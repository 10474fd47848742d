// Subscriber sessions and the store that designates one of them as active.
// The dispatcher only ever holds a shared handle (`Arc<Session>`) to the
// active session for the duration of one menu iteration.

use crate::error::CollaboratorError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionKind {
    Prepaid,
    Postpaid,
    Other(String),
}

impl From<String> for SubscriptionKind {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PREPAID" => Self::Prepaid,
            "POSTPAID" => Self::Postpaid,
            _ => Self::Other(raw),
        }
    }
}

impl From<SubscriptionKind> for String {
    fn from(kind: SubscriptionKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for SubscriptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepaid => f.write_str("PREPAID"),
            Self::Postpaid => f.write_str("POSTPAID"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// Opaque token bundle obtained by the (external) login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    pub id_token: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub number: String,
    pub subscription_type: SubscriptionKind,
    pub tokens: Tokens,
    pub subscriber_id: String,
}

/// Holds zero or more sessions, at most one of them active.
pub trait SessionStore {
    fn get_active(&self) -> Option<Arc<Session>>;

    /// Make `session` the active one, adding it to the store if unknown.
    fn set_active(&mut self, session: Arc<Session>) -> Result<(), CollaboratorError>;

    fn list(&self) -> Vec<Arc<Session>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionsFile {
    active: Option<String>,
    #[serde(default)]
    sessions: Vec<Session>,
}

/// Session store persisted as `sessions.json` inside the data directory.
pub struct FileSessionStore {
    path: PathBuf,
    active: Option<String>,
    sessions: Vec<Arc<Session>>,
}

impl FileSessionStore {
    pub const FILE_NAME: &'static str = "sessions.json";

    /// Load the store from `data_dir`. A missing file is an empty store.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(Self::FILE_NAME);
        let file = if path.exists() {
            let data = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<SessionsFile>(&data)
                .with_context(|| format!("Parsing sessions file {}", path.display()))?
        } else {
            SessionsFile::default()
        };
        tracing::debug!(
            path = %path.display(),
            count = file.sessions.len(),
            "session store loaded"
        );
        Ok(Self {
            path,
            active: file.active,
            sessions: file.sessions.into_iter().map(Arc::new).collect(),
        })
    }

    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let file = SessionsFile {
            active: self.active.clone(),
            sessions: self.sessions.iter().map(|s| Session::clone(s)).collect(),
        };
        let data = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get_active(&self) -> Option<Arc<Session>> {
        let number = self.active.as_deref()?;
        self.sessions.iter().find(|s| s.number == number).cloned()
    }

    fn set_active(&mut self, session: Arc<Session>) -> Result<(), CollaboratorError> {
        if !self.sessions.iter().any(|s| s.number == session.number) {
            self.sessions.push(Arc::clone(&session));
        }
        self.active = Some(session.number.clone());
        tracing::info!(number = %session.number, "active session changed");
        self.persist()
            .map_err(|e| CollaboratorError::transient(format!("{:#}", e)))
    }

    fn list(&self) -> Vec<Arc<Session>> {
        self.sessions.clone()
    }
}
