//! In-memory session store.
//!
//! A session is one exposé in the making: staged uploads, pasted text,
//! the extracted markdown and the user's edited copy. Sessions live only
//! in memory and expire after a period of inactivity; their staged files
//! are removed by the sweeper in the server loop.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::orchestrator::Extraction;
use crate::ingest::duplicate::DuplicateStatus;
use crate::ingest::format::{FileCategory, UploadKind};

/// Sessions idle longer than this are swept.
pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Upload cap per session — generous for a casting dossier.
pub const MAX_UPLOADS_PER_SESSION: usize = 40;

/// One staged upload with everything the API reports about it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedUpload {
    pub file_id: Uuid,
    pub original_name: String,
    pub kind: UploadKind,
    pub category: FileCategory,
    pub mime_type: String,
    pub size_bytes: u64,
    pub hash: String,
    pub duplicate: DuplicateStatus,
    #[serde(skip)]
    pub path: PathBuf,
    pub received_at: chrono::NaiveDateTime,
}

/// One exposé in the making.
pub struct ExposeSession {
    pub session_id: Uuid,
    pub created_at: chrono::NaiveDateTime,
    pub uploads: Vec<StagedUpload>,
    pub manual_text: String,
    pub extracted: Option<Extraction>,
    pub edited: Option<String>,
    last_activity: Instant,
}

impl ExposeSession {
    fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            created_at: chrono::Local::now().naive_local(),
            uploads: Vec::new(),
            manual_text: String::new(),
            extracted: None,
            edited: None,
            last_activity: Instant::now(),
        }
    }

    /// The markdown the export uses: the edited copy when the user
    /// touched it, otherwise the raw extraction.
    pub fn working_copy(&self) -> Option<&str> {
        self.edited
            .as_deref()
            .or(self.extracted.as_ref().map(|e| e.markdown.as_str()))
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

/// All live sessions, keyed by ID.
pub struct SessionStore {
    sessions: HashMap<Uuid, ExposeSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            ttl,
        }
    }

    /// Create a fresh session and return its ID.
    pub fn create(&mut self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(id, ExposeSession::new(id));
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&ExposeSession> {
        self.sessions.get(id)
    }

    /// Get a session mutably, refreshing its activity timestamp.
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut ExposeSession> {
        let session = self.sessions.get_mut(id)?;
        session.touch();
        Some(session)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<ExposeSession> {
        self.sessions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle past the TTL; returns their IDs so the caller
    /// can clean up staged files.
    pub fn sweep_expired(&mut self) -> Vec<Uuid> {
        let ttl = self.ttl;
        let expired: Vec<Uuid> = self
            .sessions
            .values()
            .filter(|s| s.idle() > ttl)
            .map(|s| s.session_id)
            .collect();
        for id in &expired {
            self.sessions.remove(id);
        }
        expired
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_get_session() {
        let mut store = SessionStore::new();
        let id = store.create();
        assert!(store.get(&id).is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_id_is_none() {
        let store = SessionStore::new();
        assert!(store.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn working_copy_prefers_edited() {
        let mut store = SessionStore::new();
        let id = store.create();
        let session = store.get_mut(&id).unwrap();

        assert!(session.working_copy().is_none());

        session.extracted = Some(Extraction {
            markdown: "## ROH".into(),
            model_used: "m".into(),
            confidence: 0.8,
            extracted_at: chrono::Local::now().naive_local(),
        });
        assert_eq!(session.working_copy(), Some("## ROH"));

        session.edited = Some("## ÜBERARBEITET".into());
        assert_eq!(session.working_copy(), Some("## ÜBERARBEITET"));
    }

    #[test]
    fn sweep_removes_only_expired() {
        let mut store = SessionStore::with_ttl(Duration::from_millis(10));
        let old = store.create();
        std::thread::sleep(Duration::from_millis(25));
        let fresh = store.create();

        let expired = store.sweep_expired();
        assert_eq!(expired, vec![old]);
        assert!(store.get(&old).is_none());
        assert!(store.get(&fresh).is_some());
    }

    #[test]
    fn get_mut_refreshes_activity() {
        let mut store = SessionStore::with_ttl(Duration::from_millis(40));
        let id = store.create();
        std::thread::sleep(Duration::from_millis(25));
        store.get_mut(&id).unwrap();
        std::thread::sleep(Duration::from_millis(25));

        // Touched halfway through, so still under the TTL
        assert!(store.sweep_expired().is_empty());
        assert!(store.get(&id).is_some());
    }

    #[test]
    fn remove_returns_session() {
        let mut store = SessionStore::new();
        let id = store.create();
        let session = store.remove(&id).unwrap();
        assert_eq!(session.session_id, id);
        assert!(store.is_empty());
    }
}
