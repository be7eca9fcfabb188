//! Local working copy of a composition session.
//!
//! The CLI is one process per command, so the session (jobs, clusters, route,
//! gesture in progress) is kept as pretty JSON between invocations. This is a
//! scratch file, not the system of record.

use std::path::PathBuf;

use super::{data_dir, Config};
use crate::error::Result;
use crate::session::Session;

/// Session state file name.
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store in the data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::at(data_dir()?.join(SESSION_FILE)))
    }

    /// Store at a specific path (for testing).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the saved session, or start a fresh one if none exists.
    pub fn load(&self, config: &Config) -> Result<Session> {
        if !self.path.exists() {
            return Ok(Session::new(config));
        }
        let content = std::fs::read_to_string(&self.path)?;
        let mut session: Session = serde_json::from_str(&content)?;
        session.apply_config(config);
        Ok(session)
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;

    #[test]
    fn missing_file_yields_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join(SESSION_FILE));
        let session = store.load(&Config::default()).unwrap();
        assert!(session.jobs().is_empty());
        assert!(!session.draw_mode());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join(SESSION_FILE));
        let mut session = Session::default();
        session.replace_jobs(vec![Job::new("j1", "First")]);
        session.add_to_route("j1").unwrap();
        store.save(&session).unwrap();

        let mut config = Config::default();
        config.route.default_job_minutes = 10;
        let loaded = store.load(&config).unwrap();
        assert_eq!(loaded.jobs().len(), 1);
        assert_eq!(loaded.route().estimate_duration(), 10);
    }
}
