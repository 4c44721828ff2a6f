//! File-backed persistence for the portal.
//!
//! The [`Storage`] struct owns a data directory holding two JSON files:
//!
//! - `contributions.json`: the contribution collection, wrapped in a
//!   versioned snapshot envelope
//! - `session.json`: the signed-in user, if any
//!
//! Every write goes to a sibling temp file first and is then renamed over
//! the target, so a crash never leaves a half-written snapshot behind.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use kmportal_shared::{CURRENT_SCHEMA_VERSION, KnowledgeContribution, PortalError, Result, User};

const CONTRIBUTIONS_FILE: &str = "contributions.json";
const SESSION_FILE: &str = "session.json";

/// On-disk envelope for the contribution collection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    schema_version: u32,
    contributions: Vec<KnowledgeContribution>,
}

/// Handle on the portal's data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open the data directory at `root`, creating it if needed.
    pub fn open(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|e| PortalError::io(root, e))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contributions_path(&self) -> PathBuf {
        self.root.join(CONTRIBUTIONS_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    // -----------------------------------------------------------------------
    // Contributions
    // -----------------------------------------------------------------------

    /// Load the saved collection. `None` when nothing has been saved yet.
    pub fn load_contributions(&self) -> Result<Option<Vec<KnowledgeContribution>>> {
        let path = self.contributions_path();
        let Some(content) = read_if_exists(&path)? else {
            return Ok(None);
        };

        let snapshot: Snapshot = serde_json::from_str(&content).map_err(|e| {
            PortalError::Serialization(format!("{}: {e}", path.display()))
        })?;
        if snapshot.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(PortalError::Serialization(format!(
                "{}: unsupported schema version {} (expected {CURRENT_SCHEMA_VERSION})",
                path.display(),
                snapshot.schema_version
            )));
        }

        debug!(count = snapshot.contributions.len(), "contributions loaded");
        Ok(Some(snapshot.contributions))
    }

    /// Replace the saved collection.
    pub fn save_contributions(&self, contributions: &[KnowledgeContribution]) -> Result<()> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SnapshotRef<'a> {
            schema_version: u32,
            contributions: &'a [KnowledgeContribution],
        }

        let json = serde_json::to_string_pretty(&SnapshotRef {
            schema_version: CURRENT_SCHEMA_VERSION,
            contributions,
        })?;
        write_atomic(&self.contributions_path(), &json)?;
        debug!(count = contributions.len(), "contributions saved");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// The signed-in user, if any.
    ///
    /// A session file that fails to parse is deleted and treated as
    /// signed out.
    pub fn load_session(&self) -> Result<Option<User>> {
        let path = self.session_path();
        let Some(content) = read_if_exists(&path)? else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&content) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding corrupt session");
                remove_if_exists(&path)?;
                Ok(None)
            }
        }
    }

    pub fn save_session(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string_pretty(user)?;
        write_atomic(&self.session_path(), &json)?;
        debug!(user = %user.id, "session saved");
        Ok(())
    }

    /// Sign out. Returns whether a session existed.
    pub fn clear_session(&self) -> Result<bool> {
        remove_if_exists(&self.session_path())
    }
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PortalError::io(path, e)),
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PortalError::io(path, e)),
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("snapshot");
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::now_v7()));

    std::fs::write(&tmp, content).map_err(|e| PortalError::io(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(PortalError::io(path, e));
    }
    Ok(())
}
