//! Pending workout hand-off.
//!
//! The library (or any other producer) queues ZWO XML here and the player
//! consumes it on its next start. The slot holds at most one workout and reading
//! it deletes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::config::get_data_dir;

const SLOT_FILE_NAME: &str = "pending_workout.toml";

/// A workout waiting to be played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWorkout {
    /// Display name of the queued workout
    pub name: String,
    /// ZWO document
    pub xml: String,
    /// When it was queued
    pub queued_at: DateTime<Utc>,
}

/// Single consume-once slot stored as a TOML file.
#[derive(Debug, Clone)]
pub struct HandoffSlot {
    path: PathBuf,
}

impl HandoffSlot {
    /// Slot backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Slot in the application data directory.
    pub fn default_location() -> Self {
        Self::new(get_data_dir().join(SLOT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a workout is waiting.
    pub fn is_pending(&self) -> bool {
        self.path.exists()
    }

    /// Store a workout, replacing whatever was queued before.
    pub fn queue(&self, name: &str, xml: &str) -> Result<(), HandoffError> {
        let pending = PendingWorkout {
            name: name.to_string(),
            xml: xml.to_string(),
            queued_at: Utc::now(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HandoffError::IoError(e.to_string()))?;
        }

        let content = toml::to_string_pretty(&pending)
            .map_err(|e| HandoffError::SerializeError(e.to_string()))?;

        std::fs::write(&self.path, content).map_err(|e| HandoffError::IoError(e.to_string()))?;

        tracing::debug!("Queued pending workout at {}", self.path.display());
        Ok(())
    }

    /// Remove and return the queued workout, if any.
    ///
    /// The file is deleted before its content is decoded, so a corrupt slot is
    /// cleared as well.
    pub fn take(&self) -> Result<Option<PendingWorkout>, HandoffError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(HandoffError::IoError(e.to_string())),
        };

        self.clear()?;

        let pending: PendingWorkout =
            toml::from_str(&content).map_err(|e| HandoffError::ParseError(e.to_string()))?;

        tracing::debug!("Took pending workout '{}'", pending.name);
        Ok(Some(pending))
    }

    /// Delete the slot file. Missing files are fine.
    pub fn clear(&self) -> Result<(), HandoffError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HandoffError::IoError(e.to_string())),
        }
    }
}

/// Pending slot errors.
#[derive(Debug, thiserror::Error)]
pub enum HandoffError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
