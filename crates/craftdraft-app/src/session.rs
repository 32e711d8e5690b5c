//! Replay of recorded input sessions against a headless editor.

use craftdraft_core::{Document, Editor, EngineConfig, InputEvent, MemoryKernel, Warning};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid session script: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A starting document and the input events to feed the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Document to start from; an empty one with the default layer if absent.
    #[serde(default)]
    pub document: Option<Document>,
    pub events: Vec<InputEvent>,
}

/// What a replay produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub document: Document,
    pub warnings: Vec<Warning>,
    pub revision: u64,
    pub events: usize,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Feed every event to a fresh editor backed by the in-memory kernel.
    pub fn replay(&self, config: &EngineConfig) -> SessionReport {
        let document = self.document.clone().unwrap_or_else(Document::new);
        let mut editor = Editor::new(Box::new(MemoryKernel::new()), document, config.clone());
        let mut warnings = Vec::new();
        for (i, event) in self.events.iter().enumerate() {
            log::debug!("Event {i}: {event:?}");
            editor.handle(event.clone());
            warnings.extend(editor.take_warnings());
        }
        log::info!(
            "Replayed {} events, {} warnings, {} entities",
            self.events.len(),
            warnings.len(),
            editor.store().document().entities.len()
        );
        SessionReport {
            document: editor.store().document().clone(),
            warnings,
            revision: editor.store().revision(),
            events: self.events.len(),
        }
    }
}
