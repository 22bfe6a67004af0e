use super::WorkflowDocument;
use crate::error::DocumentError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

impl WorkflowDocument {
    /// Parses a document from JSON text.
    ///
    /// Fails with [`DocumentError::MalformedDocument`] when the text is not JSON, is not an
    /// object, or has no `nodes` sequence.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::MalformedDocument(e.to_string()))
    }

    /// Loads a document from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Self::from_json_str(&content)?;
        info!(
            path = %path.display(),
            nodes = doc.nodes.len(),
            sources = doc.connections.len(),
            "loaded workflow document"
        );
        Ok(doc)
    }

    /// Serializes the document as two-space indented JSON with a trailing newline.
    ///
    /// Output is deterministic: the same document always produces the same bytes.
    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| DocumentError::Serialize(e.to_string()))?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the document to `path` atomically.
    ///
    /// The content goes to a temporary file in the same directory which is then renamed over
    /// the target, so a crash never leaves a half-written document behind.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let json = self.to_json_string()?;
        let io_err = |source: std::io::Error| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        debug!(tmp = %tmp.path().display(), "writing workflow to temporary file");
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        // The temporary file is created owner-only; an existing target keeps its mode.
        if let Ok(metadata) = fs::metadata(path) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(io_err)?;
        }
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;

        info!(
            path = %path.display(),
            nodes = self.nodes.len(),
            bytes = json.len(),
            "saved workflow document"
        );
        Ok(())
    }
}
