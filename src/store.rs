//! The persistence seam: an opaque key-value document store keyed by job id.
//!
//! The core treats load/save as plain fallible calls and does not retry —
//! retry policy belongs to whatever auto-save layer sits above. A memory
//! store is provided for tests and a directory-backed one for the CLI.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::PageflowError;

/// A stored document: the title plus its raw Markdown/HTML content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub title: String,
    pub content: String,
}

/// Key-value document persistence keyed by job id.
pub trait DocumentStore {
    fn get(&self, job_id: &str) -> Result<StoredDocument, PageflowError>;
    fn set(&mut self, job_id: &str, content_html: &str) -> Result<(), PageflowError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: HashMap<String, StoredDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job_id: &str, document: StoredDocument) {
        self.documents.insert(job_id.to_string(), document);
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, job_id: &str) -> Result<StoredDocument, PageflowError> {
        self.documents
            .get(job_id)
            .cloned()
            .ok_or_else(|| PageflowError::Store(format!("no document for job '{job_id}'")))
    }

    fn set(&mut self, job_id: &str, content_html: &str) -> Result<(), PageflowError> {
        let entry = self.documents.entry(job_id.to_string()).or_default();
        entry.content = content_html.to_string();
        Ok(())
    }
}

/// One-file-per-job store rooted at a directory. Used by the CLI.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, job_id: &str) -> PathBuf {
        self.root.join(format!("{job_id}.html"))
    }
}

impl DocumentStore for DirStore {
    fn get(&self, job_id: &str) -> Result<StoredDocument, PageflowError> {
        let content = std::fs::read_to_string(self.path(job_id))?;
        Ok(StoredDocument {
            title: job_id.to_string(),
            content,
        })
    }

    fn set(&mut self, job_id: &str, content_html: &str) -> Result<(), PageflowError> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::write(self.path(job_id), content_html)?;
        Ok(())
    }
}
