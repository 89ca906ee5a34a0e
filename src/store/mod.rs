//! # Store Module
//!
//! Persistence for the browser client's working state. The generation
//! pipeline never reads or writes these; they exist for the client shell.
//!
//! | Trait | Records | Operations |
//! |-------|---------|------------|
//! | [`DraftStore`] | raw strings by key ([`DRAFT_KEY`] holds the [`ProjectDraft`]) | get / set / remove |
//! | [`PromptLibrary`] | [`SavedPrompt`] by id | list_all / put / delete |
//!
//! In-memory backends live in [`memory`].

pub mod memory;

pub use memory::{MemoryDraftStore, MemoryPromptLibrary};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{InlineAttachment, OutputArtifact};
use crate::{Error, ErrorContext, Result};

/// Fixed key of the auto-saved working draft.
pub const DRAFT_KEY: &str = "image-generator-project";

/// The auto-saved working state: current prompt and reference images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub images: Vec<InlineAttachment>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl ProjectDraft {
    pub fn new(prompt: impl Into<String>, images: Vec<InlineAttachment>) -> Self {
        Self {
            prompt: prompt.into(),
            images,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// A draft with no prompt text and no images is not worth keeping.
    pub fn is_empty(&self) -> bool {
        self.prompt.trim().is_empty() && self.images.is_empty()
    }
}

/// A named prompt kept in the library, optionally with the outputs it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPrompt {
    pub id: String,
    pub title: String,
    pub prompt: String,
    #[serde(default)]
    pub images: Vec<InlineAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<OutputArtifact>>,
    pub timestamp: i64,
}

impl SavedPrompt {
    /// New record with a generated id. The title is trimmed and must not be empty.
    pub fn new(
        title: &str,
        prompt: impl Into<String>,
        images: Vec<InlineAttachment>,
        outputs: Vec<OutputArtifact>,
    ) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation_with_context(
                "Please enter a title for the saved prompt.",
                ErrorContext::new().with_field_path("title"),
            ));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            prompt: prompt.into(),
            images,
            outputs: if outputs.is_empty() { None } else { Some(outputs) },
            timestamp: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Imported records need at least an id, a title, a prompt and a timestamp.
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty() && !self.title.is_empty() && !self.prompt.is_empty() && self.timestamp > 0
    }
}

/// Key-value store for small client state.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    /// Fails with [`Error::Storage`] when the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Collection of saved prompts.
#[async_trait]
pub trait PromptLibrary: Send + Sync {
    /// All records, oldest first.
    async fn list_all(&self) -> Result<Vec<SavedPrompt>>;
    /// Insert or replace by id.
    async fn put(&self, record: SavedPrompt) -> Result<()>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Save the working draft, or clear it when there is nothing to keep.
pub async fn save_draft(store: &dyn DraftStore, draft: &ProjectDraft) -> Result<()> {
    if draft.is_empty() {
        return store.remove(DRAFT_KEY).await;
    }
    let json = serde_json::to_string(draft)?;
    store.set(DRAFT_KEY, &json).await
}

/// Load the working draft. An unreadable stored value is logged and ignored.
pub async fn load_draft(store: &dyn DraftStore) -> Result<Option<ProjectDraft>> {
    let Some(raw) = store.get(DRAFT_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(draft) => Ok(Some(draft)),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable draft");
            Ok(None)
        }
    }
}

/// Import records from an exported JSON array, skipping malformed entries.
///
/// Returns the number of records stored.
pub async fn import_prompts(library: &dyn PromptLibrary, json: &str) -> Result<usize> {
    let items: Vec<serde_json::Value> = serde_json::from_str(json).map_err(|e| {
        Error::validation_with_context(
            "Prompt export must be a JSON array",
            ErrorContext::new().with_details(e.to_string()),
        )
    })?;

    let mut stored = 0;
    for item in items {
        let Ok(record) = serde_json::from_value::<SavedPrompt>(item) else {
            continue;
        };
        if !record.is_well_formed() {
            continue;
        }
        library.put(record).await?;
        stored += 1;
    }
    if stored == 0 {
        return Err(Error::validation_with_context(
            "No valid prompts found in file",
            ErrorContext::new().with_source("prompt_import"),
        ));
    }
    Ok(stored)
}
