//! Guestbook comments, kept next to the signups (default `data/comments.json`).

use crate::storage::{JsonListFile, StoreError};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub comment: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewComment {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CommentError {
    #[error("comment is required")]
    Empty,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl NewComment {
    pub fn validate(self) -> Result<Self, CommentError> {
        let comment = self.comment.trim().to_string();
        if comment.is_empty() {
            return Err(CommentError::Empty);
        }
        Ok(Self { comment })
    }
}

pub struct CommentStore {
    file: JsonListFile,
}

impl CommentStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonListFile::new(path),
        }
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<Comment>, StoreError> {
        let mut all: Vec<Comment> = self.file.read()?;
        all.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(all)
    }

    /// Ids are sequential, one past the largest stored id.
    pub fn insert(&self, new: NewComment) -> Result<Comment, StoreError> {
        let _guard = self.file.lock()?;

        let mut all: Vec<Comment> = self.file.read()?;
        let id = all.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let record = Comment {
            id,
            comment: new.comment,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        all.push(record.clone());
        self.file.write(&all)?;

        tracing::info!(id = record.id, "comment stored");
        Ok(record)
    }
}
