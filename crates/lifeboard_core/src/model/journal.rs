//! Journal entry domain model.

use crate::model::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a journal entry.
pub type JournalEntryId = Uuid;

/// Self-reported mood attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Great,
    Good,
    Okay,
    Bad,
    Awful,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Great => "great",
            Self::Good => "good",
            Self::Okay => "okay",
            Self::Bad => "bad",
            Self::Awful => "awful",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "great" => Some(Self::Great),
            "good" => Some(Self::Good),
            "okay" => Some(Self::Okay),
            "bad" => Some(Self::Bad),
            "awful" => Some(Self::Awful),
            _ => None,
        }
    }
}

/// One dated journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub user_id: UserId,
    pub entry_date: NaiveDate,
    pub title: Option<String>,
    /// Markdown body.
    pub content: String,
    pub mood: Option<Mood>,
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl JournalEntry {
    pub fn new(
        user_id: UserId,
        entry_date: NaiveDate,
        content: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            entry_date,
            title: None,
            content: content.into(),
            mood: None,
            tags: Vec::new(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }
}
