//! Journal use-case service.

use crate::model::journal::{JournalEntry, JournalEntryId};
use crate::model::{now_epoch_ms, UserId};
use crate::realtime::{ChangeEvent, ChangeFeed};
use crate::repo::journal_repo::{JournalListQuery, JournalRepository};
use crate::service::{ServiceError, ServiceResult};
use crate::validation::JournalInput;
use log::info;

pub struct JournalService<R: JournalRepository> {
    repo: R,
    feed: Option<ChangeFeed<JournalEntry>>,
}

impl<R: JournalRepository> JournalService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, feed: None }
    }

    pub fn with_feed(mut self, feed: ChangeFeed<JournalEntry>) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn create_entry(&self, user_id: UserId, input: JournalInput) -> ServiceResult<JournalEntry> {
        input.validate()?;
        let entry = input.into_entry(user_id, now_epoch_ms());
        self.insert_entry(&entry)
    }

    /// Persists an already-built entry, keeping its id.
    pub fn insert_entry(&self, entry: &JournalEntry) -> ServiceResult<JournalEntry> {
        journal_input(entry).validate()?;
        let id = self.repo.create_entry(entry)?;
        let stored = self
            .repo
            .get_entry(entry.user_id, id)?
            .ok_or(ServiceError::InconsistentState("created entry not found in read-back"))?;
        info!("event=journal_create module=service status=ok");
        self.publish(stored.user_id, ChangeEvent::Insert(stored.clone()));
        Ok(stored)
    }

    pub fn get_entry(&self, user_id: UserId, id: JournalEntryId) -> ServiceResult<JournalEntry> {
        self.repo
            .get_entry(user_id, id)?
            .ok_or(ServiceError::NotFound(id))
    }

    pub fn list_entries(
        &self,
        user_id: UserId,
        query: &JournalListQuery,
    ) -> ServiceResult<Vec<JournalEntry>> {
        Ok(self.repo.list_entries(user_id, query)?)
    }

    pub fn update_entry(
        &self,
        user_id: UserId,
        id: JournalEntryId,
        input: JournalInput,
    ) -> ServiceResult<JournalEntry> {
        input.validate()?;
        let mut entry = self.get_entry(user_id, id)?;
        input.apply_to(&mut entry, now_epoch_ms());
        self.save_entry(&entry)
    }

    pub fn save_entry(&self, entry: &JournalEntry) -> ServiceResult<JournalEntry> {
        journal_input(entry).validate()?;
        self.repo.update_entry(entry)?;
        let stored = self
            .repo
            .get_entry(entry.user_id, entry.id)?
            .ok_or(ServiceError::InconsistentState("updated entry not found in read-back"))?;
        self.publish(stored.user_id, ChangeEvent::Update(stored.clone()));
        Ok(stored)
    }

    pub fn delete_entry(&self, user_id: UserId, id: JournalEntryId) -> ServiceResult<()> {
        self.repo.delete_entry(user_id, id)?;
        info!("event=journal_delete module=service status=ok");
        self.publish(user_id, ChangeEvent::Delete(id));
        Ok(())
    }

    fn publish(&self, user_id: UserId, event: ChangeEvent<JournalEntry>) {
        if let Some(feed) = &self.feed {
            feed.publish(user_id, event);
        }
    }
}

pub(crate) fn journal_input(entry: &JournalEntry) -> JournalInput {
    JournalInput {
        entry_date: entry.entry_date,
        title: entry.title.clone(),
        content: entry.content.clone(),
        mood: entry.mood,
        tags: entry.tags.clone(),
    }
}
