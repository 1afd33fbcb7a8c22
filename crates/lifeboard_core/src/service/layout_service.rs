//! Dashboard layout use-case service.
//!
//! # Invariants
//! - `load` always returns exactly one widget per default definition.
//! - Saved documents are the canonical camelCase stored form.

use crate::layout::{merge_layout, parse_stored_layout, to_stored_layout};
use crate::model::widget::{WidgetDefinition, WidgetLayout};
use crate::model::{now_epoch_ms, UserId};
use crate::repo::layout_repo::LayoutRepository;
use crate::repo::RepoError;
use crate::service::ServiceResult;
use log::info;

pub struct LayoutService<R: LayoutRepository> {
    repo: R,
    defaults: Vec<WidgetDefinition>,
}

impl<R: LayoutRepository> LayoutService<R> {
    pub fn new(repo: R, defaults: Vec<WidgetDefinition>) -> Self {
        Self { repo, defaults }
    }

    pub fn defaults(&self) -> &[WidgetDefinition] {
        &self.defaults
    }

    /// Stored layout merged onto the defaults.
    pub fn load(&self, user_id: UserId) -> ServiceResult<Vec<WidgetLayout>> {
        let stored = match self.repo.load_layout(user_id)? {
            Some(raw) => parse_stored_layout(&raw),
            None => Vec::new(),
        };
        Ok(merge_layout(&stored, &self.defaults))
    }

    /// Persists `layout` and returns it re-merged onto the defaults, so ids
    /// unknown to the defaults are never echoed back.
    pub fn save(&self, user_id: UserId, layout: &[WidgetLayout]) -> ServiceResult<Vec<WidgetLayout>> {
        let stored = to_stored_layout(layout);
        let merged = merge_layout(&stored, &self.defaults);
        let document = serde_json::to_string(&to_stored_layout(&merged))
            .map_err(|err| RepoError::InvalidData(format!("cannot encode layout: {err}")))?;
        self.repo.save_layout(user_id, &document, now_epoch_ms())?;
        info!(
            "event=layout_save module=service status=ok widgets={}",
            merged.len()
        );
        Ok(merged)
    }

    /// Drops the stored layout and returns the defaults.
    pub fn reset(&self, user_id: UserId) -> ServiceResult<Vec<WidgetLayout>> {
        let removed = self.repo.delete_layout(user_id)?;
        info!("event=layout_reset module=service status=ok removed={removed}");
        Ok(merge_layout(&[], &self.defaults))
    }
}
