//! Profile use-case service.

use crate::model::profile::Profile;
use crate::model::{now_epoch_ms, UserId};
use crate::repo::profile_repo::ProfileRepository;
use crate::service::ServiceResult;
use crate::validation::ProfileInput;
use log::info;

pub struct ProfileService<R: ProfileRepository> {
    repo: R,
}

impl<R: ProfileRepository> ProfileService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the stored profile, `None` before the first save.
    pub fn get_profile(&self, user_id: UserId) -> ServiceResult<Option<Profile>> {
        Ok(self.repo.get_profile(user_id)?)
    }

    /// Validates and stores the full profile, replacing any previous one.
    pub fn upsert_profile(&self, user_id: UserId, input: ProfileInput) -> ServiceResult<Profile> {
        input.validate()?;
        let profile = input.into_profile(user_id, now_epoch_ms());
        self.repo.upsert_profile(&profile)?;
        info!("event=profile_upsert module=service status=ok");
        Ok(profile)
    }
}
