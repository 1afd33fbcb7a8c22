//! User profile model.

use crate::model::UserId;
use serde::{Deserialize, Serialize};

/// Public-facing profile for one user. One row per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: String,
    pub avatar_url: Option<String>,
    /// IANA zone name (`Area/City`) or `UTC`.
    pub timezone: String,
    pub bio: Option<String>,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}
