//! Activity log and application settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// Human-readable trace of a significant mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
    pub message: String,
}

impl ActivityLogEntry {
    pub fn new(user_id: UserId, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_id,
            message: message.into(),
        }
    }
}

/// The `app_settings/config` document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppSettings {
    /// bcrypt hash of the admin PIN; `None` means the default PIN applies
    #[serde(default)]
    pub admin_pin_hash: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
