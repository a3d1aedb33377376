//! Session and admin PIN service

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use shared::{validate_pin, ActivityLogEntry, AppSettings, Role, UserId};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::Claims;
use crate::store::{BatchWrite, Collection, Documents};

/// Id of the single settings document
pub const SETTINGS_DOC: &str = "config";

#[derive(Clone)]
pub struct SessionService {
    docs: Documents,
    jwt_secret: String,
    session_expiry: i64,
    default_pin: String,
}

/// Issued session token
#[derive(Debug, Serialize)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user_id: UserId,
    pub role: Role,
}

impl SessionService {
    pub fn new(docs: Documents, config: &Config) -> Self {
        Self {
            docs,
            jwt_secret: config.jwt.secret.clone(),
            session_expiry: config.jwt.session_expiry,
            default_pin: config.security.default_pin.clone(),
        }
    }

    /// Staff session; no credential beyond an opaque id
    pub fn staff_session(&self, user_id: Option<UserId>) -> AppResult<SessionToken> {
        let user_id = user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.issue(user_id, Role::Staff)
    }

    /// Admin session, gated by the admin PIN
    pub async fn admin_session(&self, user_id: Option<UserId>, pin: &str) -> AppResult<SessionToken> {
        self.verify_pin(pin).await?;
        let user_id = user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.issue(user_id, Role::Admin)
    }

    /// Check a PIN against the stored hash, or the default PIN when none is stored
    pub async fn verify_pin(&self, pin: &str) -> AppResult<()> {
        let settings = self.settings().await?;
        let ok = match &settings.admin_pin_hash {
            Some(stored) => verify(pin, stored)
                .map_err(|e| AppError::Internal(format!("PIN verification failed: {}", e)))?,
            None => pin == self.default_pin,
        };

        if ok {
            Ok(())
        } else {
            tracing::info!("Rejected incorrect admin PIN");
            Err(AppError::IncorrectPin)
        }
    }

    /// Replace the admin PIN
    pub async fn change_pin(
        &self,
        actor: UserId,
        current: &str,
        new_pin: &str,
        confirm: &str,
    ) -> AppResult<()> {
        if new_pin != confirm {
            return Err(AppError::validation("confirm_pin", "New PINs do not match"));
        }
        validate_pin(new_pin).map_err(|msg| AppError::validation("new_pin", msg))?;
        self.verify_pin(current).await?;

        let pin_hash = hash(new_pin, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("PIN hashing failed: {}", e)))?;
        let settings = AppSettings {
            admin_pin_hash: Some(pin_hash),
            updated_at: Some(Utc::now()),
        };
        let log = ActivityLogEntry::new(actor, "Admin PIN changed");

        self.docs
            .commit(vec![
                BatchWrite::Put {
                    collection: Collection::Settings,
                    id: SETTINGS_DOC.to_string(),
                    doc: serde_json::to_value(&settings)?,
                },
                BatchWrite::Put {
                    collection: Collection::Logs,
                    id: log.id.to_string(),
                    doc: serde_json::to_value(&log)?,
                },
            ])
            .await?;

        tracing::info!("Admin PIN changed");
        Ok(())
    }

    async fn settings(&self) -> AppResult<AppSettings> {
        Ok(self
            .docs
            .get_raw(Collection::Settings, SETTINGS_DOC)
            .await?
            .unwrap_or_default())
    }

    fn issue(&self, user_id: UserId, role: Role) -> AppResult<SessionToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.clone(),
            role,
            exp: (now + Duration::seconds(self.session_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(SessionToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.session_expiry,
            user_id,
            role,
        })
    }
}
