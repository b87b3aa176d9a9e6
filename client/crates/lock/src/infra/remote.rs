//! Remote Repository Implementations
//!
//! HTTP clients for the managed backend: the profile record store and
//! the auth provider. Connectivity and server failures map to
//! `RemoteUnavailable`; callers fail closed.

use kernel::id::UserId;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::LockConfig;
use crate::domain::repository::{AuthGateway, AuthUser, LockProfile, ProfileRepository};
use crate::domain::value_object::{lock_method::LockMethod, pin_code::PinHash};
use crate::error::{LockError, LockResult};

/// Build the shared HTTP client with the configured request timeout
pub fn build_client(config: &LockConfig) -> LockResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.remote_timeout)
        .build()
        .map_err(|e| LockError::Internal(format!("HTTP client setup failed: {e}")))
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProfileDto {
    lock_method: String,
    pin_hash: Option<String>,
}

#[derive(Debug, Serialize)]
struct LockUpdateDto<'a> {
    lock_method: &'a str,
    pin_hash: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: Uuid,
    email: String,
}

#[derive(Debug, Serialize)]
struct PasswordGrantDto<'a> {
    grant_type: &'static str,
    email: &'a str,
    password: &'a str,
}

fn unexpected_status(status: StatusCode, context: &str) -> LockError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LockError::NotAuthenticated,
        _ => LockError::RemoteUnavailable(format!("{context}: status {status}")),
    }
}

// ============================================================================
// Profile record store
// ============================================================================

/// HTTP-backed profile repository
#[derive(Clone)]
pub struct HttpProfileRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpProfileRepository {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn profile_url(&self, user_id: &UserId) -> String {
        format!("{}/profiles/{}", self.base_url, user_id)
    }
}

impl ProfileRepository for HttpProfileRepository {
    async fn find_lock_profile(&self, user_id: &UserId) -> LockResult<Option<LockProfile>> {
        let response = self.client.get(self.profile_url(user_id)).send().await?;

        match response.status() {
            StatusCode::OK => {
                let dto: ProfileDto = response
                    .json()
                    .await
                    .map_err(|e| LockError::Internal(format!("Malformed profile record: {e}")))?;

                let Some(method) = LockMethod::from_code(&dto.lock_method) else {
                    tracing::warn!(code = %dto.lock_method, "Unknown lock method on profile record");
                    return Ok(None);
                };

                let pin_hash = dto.pin_hash.and_then(|phc| match PinHash::from_phc_string(phc) {
                    Ok(hash) => Some(hash),
                    Err(e) => {
                        tracing::warn!(error = %e, "Invalid PIN hash on profile record");
                        None
                    }
                });

                Ok(Some(LockProfile { method, pin_hash }))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(unexpected_status(status, "profile fetch")),
        }
    }

    async fn update_lock(
        &self,
        user_id: &UserId,
        method: LockMethod,
        pin_hash: Option<&PinHash>,
    ) -> LockResult<()> {
        let body = LockUpdateDto {
            lock_method: method.code(),
            pin_hash: pin_hash.map(|h| h.as_phc_string()),
        };

        let response = self
            .client
            .patch(self.profile_url(user_id))
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(unexpected_status(response.status(), "profile update"))
        }
    }

    async fn clear_lock(&self, user_id: &UserId) -> LockResult<()> {
        self.update_lock(user_id, LockMethod::None, None).await
    }
}

// ============================================================================
// Auth provider
// ============================================================================

/// HTTP-backed auth provider gateway
#[derive(Clone)]
pub struct HttpAuthGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl AuthGateway for HttpAuthGateway {
    async fn current_user(&self) -> LockResult<Option<AuthUser>> {
        let response = self
            .client
            .get(format!("{}/auth/user", self.base_url))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let dto: UserDto = response
                    .json()
                    .await
                    .map_err(|e| LockError::Internal(format!("Malformed user record: {e}")))?;

                Ok(Some(AuthUser {
                    user_id: UserId::from_uuid(dto.id),
                    email: dto.email,
                }))
            }
            StatusCode::UNAUTHORIZED => Ok(None),
            status => Err(unexpected_status(status, "user fetch")),
        }
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> LockResult<()> {
        let body = PasswordGrantDto {
            grant_type: "password",
            email,
            password,
        };

        let response = self
            .client
            .post(format!("{}/auth/token", self.base_url))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(LockError::InvalidCredential)
            }
            status => Err(LockError::RemoteUnavailable(format!(
                "sign-in: status {status}"
            ))),
        }
    }
}
