// ABOUTME: CSRF (Cross-Site Request Forgery) protection token generation and validation
// ABOUTME: Provides secure token-based CSRF protection for state-changing operations
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! CSRF protection module
//!
//! Generates cryptographically secure CSRF tokens scoped to a session token
//! id. The login handler sets the token in a JS-readable cookie; the admin
//! panel echoes it back in the `X-CSRF-Token` header on state-changing
//! requests.

use crate::constants::limits;
use crate::errors::{AppError, AppResult};
use rand::RngCore;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// CSRF token metadata (token itself is the `HashMap` key)
#[derive(Clone)]
struct CsrfToken {
    session_id: Uuid,
    expires_at: chrono::DateTime<chrono::Utc>,
}

/// CSRF token manager with in-memory storage
pub struct CsrfTokenManager {
    tokens: RwLock<HashMap<String, CsrfToken>>,
    expiry: chrono::Duration,
}

impl CsrfTokenManager {
    /// Create a new CSRF token manager whose tokens live as long as the
    /// sessions they protect
    #[must_use]
    pub fn new(expiry: chrono::Duration) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            expiry,
        }
    }

    /// Generate a new CSRF token bound to a session token id
    pub async fn generate_token(&self, session_id: Uuid) -> String {
        let mut random_bytes = [0u8; limits::CSRF_TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut random_bytes);

        let token = hex::encode(random_bytes);
        let expires_at = chrono::Utc::now() + self.expiry;

        let mut tokens = self.tokens.write().await;
        tokens.insert(
            token.clone(),
            CsrfToken {
                session_id,
                expires_at,
            },
        );

        // Cleanup expired tokens on insert
        Self::cleanup_expired_tokens_locked(&mut tokens);
        drop(tokens);

        token
    }

    /// Validate a CSRF token against the session that presented it
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unknown, expired, or bound to a
    /// different session.
    pub async fn validate_token(&self, token: &str, session_id: Uuid) -> AppResult<()> {
        let csrf_token = {
            let tokens = self.tokens.read().await;
            tokens
                .get(token)
                .ok_or_else(|| AppError::auth_invalid("Invalid CSRF token"))?
                .clone()
        };

        if chrono::Utc::now() > csrf_token.expires_at {
            return Err(AppError::auth_invalid("CSRF token expired"));
        }

        if csrf_token.session_id != session_id {
            return Err(AppError::auth_invalid("CSRF token session mismatch"));
        }

        Ok(())
    }

    /// Invalidate a CSRF token after use
    pub async fn invalidate_token(&self, token: &str) {
        let mut tokens = self.tokens.write().await;
        tokens.remove(token);
    }

    fn cleanup_expired_tokens_locked(tokens: &mut HashMap<String, CsrfToken>) {
        let now = chrono::Utc::now();
        tokens.retain(|_, csrf_token| csrf_token.expires_at > now);
    }
}

impl Default for CsrfTokenManager {
    fn default() -> Self {
        Self::new(chrono::Duration::hours(
            crate::constants::limits::SESSION_EXPIRY_HOURS,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generated_token_validates_for_its_session() {
        let manager = CsrfTokenManager::default();
        let session_id = Uuid::new_v4();

        let token = manager.generate_token(session_id).await;
        assert_eq!(token.len(), limits::CSRF_TOKEN_BYTES * 2);
        manager.validate_token(&token, session_id).await.unwrap();
    }

    #[tokio::test]
    async fn token_rejected_for_other_session() {
        let manager = CsrfTokenManager::default();
        let token = manager.generate_token(Uuid::new_v4()).await;

        assert!(manager
            .validate_token(&token, Uuid::new_v4())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn invalidated_token_no_longer_validates() {
        let manager = CsrfTokenManager::default();
        let session_id = Uuid::new_v4();
        let token = manager.generate_token(session_id).await;

        manager.invalidate_token(&token).await;
        assert!(manager.validate_token(&token, session_id).await.is_err());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let manager = CsrfTokenManager::new(chrono::Duration::seconds(-1));
        let session_id = Uuid::new_v4();
        let token = manager.generate_token(session_id).await;

        assert!(manager.validate_token(&token, session_id).await.is_err());
    }
}
