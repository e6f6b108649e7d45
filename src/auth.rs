// ABOUTME: JWT-based admin authentication and session token management
// ABOUTME: Handles credential verification, token issuance, validation, and session creation
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Authentication and Session Management
//!
//! This module provides token-based authentication for the portfolio admin
//! panel. Tokens are HS256-signed JWTs carrying the administrator identity,
//! role, issuing address, and a random token id; validity is determined
//! purely by signature and registered claims, with no server-side session
//! store.

use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use crate::models::{AdminIdentity, AdminRole, AdminSession};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Session token validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature, issuer, or audience is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper JWT format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let expired_for = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "session token expired {} minutes ago at {}",
                    expired_for.num_minutes(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "session token is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "session token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// Claims carried by an admin session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Administrator id
    pub sub: String,
    /// Administrator email
    pub email: String,
    /// Role granted by this session
    pub role: AdminRole,
    /// Client address the session was issued to
    pub ip: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience (the admin panel)
    pub aud: String,
    /// Random unique token id
    pub jti: Uuid,
}

/// Authentication manager for admin session tokens
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager from the signing secret
    #[must_use]
    pub fn new(session_secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(session_secret),
            decoding_key: DecodingKey::from_secret(session_secret),
            token_expiry_hours,
        }
    }

    /// Verify the supplied credentials against the fixed administrator
    /// identity and issue a session on success
    ///
    /// The email comparison is case-sensitive and constant-time, and the
    /// password hash is always checked even when the email does not match,
    /// so the error never reveals which field was wrong.
    ///
    /// # Errors
    ///
    /// Returns a generic `AuthInvalid` error for any credential mismatch,
    /// and an internal error if password verification itself fails.
    pub async fn authenticate(
        &self,
        admin: &AdminIdentity,
        email: &str,
        password: &str,
        source_ip: IpAddr,
    ) -> AppResult<AdminSession> {
        let email_matches: bool = admin
            .email
            .as_bytes()
            .ct_eq(email.as_bytes())
            .into();

        // bcrypt off the async executor; always run it so a bad email costs
        // the same as a bad password
        let password = password.to_owned();
        let password_hash = admin.password_hash.clone();
        let password_matches =
            tokio::task::spawn_blocking(move || bcrypt::verify(&password, &password_hash))
                .await
                .map_err(|e| AppError::internal(format!("password verification task failed: {e}")))?
                .map_err(|e| AppError::internal(format!("password verification error: {e}")))?;

        if !(email_matches && password_matches) {
            return Err(AppError::auth_invalid(
                crate::constants::error_messages::INVALID_CREDENTIALS,
            ));
        }

        self.create_session(admin, source_ip)
            .map_err(|e| AppError::internal(format!("failed to issue session token: {e}")))
    }

    /// Issue a signed session token for the administrator
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails
    pub fn issue_token(&self, admin: &AdminIdentity, source_ip: IpAddr) -> Result<(String, Claims)> {
        self.issue_token_at(admin, source_ip, Utc::now())
    }

    /// Variant of [`Self::issue_token`] taking an explicit issue time
    pub fn issue_token_at(
        &self,
        admin: &AdminIdentity,
        source_ip: IpAddr,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims)> {
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: admin.id.to_string(),
            email: admin.email.clone(),
            role: admin.role,
            ip: source_ip.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            iss: service_names::ISSUER.to_string(),
            aud: service_names::ADMIN_PANEL.to_string(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok((token, claims))
    }

    /// Validate a session token and return its claims
    ///
    /// Checks signature, issuer, and audience through the JWT library, then
    /// performs the expiry check explicitly so expired tokens are reported
    /// as such rather than as a generic validation failure.
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing exactly why validation
    /// failed; the HTTP boundary collapses this into a generic 401.
    pub fn verify_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let claims = self.decode_token_claims(token)?;
        Self::check_token_expiry(&claims, Utc::now())?;
        Ok(claims)
    }

    /// Decode token claims without expiration validation
    fn decode_token_claims(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_audience(&[service_names::ADMIN_PANEL]);
        validation.set_issuer(&[service_names::ISSUER]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    /// Check token expiry and return a detailed error if it has passed
    fn check_token_expiry(
        claims: &Claims,
        current_time: DateTime<Utc>,
    ) -> Result<(), JwtValidationError> {
        if current_time.timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(current_time);
            tracing::warn!(
                subject = %claims.sub,
                expired_at = %expired_at.to_rfc3339(),
                "session token expired"
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }
        Ok(())
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::warn!("session token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "token signature verification failed".into(),
            },
            ErrorKind::InvalidIssuer => JwtValidationError::TokenInvalid {
                reason: "token issuer mismatch".into(),
            },
            ErrorKind::InvalidAudience => JwtValidationError::TokenInvalid {
                reason: "token audience mismatch".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("token contains invalid JSON: {json_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("token validation failed: {e}"),
            },
        }
    }

    /// Create an admin session: issued token plus its metadata
    ///
    /// # Errors
    ///
    /// Returns an error if token issuance fails
    pub fn create_session(&self, admin: &AdminIdentity, source_ip: IpAddr) -> Result<AdminSession> {
        let (token, claims) = self.issue_token(admin, source_ip)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .unwrap_or_else(|| Utc::now() + Duration::hours(self.token_expiry_hours));

        Ok(AdminSession {
            admin_id: admin.id,
            token,
            token_id: claims.jti,
            expires_at,
            email: admin.email.clone(),
        })
    }
}

/// Generate a random session signing secret
///
/// Useful for provisioning; the server itself never generates a secret at
/// runtime and refuses to start without one.
#[must_use]
pub fn generate_session_secret() -> [u8; 64] {
    use rand::RngCore;

    let mut secret = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_admin() -> AdminIdentity {
        AdminIdentity::new(
            "author@example.com".into(),
            // bcrypt hash of "correct horse battery staple", cost 4 for test speed
            bcrypt::hash("correct horse battery staple", 4).unwrap(),
            "Author".into(),
        )
    }

    fn manager() -> AuthManager {
        AuthManager::new(&generate_session_secret(), 24)
    }

    fn localhost() -> IpAddr {
        "127.0.0.1".parse().unwrap()
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let admin = test_admin();
        let auth = manager();

        let (token, issued) = auth.issue_token(&admin, localhost()).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, admin.id.to_string());
        assert_eq!(claims.email, admin.email);
        assert_eq!(claims.role, AdminRole::Admin);
        assert_eq!(claims.ip, "127.0.0.1");
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.iss, service_names::ISSUER);
        assert_eq!(claims.aud, service_names::ADMIN_PANEL);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let admin = test_admin();
        let auth = manager();
        let other = manager();

        let (token, _) = auth.issue_token(&admin, localhost()).unwrap();
        let err = other.verify_token(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenInvalid { .. }));
    }

    #[test]
    fn expired_token_reports_expiry() {
        let admin = test_admin();
        let auth = manager();

        let issued_at = Utc::now() - Duration::hours(25);
        let (token, _) = auth.issue_token_at(&admin, localhost(), issued_at).unwrap();

        let err = auth.verify_token(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenExpired { .. }));
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password_generically() {
        let admin = test_admin();
        let auth = manager();

        let err = auth
            .authenticate(&admin, "author@example.com", "wrong", localhost())
            .await
            .unwrap_err();
        assert_eq!(
            err.message,
            crate::constants::error_messages::INVALID_CREDENTIALS
        );
    }

    #[tokio::test]
    async fn authenticate_is_case_sensitive_on_email() {
        let admin = test_admin();
        let auth = manager();

        let err = auth
            .authenticate(
                &admin,
                "Author@example.com",
                "correct horse battery staple",
                localhost(),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.message,
            crate::constants::error_messages::INVALID_CREDENTIALS
        );
    }

    #[tokio::test]
    async fn authenticate_issues_session_on_success() {
        let admin = test_admin();
        let auth = manager();

        let session = auth
            .authenticate(
                &admin,
                "author@example.com",
                "correct horse battery staple",
                localhost(),
            )
            .await
            .unwrap();

        assert_eq!(session.admin_id, admin.id);
        assert!(session.expires_at > Utc::now());
        let claims = auth.verify_token(&session.token).unwrap();
        assert_eq!(claims.jti, session.token_id);
    }
}
