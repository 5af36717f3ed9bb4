//! # 세션 토큰 서비스
//!
//! HS256 으로 서명된 JWT 세션 토큰을 발급하고 검증합니다.
//!
//! ## 토큰 구조
//!
//! ```json
//! { "sub": "<user ObjectId hex>", "iat": 1700000000, "exp": 1707776000 }
//! ```
//!
//! - 서명 키: `JWT_SECRET`
//! - 유효 기간: `JWT_EXPIRES_IN` (기본 `90d`)
//!
//! 검증 실패는 [`AppError::InvalidToken`] 또는 [`AppError::ExpiredToken`]으로 구분됩니다.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;

use crate::config::JwtConfig;
use crate::core::errors::AppResult;
use crate::core::registry::ServiceLocator;
use crate::domain::models::token::{TokenClaims, VerifiedSession};

pub struct TokenService {
    secret: String,
    expires_in_secs: i64,
}

impl TokenService {
    pub fn new(secret: String, expires_in_secs: i64) -> Self {
        Self {
            secret,
            expires_in_secs,
        }
    }

    pub fn from_env() -> Self {
        Self::new(JwtConfig::secret(), JwtConfig::expires_in_secs())
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// 사용자 ID로 세션 토큰을 발급합니다.
    pub fn issue(&self, user_id: &ObjectId) -> AppResult<String> {
        let now = Utc::now().timestamp();
        self.encode_claims(&TokenClaims {
            sub: user_id.to_hex(),
            iat: now,
            exp: now + self.expires_in_secs,
        })
    }

    fn encode_claims(&self, claims: &TokenClaims) -> AppResult<String> {
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        Ok(encode(&Header::new(Algorithm::HS256), claims, &encoding_key)?)
    }

    /// 서명과 만료 시각을 검증하고 세션 정보를 돌려줍니다.
    pub fn verify(&self, token: &str) -> AppResult<VerifiedSession> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<TokenClaims>(token, &decoding_key, &validation)?.claims;

        Ok(VerifiedSession {
            user_id: claims.sub,
            issued_at: claims.iat,
        })
    }

    /// `Authorization: Bearer <token>` 헤더 값에서 토큰만 꺼냅니다.
    pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
        auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::AppError;

    fn service() -> TokenService {
        TokenService::new("test-secret-with-enough-length".to_string(), 3600)
    }

    #[test]
    fn test_issue_then_verify() {
        let service = service();
        let user_id = ObjectId::new();

        let token = service.issue(&user_id).unwrap();
        let session = service.verify(&token).unwrap();

        assert_eq!(session.user_id, user_id.to_hex());
        assert!(session.issued_at <= Utc::now().timestamp());
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let now = Utc::now().timestamp();
        let token = service
            .encode_claims(&TokenClaims {
                sub: ObjectId::new().to_hex(),
                iat: now - 7200,
                exp: now - 3600,
            })
            .unwrap();

        assert!(matches!(service.verify(&token), Err(AppError::ExpiredToken)));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let token = TokenService::new("another-secret".to_string(), 3600)
            .issue(&ObjectId::new())
            .unwrap();

        assert!(matches!(service().verify(&token), Err(AppError::InvalidToken)));
        assert!(matches!(service().verify("not.a.jwt"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(TokenService::extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(TokenService::extract_bearer_token("Basic abc"), None);
        assert_eq!(TokenService::extract_bearer_token("Bearer "), None);
    }
}
