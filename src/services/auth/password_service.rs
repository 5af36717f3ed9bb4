//! # 비밀번호 서비스
//!
//! bcrypt 해싱과 비밀번호 재설정 토큰 생성을 담당합니다.
//! 재설정 토큰 원문은 메일로만 전달되고, 저장소에는 SHA-256 해시만 남습니다.

use std::sync::Arc;

use mongodb::bson::DateTime;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::{PasswordConfig, ResetTokenConfig};
use crate::core::errors::AppResult;
use crate::core::registry::ServiceLocator;
use crate::domain::models::token::ResetToken;

pub struct PasswordService {
    cost: u32,
    reset_expires_minutes: i64,
}

impl PasswordService {
    pub fn new(cost: u32, reset_expires_minutes: i64) -> Self {
        Self {
            cost,
            reset_expires_minutes,
        }
    }

    pub fn from_env() -> Self {
        Self::new(PasswordConfig::bcrypt_cost(), ResetTokenConfig::expires_in_minutes())
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    pub fn hash(&self, plain: &str) -> AppResult<String> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    pub fn verify(&self, plain: &str, hashed: &str) -> AppResult<bool> {
        Ok(bcrypt::verify(plain, hashed)?)
    }

    /// 새 재설정 토큰. 만료 시각은 지금부터 `PASSWORD_RESET_EXPIRES_MINUTES` 뒤입니다.
    pub fn create_reset_token(&self) -> ResetToken {
        let plain = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let hashed = hash_reset_token(&plain);
        let expires_at = DateTime::from_millis(
            DateTime::now().timestamp_millis() + self.reset_expires_minutes * 60 * 1000,
        );

        ResetToken {
            plain,
            hashed,
            expires_at,
        }
    }
}

/// 재설정 토큰 원문 → 저장용 SHA-256 hex
pub fn hash_reset_token(plain: &str) -> String {
    format!("{:x}", Sha256::digest(plain.as_bytes()))
}
