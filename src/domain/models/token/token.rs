//! 세션 토큰과 비밀번호 재설정 토큰 모델

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// JWT 클레임. `sub`는 사용자 ObjectId hex 입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// 검증된 세션 토큰
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedSession {
    pub user_id: String,
    pub issued_at: i64,
}

/// 새로 만든 재설정 토큰. `plain`은 메일로만 나가고 저장소에는 `hashed`만 남습니다.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub plain: String,
    pub hashed: String,
    pub expires_at: DateTime,
}
