//! User Entity Implementation
//!
//! 비밀번호는 항상 bcrypt 해시로만 저장되며 응답에 포함되지 않습니다.
//! `passwordConfirm`은 요청 DTO에만 존재하므로 이 구조체를 거친 문서에는 절대 저장되지 않습니다.

use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::entity::Entity;

/// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    #[default]
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Guide => "guide",
            Role::LeadGuide => "lead-guide",
            Role::Admin => "admin",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "guide" => Ok(Role::Guide),
            "lead-guide" => Ok(Role::LeadGuide),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unsupported role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(default = "default_photo")]
    pub photo: String,
    #[serde(default)]
    pub role: Role,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reset_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_reset_expires: Option<DateTime>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_photo() -> String {
    "default.jpg".to_string()
}

fn default_active() -> bool {
    true
}

impl User {
    /// 새 로컬 계정. `password_hash`는 이미 해시된 값이어야 합니다.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: None,
            name,
            email,
            photo: default_photo(),
            role: Role::User,
            password: password_hash,
            password_changed_at: None,
            password_reset_token: None,
            password_reset_expires: None,
            active: true,
        }
    }

    /// 토큰 발급 시각(`iat`, 초) 이후에 비밀번호가 바뀌었는지 확인합니다.
    pub fn changed_password_after(&self, issued_at: i64) -> bool {
        match self.password_changed_at {
            Some(changed_at) => changed_at.timestamp_millis() / 1000 > issued_at,
            None => false,
        }
    }

    /// 기존 계정의 비밀번호 교체. 변경 시각은 1초 앞당겨 방금 발급한 토큰이 무효가 되지 않게 합니다.
    pub fn replace_password(&mut self, password_hash: String, now: DateTime) {
        self.password = password_hash;
        self.password_changed_at = Some(DateTime::from_millis(now.timestamp_millis() - 1000));
        self.password_reset_token = None;
        self.password_reset_expires = None;
    }
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "user";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn before_save(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
    }

    fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError("Invalid input data. Please tell us your name!".to_string()));
        }
        if !self.email.validate_email() {
            return Err(AppError::ValidationError("Invalid input data. Please provide a valid email".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::ValidationError("Invalid input data. Please provide a password".to_string()));
        }
        Ok(())
    }

    /// 소프트 삭제된 계정은 기본 조회에서 제외됩니다.
    fn default_filter() -> Document {
        doc! { "active": { "$ne": false } }
    }

    fn hidden_fields() -> &'static [&'static str] {
        &["password", "passwordResetToken", "passwordResetExpires", "active", "__v"]
    }

    fn protected_fields() -> &'static [&'static str] {
        &["_id", "password", "passwordChangedAt", "passwordResetToken", "passwordResetExpires"]
    }

    fn indexes() -> Vec<IndexModel> {
        vec![IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    fn sample() -> User {
        User::new("Jonas".into(), "  Jonas@Example.io ".into(), "$2b$04$hash".into())
    }

    #[test]
    fn test_role_serialization_uses_kebab_case() {
        assert_eq!(serde_json::to_string(&Role::LeadGuide).unwrap(), "\"lead-guide\"");
        assert_eq!(Role::from_str("lead-guide").unwrap(), Role::LeadGuide);
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn test_stored_document_has_no_plaintext_or_confirm_fields() {
        let mut user = sample();
        user.before_save();
        let stored = bson::to_document(&user).unwrap();

        assert_eq!(stored.get_str("email").unwrap(), "jonas@example.io");
        assert_eq!(stored.get_str("password").unwrap(), "$2b$04$hash");
        assert!(!stored.contains_key("passwordConfirm"));
        assert!(!stored.contains_key("_id"));
        assert_eq!(stored.get_str("role").unwrap(), "user");
        assert_eq!(stored.get_str("photo").unwrap(), "default.jpg");
    }

    #[test]
    fn test_presented_user_hides_secrets() {
        let mut user = sample();
        user.id = Some(ObjectId::new());
        user.password_reset_token = Some("abc".into());
        let json = User::present(bson::to_document(&user).unwrap());

        assert!(json.get("password").is_none());
        assert!(json.get("passwordResetToken").is_none());
        assert!(json.get("active").is_none());
        assert_eq!(json["id"], json["_id"]);
    }

    #[test]
    fn test_changed_password_after() {
        let mut user = sample();
        assert!(!user.changed_password_after(1_000));

        user.replace_password("$2b$04$other".into(), DateTime::from_millis(2_000_000));
        // 변경 시각 = 1999초
        assert!(user.changed_password_after(1_000));
        assert!(!user.changed_password_after(1_999));
        assert!(!user.changed_password_after(2_500));
    }

    #[test]
    fn test_replace_password_clears_reset_token() {
        let mut user = sample();
        user.password_reset_token = Some("hash".into());
        user.password_reset_expires = Some(DateTime::now());

        user.replace_password("$2b$04$new".into(), DateTime::now());

        assert!(user.password_reset_token.is_none());
        assert!(user.password_reset_expires.is_none());
    }

    #[test]
    fn test_soft_deleted_users_are_filtered_by_default() {
        assert_eq!(User::default_filter(), doc! { "active": { "$ne": false } });
    }

    #[test]
    fn test_validation_rejects_bad_email() {
        let mut user = sample();
        user.email = "not-an-email".into();
        assert!(user.validate().is_err());
    }
}
