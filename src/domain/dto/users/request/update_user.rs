//! # 사용자 정보 수정 DTO
//!
//! - [`UpdateMeRequest`] - 본인 정보 수정. 이름, 이메일, 사진만 바꿀 수 있습니다.
//! - [`UpdateUserRequest`] - 관리자용 수정. 역할과 활성 상태도 바꿀 수 있지만 비밀번호는 안 됩니다.

use serde::Deserialize;
use validator::Validate;

use crate::core::errors::AppResult;
use crate::domain::dto::common::{IntoUpdate, UpdateDocument};
use crate::domain::entities::users::Role;
use crate::utils::string_utils::deserialize_optional_string;
use mongodb::bson::Document;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 80, message = "Please tell us your name!"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,

    /// 업로드 처리 후 서버가 채웁니다. JSON 본문에서는 받지 않습니다.
    #[serde(skip)]
    pub photo: Option<String>,

    /// 비밀번호 필드가 들어오면 거절하기 위해서만 받습니다.
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub password_confirm: Option<String>,
}

impl UpdateMeRequest {
    pub fn touches_password(&self) -> bool {
        self.password.is_some() || self.password_confirm.is_some()
    }
}

impl IntoUpdate for UpdateMeRequest {
    fn into_update(self) -> AppResult<Document> {
        Ok(UpdateDocument::new()
            .set("name", self.name)?
            .set("email", self.email.map(|email| email.to_lowercase()))?
            .set("photo", self.photo)?
            .build())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(length(min = 1, max = 80, message = "Please tell us your name!"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub photo: Option<String>,

    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default)]
    pub active: Option<bool>,
}

impl IntoUpdate for UpdateUserRequest {
    fn into_update(self) -> AppResult<Document> {
        Ok(UpdateDocument::new()
            .set("name", self.name)?
            .set("email", self.email.map(|email| email.to_lowercase()))?
            .set("photo", self.photo)?
            .set("role", self.role)?
            .set("active", self.active)?
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_update_me_ignores_unknown_fields() {
        let request: UpdateMeRequest = serde_json::from_value(serde_json::json!({
            "name": "Jonas S.",
            "role": "admin",
            "photo": "hack.jpg",
        }))
        .unwrap();

        assert!(!request.touches_password());
        assert_eq!(request.into_update().unwrap(), doc! { "name": "Jonas S." });
    }

    #[test]
    fn test_update_me_detects_password_fields() {
        let request: UpdateMeRequest =
            serde_json::from_value(serde_json::json!({ "password": "newpass123" })).unwrap();

        assert!(request.touches_password());
    }

    #[test]
    fn test_admin_update_sets_role() {
        let request: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "role": "lead-guide",
            "email": "Guide@Example.io",
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(
            request.into_update().unwrap(),
            doc! { "email": "guide@example.io", "role": "lead-guide" }
        );
    }
}
