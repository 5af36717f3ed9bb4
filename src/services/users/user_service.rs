//! # 사용자 관리 서비스
//!
//! 로그인한 사용자의 프로필 수정(`updateMe`), 탈퇴(`deleteMe`)와
//! 관리자의 사용자 수정을 담당합니다.
//!
//! ## 규칙
//!
//! - `updateMe`는 `name`, `email`, `photo`만 바꿉니다. 비밀번호 필드가 오면 400 으로 거절합니다.
//! - `deleteMe`는 문서를 지우지 않고 `active=false`로 표시합니다.
//! - 관리자 수정으로도 비밀번호는 바꿀 수 없습니다 (보호 필드).

use std::sync::Arc;

use serde_json::Value;
use validator::Validate;

use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceLocator;
use crate::domain::dto::common::IntoUpdate;
use crate::domain::dto::users::request::{UpdateMeRequest, UpdateUserRequest};
use crate::domain::models::auth::AuthenticatedUser;
use crate::repositories::users::UserRepository;

pub struct UserService {
    users: Arc<UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self { users }
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    pub async fn get_me(&self, current: &AuthenticatedUser) -> AppResult<Value> {
        self.users.find_one(&current.user_id.to_hex(), Vec::new()).await
    }

    /// 비밀번호 필드 거절과 DTO 검증. 사진 파일을 쓰기 전에 호출됩니다.
    pub fn check_profile_update(request: &UpdateMeRequest) -> AppResult<()> {
        if request.touches_password() {
            return Err(AppError::ValidationError(
                "This route is not for password updates. Please use /updateMyPassword.".to_string(),
            ));
        }
        Ok(request.validate()?)
    }

    /// `photo`는 업로드 처리 후 저장된 파일 이름입니다.
    pub async fn update_me(
        &self,
        current: &AuthenticatedUser,
        mut request: UpdateMeRequest,
        photo: Option<String>,
    ) -> AppResult<Value> {
        Self::check_profile_update(&request)?;
        request.photo = photo;

        let patch = request.into_update()?;
        let updated = self.users.update(&current.user_id.to_hex(), patch).await?;

        log::info!("👤 프로필 수정: {}", current.email);
        Ok(updated)
    }

    pub async fn delete_me(&self, current: &AuthenticatedUser) -> AppResult<()> {
        self.users.deactivate(&current.user_id).await?;
        log::info!("👤 계정 비활성화: {}", current.email);
        Ok(())
    }

    pub async fn update_user(&self, id: &str, request: UpdateUserRequest) -> AppResult<Value> {
        request.validate()?;
        self.users.update(id, request.into_update()?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> UpdateMeRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_profile_update_rejects_password_fields() {
        let result = UserService::check_profile_update(&request(json!({ "passwordConfirm": "newpass123" })));
        assert!(matches!(result, Err(AppError::ValidationError(msg)) if msg.contains("/updateMyPassword")));
    }

    #[test]
    fn test_profile_update_accepts_name_and_email() {
        let result = UserService::check_profile_update(&request(json!({ "name": "Jonas", "email": "jonas@example.io" })));
        assert!(result.is_ok());
    }
}
