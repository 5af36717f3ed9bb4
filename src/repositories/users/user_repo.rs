//! # 사용자 리포지토리 구현
//!
//! 공통 CRUD 외에 인증 흐름 전용 연산을 덧붙입니다.
//! 비밀번호 해시와 재설정 토큰은 응답에서는 숨겨지지만 여기서는 그대로 읽고 씁니다.

use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};

use crate::core::errors::AppResult;
use crate::domain::entities::users::User;
use crate::repositories::crud::CrudRepository;

pub type UserRepository = CrudRepository<User>;

/// `now` 시점에 아직 만료되지 않은 재설정 토큰만 일치시키는 조건
pub fn reset_token_filter(hashed_token: &str, now: DateTime) -> Document {
    doc! {
        "passwordResetToken": hashed_token,
        "passwordResetExpires": { "$gt": now },
    }
}

impl CrudRepository<User> {
    /// 이메일 주소로 활성 사용자 조회 (비밀번호 해시 포함)
    ///
    /// 이메일은 저장 시 소문자로 정규화되므로 조회 값도 같은 방식으로 맞춥니다.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_entity_by(doc! { "email": email.trim().to_lowercase() }).await
    }

    /// 해시된 재설정 토큰으로 만료되지 않은 사용자 조회
    pub async fn find_by_reset_token(&self, hashed_token: &str) -> AppResult<Option<User>> {
        self.find_entity_by(reset_token_filter(hashed_token, DateTime::now()))
            .await
    }

    pub async fn set_reset_token(&self, id: &ObjectId, hashed_token: &str, expires_at: DateTime) -> AppResult<()> {
        self.set_fields(
            id,
            doc! {
                "passwordResetToken": hashed_token,
                "passwordResetExpires": expires_at,
            },
        )
        .await
    }

    /// 메일 발송 실패 시 재설정 토큰을 되돌립니다.
    pub async fn clear_reset_token(&self, id: &ObjectId) -> AppResult<()> {
        self.documents()
            .update_one(
                doc! { "_id": *id },
                doc! { "$unset": { "passwordResetToken": "", "passwordResetExpires": "" } },
            )
            .await?;
        self.invalidate_cache(id).await;
        Ok(())
    }

    /// [`User::replace_password`] 결과를 저장하고 재설정 토큰을 지웁니다.
    pub async fn save_password(&self, user: &User) -> AppResult<()> {
        let id = user.id.ok_or_else(Self::not_found)?;

        let mut set = doc! { "password": &user.password };
        if let Some(changed_at) = user.password_changed_at {
            set.insert("passwordChangedAt", changed_at);
        }

        self.documents()
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": set,
                    "$unset": { "passwordResetToken": "", "passwordResetExpires": "" },
                },
            )
            .await?;
        self.invalidate_cache(&id).await;
        Ok(())
    }

    /// 소프트 삭제. 이후 모든 기본 조회에서 제외됩니다.
    pub async fn deactivate(&self, id: &ObjectId) -> AppResult<()> {
        self.set_fields(id, doc! { "active": false }).await
    }
}
