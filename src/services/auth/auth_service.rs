//! # 인증 서비스
//!
//! 가입, 로그인, 세션 검증, 비밀번호 재설정/변경 흐름을 구현합니다.
//!
//! ```text
//! signup/login/reset/update ──► SignedIn { token, user }  ──► 핸들러가 쿠키 + JSON 응답
//! authenticate(token)       ──► AuthenticatedUser         ──► 미들웨어가 request extensions 에 저장
//! ```

use std::sync::Arc;

use mongodb::bson::{self, oid::ObjectId, DateTime};
use serde_json::Value;
use validator::Validate;

use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceLocator;
use crate::domain::dto::users::request::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest, UpdatePasswordRequest,
};
use crate::domain::entities::{Entity, User};
use crate::domain::models::auth::AuthenticatedUser;
use crate::repositories::users::UserRepository;
use crate::services::auth::password_service::{hash_reset_token, PasswordService};
use crate::services::auth::token_service::TokenService;
use crate::services::email::EmailService;

/// 토큰 발급이 끝난 로그인 상태
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    /// 숨김 필드가 제거된 사용자 JSON
    pub user: Value,
}

pub struct AuthService {
    users: Arc<UserRepository>,
    tokens: Arc<TokenService>,
    passwords: Arc<PasswordService>,
    email: Arc<EmailService>,
}

impl AuthService {
    pub fn new(
        users: Arc<UserRepository>,
        tokens: Arc<TokenService>,
        passwords: Arc<PasswordService>,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
            email,
        }
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// 새 계정을 만들고 바로 로그인시킵니다. 환영 메일 실패는 가입을 막지 않습니다.
    pub async fn signup(&self, request: SignupRequest, account_url: &str) -> AppResult<SignedIn> {
        request.validate()?;

        let password_hash = self.passwords.hash(&request.password)?;
        let user = User::new(request.name, request.email, password_hash);
        let stored = self.users.create(user).await?;

        let user_id = stored
            .get_object_id("_id")
            .map_err(|e| AppError::InternalError(format!("생성된 사용자 ID 없음: {}", e)))?;
        let name = stored.get_str("name").unwrap_or_default().to_string();
        let email = stored.get_str("email").unwrap_or_default().to_string();

        if let Err(e) = self.email.send_welcome(&name, &email, account_url).await {
            log::warn!("환영 메일 발송 실패 ({}): {}", email, e);
        }

        log::info!("👤 새 사용자 가입: {}", email);
        Ok(SignedIn {
            token: self.tokens.issue(&user_id)?,
            user: User::present(stored),
        })
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<SignedIn> {
        request.validate()?;

        let incorrect = || AppError::AuthenticationError("Incorrect email or password".to_string());

        let user = self.users.find_by_email(&request.email).await?.ok_or_else(incorrect)?;
        if !self.passwords.verify(&request.password, &user.password)? {
            log::debug!("로그인 실패: {}", user.email);
            return Err(incorrect());
        }

        self.signed_in(&user)
    }

    /// 세션 토큰 → 현재 사용자
    ///
    /// 토큰 서명/만료, 사용자 존재 여부, 발급 이후 비밀번호 변경 여부를 차례로 확인합니다.
    pub async fn authenticate(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let session = self.tokens.verify(token)?;
        let user_id = ObjectId::parse_str(&session.user_id).map_err(|_| AppError::InvalidToken)?;

        let user = self.users.find_cached(&user_id).await?.ok_or_else(|| {
            AppError::AuthenticationError("The user belonging to this token does no longer exist.".to_string())
        })?;

        if user.changed_password_after(session.issued_at) {
            return Err(AppError::AuthenticationError(
                "User recently changed password! Please log in again.".to_string(),
            ));
        }

        AuthenticatedUser::try_from(&user)
    }

    /// 재설정 토큰을 만들어 메일로 보냅니다. 발송에 실패하면 토큰을 되돌립니다.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest, reset_base_url: &str) -> AppResult<()> {
        request.validate()?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::NotFound("There is no user with email address.".to_string()))?;
        let user_id = user.id.ok_or_else(UserRepository::not_found)?;

        let reset_token = self.passwords.create_reset_token();
        self.users
            .set_reset_token(&user_id, &reset_token.hashed, reset_token.expires_at)
            .await?;

        let reset_url = format!("{}/{}", reset_base_url.trim_end_matches('/'), reset_token.plain);
        if let Err(e) = self.email.send_password_reset(&user.name, &user.email, &reset_url).await {
            log::error!("재설정 메일 발송 실패 ({}): {}", user.email, e);
            self.users.clear_reset_token(&user_id).await?;
            return Err(AppError::EmailDeliveryError(
                "There was an error sending the email. Try again later!".to_string(),
            ));
        }

        Ok(())
    }

    pub async fn reset_password(&self, plain_token: &str, request: ResetPasswordRequest) -> AppResult<SignedIn> {
        request.validate()?;

        let mut user = self
            .users
            .find_by_reset_token(&hash_reset_token(plain_token))
            .await?
            .ok_or_else(|| AppError::ValidationError("Token is invalid or has expired".to_string()))?;

        let password_hash = self.passwords.hash(&request.password)?;
        user.replace_password(password_hash, DateTime::now());
        self.users.save_password(&user).await?;

        self.signed_in(&user)
    }

    pub async fn update_password(
        &self,
        current: &AuthenticatedUser,
        request: UpdatePasswordRequest,
    ) -> AppResult<SignedIn> {
        request.validate()?;

        let mut user = self
            .users
            .find_entity(&current.user_id)
            .await?
            .ok_or_else(UserRepository::not_found)?;

        if !self.passwords.verify(&request.password_current, &user.password)? {
            return Err(AppError::AuthenticationError("Your current password is wrong.".to_string()));
        }

        let password_hash = self.passwords.hash(&request.password)?;
        user.replace_password(password_hash, DateTime::now());
        self.users.save_password(&user).await?;

        self.signed_in(&user)
    }

    fn signed_in(&self, user: &User) -> AppResult<SignedIn> {
        let user_id = user.id.ok_or_else(UserRepository::not_found)?;
        Ok(SignedIn {
            token: self.tokens.issue(&user_id)?,
            user: User::present(bson::to_document(user)?),
        })
    }
}
