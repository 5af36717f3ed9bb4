//! # 인증 요청 DTO
//!
//! 회원가입, 로그인, 비밀번호 찾기/재설정/변경 요청을 정의합니다.
//! `passwordConfirm`은 검증에만 쓰이고 엔티티로 옮겨지지 않습니다.

use serde::Deserialize;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_signup_passwords_match"))]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 80, message = "Please tell us your name!"))]
    pub name: String,

    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,

    #[validate(length(min = 8, message = "A password must have at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub password_confirm: String,
}

fn validate_signup_passwords_match(req: &SignupRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide email and password!"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide email and password!"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_reset_passwords_match"))]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "A password must have at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub password_confirm: String,
}

fn validate_reset_passwords_match(req: &ResetPasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_passwords_match"))]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide your current password"))]
    pub password_current: String,

    #[validate(length(min = 8, message = "A password must have at least 8 characters"))]
    pub password: String,

    #[serde(default)]
    pub password_confirm: String,
}

fn validate_update_passwords_match(req: &UpdatePasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

fn passwords_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::new("passwords_mismatch")
            .with_message("Passwords are not the same!".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::describe_validation_errors;

    fn signup(password: &str, confirm: &str) -> SignupRequest {
        serde_json::from_value(serde_json::json!({
            "name": "Jonas",
            "email": "jonas@example.io",
            "password": password,
            "passwordConfirm": confirm,
        }))
        .unwrap()
    }

    #[test]
    fn test_signup_accepts_matching_passwords() {
        assert!(signup("pass1234", "pass1234").validate().is_ok());
    }

    #[test]
    fn test_signup_rejects_mismatch() {
        let errors = signup("pass1234", "pass4321").validate().unwrap_err();
        assert!(describe_validation_errors(&errors).contains("Passwords are not the same!"));
    }

    #[test]
    fn test_signup_rejects_short_password() {
        let errors = signup("short", "short").validate().unwrap_err();
        assert!(describe_validation_errors(&errors).contains("at least 8 characters"));
    }

    #[test]
    fn test_login_requires_both_fields() {
        let request: LoginRequest = serde_json::from_str(r#"{"email": "jonas@example.io"}"#).unwrap();
        let errors = request.validate().unwrap_err();

        assert_eq!(
            describe_validation_errors(&errors),
            "Invalid input data. Please provide email and password!"
        );
    }

    #[test]
    fn test_update_password_requires_current() {
        let request: UpdatePasswordRequest = serde_json::from_value(serde_json::json!({
            "password": "newpass123",
            "passwordConfirm": "newpass123",
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }
}
