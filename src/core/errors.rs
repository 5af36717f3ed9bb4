//! # Application Error Handling System
//!
//! 모든 계층이 공유하는 에러 타입과 HTTP 응답 변환을 정의합니다.
//!
//! ## 분류
//!
//! - **운영 에러 (operational)**: 검증 실패, 리소스 없음, 인증 실패, 중복 키 등
//!   예상 가능한 실패입니다. 상태 코드와 함께 클라이언트에게 안전한 메시지를 그대로 보여줍니다.
//! - **알 수 없는 에러**: 데이터베이스/캐시/외부 서비스/내부 오류입니다. 서버 로그에 남기고,
//!   운영 환경에서는 `"Something went very wrong!"`으로 축약합니다.
//!
//! ## 응답 형식
//!
//! ```json
//! { "status": "fail", "message": "No tour found with that ID" }
//! ```
//!
//! 4xx 는 `"fail"`, 5xx 는 `"error"` 입니다. 개발 환경에서는 `error` 필드에 디버그 상세가 추가됩니다.
//!
//! ## HTTP 응답 매핑
//!
//! | AppError | HTTP Status |
//! |----------|-------------|
//! | `ValidationError`, `InvalidPage` | 400 Bad Request |
//! | `AuthenticationError`, `InvalidToken`, `ExpiredToken` | 401 Unauthorized |
//! | `AuthorizationError` | 403 Forbidden |
//! | `NotFound` | 404 Not Found |
//! | `ConflictError` | 409 Conflict |
//! | `EmailDeliveryError` | 500 Internal Server Error (운영 에러) |
//! | 그 외 | 500 Internal Server Error |

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Environment;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Redis error: {0}")]
    RedisError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// 고유 인덱스 위반 등 중복 데이터
    #[error("Conflict error: {0}")]
    ConflictError(String),

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Authorization error: {0}")]
    AuthorizationError(String),

    /// 서명이 맞지 않거나 형식이 잘못된 세션 토큰
    #[error("Invalid token")]
    InvalidToken,

    /// 유효 기간이 지난 세션 토큰
    #[error("Expired token")]
    ExpiredToken,

    /// 요청한 페이지의 시작 위치가 전체 결과 수를 넘어섬
    #[error("Invalid page")]
    InvalidPage,

    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 메일 발송 실패. 500 이지만 메시지를 그대로 보여줍니다.
    #[error("Email delivery error: {0}")]
    EmailDeliveryError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    /// 클라이언트에게 그대로 노출해도 되는 예상된 실패인지 여부
    pub fn is_operational(&self) -> bool {
        !matches!(
            self,
            AppError::DatabaseError(_)
                | AppError::RedisError(_)
                | AppError::ExternalServiceError(_)
                | AppError::InternalError(_)
        )
    }

    /// 응답 본문의 `message` 값
    pub fn client_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::ConflictError(msg)
            | AppError::AuthenticationError(msg)
            | AppError::AuthorizationError(msg)
            | AppError::ExternalServiceError(msg)
            | AppError::EmailDeliveryError(msg)
            | AppError::InternalError(msg) => msg.clone(),
            AppError::InvalidToken => "Invalid token. Please log in again!".to_string(),
            AppError::ExpiredToken => "Your token has expired! Please log in again.".to_string(),
            AppError::InvalidPage => "This page does not exist!".to_string(),
            other => other.to_string(),
        }
    }

    /// 환경에 맞는 에러 응답 본문을 만듭니다.
    pub fn response_body(&self, env: &Environment) -> Value {
        let status = if self.status_code().is_client_error() { "fail" } else { "error" };

        if env.is_production() && !self.is_operational() {
            return json!({
                "status": "error",
                "message": "Something went very wrong!",
            });
        }

        let mut body = json!({
            "status": status,
            "message": self.client_message(),
        });
        if !env.is_production() {
            body["error"] = Value::String(format!("{:?}", self));
        }
        body
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidPage => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            AppError::AuthenticationError(_) | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::AuthorizationError(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if !self.is_operational() {
            log::error!("💥 처리되지 않은 오류: {}", self);
        }

        HttpResponse::build(self.status_code()).json(self.response_body(&Environment::current()))
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러에 문맥을 붙여 `InternalError`로 변환합니다.
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> AppResult<T>;

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

const DUPLICATE_KEY_CODE: i32 = 11000;

impl From<mongodb::error::Error> for AppError {
    fn from(error: mongodb::error::Error) -> Self {
        use mongodb::error::{ErrorKind, WriteFailure};

        let duplicate = match error.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write_error))
                if write_error.code == DUPLICATE_KEY_CODE =>
            {
                Some(write_error.message.clone())
            }
            ErrorKind::Command(command_error) if command_error.code == DUPLICATE_KEY_CODE => {
                Some(command_error.message.clone())
            }
            _ => None,
        };

        match duplicate {
            Some(message) => AppError::ConflictError(format!(
                "Duplicate field value: {}. Please use another value!",
                duplicate_value(&message)
            )),
            None => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(error: mongodb::bson::de::Error) -> Self {
        AppError::ValidationError(format!("Invalid input data. {}", error))
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(error: mongodb::bson::ser::Error) -> Self {
        AppError::InternalError(format!("BSON 직렬화 실패: {}", error))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
            _ => AppError::InvalidToken,
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> Self {
        AppError::InternalError(format!("비밀번호 해싱 실패: {}", error))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(error: redis::RedisError) -> Self {
        AppError::RedisError(error.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(describe_validation_errors(&errors))
    }
}

/// validator 에러 목록을 `"Invalid input data. a. b"` 형태의 한 문장으로 합칩니다.
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();

    format!("Invalid input data. {}", messages.join(". "))
}

/// 중복 키 에러 메시지에서 `dup key: { ... }` 부분만 떼어냅니다.
fn duplicate_value(message: &str) -> String {
    if let Some(idx) = message.find("dup key:") {
        return message[idx + "dup key:".len()..].trim().to_string();
    }
    match (message.find('"'), message.rfind('"')) {
        (Some(start), Some(end)) if end > start => message[start..=end].to_string(),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("Email is required".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("No tour found with that ID".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::ExpiredToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::ExpiredToken.client_message(),
            "Your token has expired! Please log in again."
        );
    }

    #[test]
    fn test_invalid_page_is_bad_request() {
        assert_eq!(AppError::InvalidPage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidPage.client_message(), "This page does not exist!");
    }

    #[test]
    fn test_fail_envelope_for_client_errors() {
        let body = AppError::AuthorizationError("nope".to_string())
            .response_body(&Environment::Production);

        assert_eq!(body["status"], "fail");
        assert_eq!(body["message"], "nope");
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_production_hides_unknown_errors() {
        let body = AppError::DatabaseError("connection reset by peer".to_string())
            .response_body(&Environment::Production);

        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Something went very wrong!");
    }

    #[test]
    fn test_production_keeps_email_delivery_message() {
        let error = AppError::EmailDeliveryError(
            "There was an error sending the email. Try again later!".to_string(),
        );
        let body = error.response_body(&Environment::Production);

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.is_operational());
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "There was an error sending the email. Try again later!");
    }

    #[test]
    fn test_development_exposes_detail() {
        let body = AppError::DatabaseError("connection reset by peer".to_string())
            .response_body(&Environment::Development);

        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "connection reset by peer");
        assert!(body["error"].as_str().unwrap().contains("DatabaseError"));
    }

    #[test]
    fn test_operational_classification() {
        assert!(AppError::ConflictError("dup".into()).is_operational());
        assert!(AppError::InvalidPage.is_operational());
        assert!(!AppError::RedisError("down".into()).is_operational());
        assert!(!AppError::InternalError("bug".into()).is_operational());
    }

    #[test]
    fn test_duplicate_value_extraction() {
        let message = r#"E11000 duplicate key error collection: natours.tours index: name_1 dup key: { name: "The Forest Hiker" }"#;
        assert_eq!(duplicate_value(message), r#"{ name: "The Forest Hiker" }"#);
        assert_eq!(duplicate_value(r#"value "abc" taken"#), r#""abc""#);
    }

    #[test]
    fn test_jwt_error_translation() {
        use jsonwebtoken::errors::{Error, ErrorKind};

        let expired: AppError = Error::from(ErrorKind::ExpiredSignature).into();
        let malformed: AppError = Error::from(ErrorKind::InvalidToken).into();

        assert!(matches!(expired, AppError::ExpiredToken));
        assert!(matches!(malformed, AppError::InvalidToken));
    }

    #[test]
    fn test_error_context() {
        let result: Result<(), &str> = Err("disk full");
        let err = result.context("이미지 저장 실패").unwrap_err();

        assert!(matches!(err, AppError::InternalError(msg) if msg == "이미지 저장 실패: disk full"));
    }
}
