//! # 메일 발송 서비스
//!
//! HTTP 메일 API(`EMAIL_API_URL`)로 JSON 메시지를 전송합니다.
//! URL이 설정되지 않은 개발 환경에서는 메시지를 로그로만 남깁니다.

use std::sync::Arc;

use serde::Serialize;

use crate::config::EmailConfig;
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceLocator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

pub struct EmailService {
    http: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    from: String,
}

impl EmailService {
    pub fn from_env() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: EmailConfig::api_url(),
            api_key: EmailConfig::api_key(),
            from: EmailConfig::from_address(),
        }
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    pub async fn send_welcome(&self, name: &str, email: &str, url: &str) -> AppResult<()> {
        self.send(welcome_message(&self.from, name, email, url)).await
    }

    pub async fn send_password_reset(&self, name: &str, email: &str, url: &str) -> AppResult<()> {
        self.send(password_reset_message(&self.from, name, email, url)).await
    }

    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let Some(api_url) = &self.api_url else {
            log::info!("📧 [mail:log] to={} subject={:?}\n{}", message.to, message.subject, message.text);
            return Ok(());
        };

        let mut request = self.http.post(api_url).json(&message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("메일 API 요청 실패: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "메일 API 응답 오류: {}",
                response.status()
            )));
        }

        log::info!("📧 메일 발송 완료: {} ({})", message.to, message.subject);
        Ok(())
    }
}

fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

pub fn welcome_message(from: &str, name: &str, email: &str, url: &str) -> EmailMessage {
    EmailMessage {
        from: from.to_string(),
        to: email.to_string(),
        subject: "Welcome to the Tour Booking Family!".to_string(),
        text: format!(
            "Hi {},\n\nWelcome aboard! Upload a profile photo and start exploring: {}\n",
            first_name(name),
            url
        ),
    }
}

pub fn password_reset_message(from: &str, name: &str, email: &str, url: &str) -> EmailMessage {
    EmailMessage {
        from: from.to_string(),
        to: email.to_string(),
        subject: "Your password reset token (valid for only 10 minutes)".to_string(),
        text: format!(
            "Hi {},\n\nForgot your password? Submit a PATCH request with your new password and \
             passwordConfirm to: {}\nIf you didn't forget your password, please ignore this email!\n",
            first_name(name),
            url
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_message_contains_url() {
        let message = password_reset_message(
            "hello@tourbooking.io",
            "Laura Wilson",
            "laura@example.com",
            "http://127.0.0.1:8080/api/v1/users/resetPassword/abc",
        );

        assert_eq!(message.to, "laura@example.com");
        assert!(message.text.starts_with("Hi Laura,"));
        assert!(message.text.contains("/resetPassword/abc"));
    }

    #[actix_web::test]
    async fn test_send_without_api_url_only_logs() {
        let service = EmailService {
            http: reqwest::Client::new(),
            api_url: None,
            api_key: None,
            from: "hello@tourbooking.io".to_string(),
        };

        assert!(service.send_welcome("Jonas", "jonas@example.io", "http://localhost/me").await.is_ok());
    }
}
