//! # Authentication Configuration Module
//!
//! JWT 세션 토큰, 세션 쿠키, 비밀번호 재설정 토큰, 메일 발송 설정을 관리합니다.
//!
//! ## 환경 변수
//!
//! ```bash
//! export JWT_SECRET="my-ultra-secure-and-ultra-long-secret"
//! export JWT_EXPIRES_IN="90d"            # 90d, 12h, 30m, 45s 또는 초 단위 숫자
//! export JWT_COOKIE_EXPIRES_IN="90"      # 일 단위
//! export PASSWORD_RESET_EXPIRES_MINUTES="10"
//! export EMAIL_API_URL="https://mail.example.com/v1/send"
//! export EMAIL_API_KEY="..."
//! export EMAIL_FROM="Tour Booking <hello@example.com>"
//! ```

use std::env;

use crate::config::data_config::Environment;

pub struct JwtConfig;

impl JwtConfig {
    pub fn secret() -> String {
        env::var("JWT_SECRET")
            .unwrap_or_else(|_| {
                log::warn!("JWT_SECRET not set, using default (not secure for production!)");
                "your-secret-key".to_string()
            })
    }

    /// 세션 토큰 유효 기간 (초)
    pub fn expires_in_secs() -> i64 {
        env::var("JWT_EXPIRES_IN")
            .ok()
            .and_then(|raw| parse_duration_secs(&raw))
            .unwrap_or(90 * 24 * 60 * 60)
    }
}

/// 세션 토큰 쿠키 설정
pub struct CookieConfig;

impl CookieConfig {
    pub fn name() -> &'static str {
        "jwt"
    }

    /// 쿠키 유효 기간 (일)
    pub fn expires_days() -> i64 {
        env::var("JWT_COOKIE_EXPIRES_IN")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|days: &i64| *days > 0)
            .unwrap_or(90)
    }

    /// 운영 환경에서만 `Secure` 속성을 붙입니다.
    pub fn secure() -> bool {
        Environment::current().is_production()
    }

    /// 로그아웃 시 덮어쓰는 쿠키 값과 유지 시간 (초)
    pub fn logged_out_value() -> &'static str {
        "loggedout"
    }

    pub fn logged_out_secs() -> i64 {
        10
    }
}

pub struct ResetTokenConfig;

impl ResetTokenConfig {
    pub fn expires_in_minutes() -> i64 {
        env::var("PASSWORD_RESET_EXPIRES_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|m: &i64| *m > 0)
            .unwrap_or(10)
    }
}

/// HTTP 메일 API 설정. URL이 없으면 메일은 로그로만 남습니다.
pub struct EmailConfig;

impl EmailConfig {
    pub fn api_url() -> Option<String> {
        env::var("EMAIL_API_URL").ok().filter(|v| !v.trim().is_empty())
    }

    pub fn api_key() -> Option<String> {
        env::var("EMAIL_API_KEY").ok()
    }

    pub fn from_address() -> String {
        env::var("EMAIL_FROM").unwrap_or_else(|_| "Tour Booking <hello@tourbooking.io>".to_string())
    }
}

/// `90d`, `12h`, `30m`, `45s`, `3600` 형식의 기간 문자열을 초로 변환합니다.
pub fn parse_duration_secs(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let (number, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], c.to_ascii_lowercase()),
        _ => (raw, 's'),
    };

    let value: i64 = number.trim().parse().ok()?;
    let multiplier = match unit {
        'd' => 24 * 60 * 60,
        'h' => 60 * 60,
        'm' => 60,
        's' => 1,
        _ => return None,
    };

    value.checked_mul(multiplier).filter(|secs| *secs > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_secs("90d"), Some(90 * 86_400));
        assert_eq!(parse_duration_secs("12h"), Some(12 * 3_600));
        assert_eq!(parse_duration_secs("30m"), Some(1_800));
        assert_eq!(parse_duration_secs("45s"), Some(45));
        assert_eq!(parse_duration_secs("3600"), Some(3_600));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert_eq!(parse_duration_secs(""), None);
        assert_eq!(parse_duration_secs("abc"), None);
        assert_eq!(parse_duration_secs("10w"), None);
        assert_eq!(parse_duration_secs("-5d"), None);
    }

    #[test]
    fn test_cookie_name_is_jwt() {
        assert_eq!(CookieConfig::name(), "jwt");
        assert_eq!(CookieConfig::logged_out_value(), "loggedout");
    }
}
