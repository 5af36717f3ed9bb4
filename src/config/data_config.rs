//! 데이터 및 서버 설정 관리 모듈
//!
//! 실행 환경, 서버 바인딩, 패스워드 해싱, 요청 제한, 업로드 경로 설정을 관리합니다.

use std::env;
use std::path::PathBuf;

/// 애플리케이션 실행 환경
///
/// 에러 응답의 상세도, 쿠키의 `Secure` 속성, bcrypt 비용 기본값이 환경에 따라 달라집니다.
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl Environment {
    /// `ENVIRONMENT` 환경변수에서 현재 환경을 읽습니다.
    ///
    /// 값이 없으면 가장 보수적인 `Production`으로 간주합니다.
    pub fn current() -> Self {
        let raw = env::var("ENVIRONMENT").unwrap_or_else(|_| "production".to_string());
        Self::from_str(&raw)
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    /// 클라이언트에게 내부 오류 상세를 숨겨야 하는 환경인지 여부
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production | Environment::Staging)
    }
}

/// bcrypt 해싱 비용 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// `BCRYPT_COST` (4~15)가 유효하면 그 값을, 아니면 환경별 기본값을 사용합니다.
    pub fn bcrypt_cost() -> u32 {
        if let Ok(cost_str) = env::var("BCRYPT_COST") {
            if let Ok(cost) = cost_str.parse::<u32>() {
                if (4..=15).contains(&cost) {
                    return cost;
                }
            }
        }

        Self::bcrypt_cost_for_env(&Environment::current())
    }

    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development => 4,
            Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

pub struct ServerConfig;

impl ServerConfig {
    pub fn port() -> u16 {
        env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080)
    }

    pub fn host() -> String {
        env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
    }

    pub fn workers() -> usize {
        env::var("SERVER_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(4)
    }

    /// JSON 요청 본문 최대 크기 (바이트)
    pub fn json_body_limit() -> usize {
        10 * 1024
    }
}

/// `/api` 경로에 적용되는 IP별 요청 제한
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    /// 시간 창 안에서 허용되는 최대 요청 수
    pub max_requests: u32,
    /// 시간 창 길이 (초)
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let max_requests = env::var("RATE_LIMIT_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or_else(|| {
                log::debug!("RATE_LIMIT_MAX 미설정, 기본값 100 사용");
                100
            });

        let window_secs = env::var("RATE_LIMIT_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(60 * 60);

        Self { max_requests, window_secs }
    }

    /// 토큰 버킷 보충 주기: 창 길이를 요청 수로 나눈 값 (최소 1초)
    pub fn seconds_per_request(&self) -> u64 {
        (self.window_secs / self.max_requests as u64).max(1)
    }
}

/// 정적 파일 및 업로드 이미지 저장 경로
pub struct UploadConfig;

impl UploadConfig {
    pub fn public_dir() -> PathBuf {
        PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()))
    }

    pub fn user_images_dir() -> PathBuf {
        Self::public_dir().join("img").join("users")
    }

    pub fn tour_images_dir() -> PathBuf {
        Self::public_dir().join("img").join("tours")
    }

    pub fn templates_glob() -> String {
        env::var("TEMPLATES_GLOB").unwrap_or_else(|_| "templates/**/*.html".to_string())
    }
}
