//! # Redis 캐시 클라이언트
//!
//! 인증 가드가 매 요청마다 사용자를 다시 조회하므로, 엔티티를 JSON 으로 짧게 캐싱합니다.
//! 쓰기(정보 수정, 비밀번호 변경, 탈퇴, 평점 갱신)가 일어나면 해당 키를 지웁니다.
//!
//! 연결은 [`ConnectionManager`] 하나를 복제해서 쓰며, 끊기면 자동으로 다시 연결합니다.

use std::env;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, ErrorKind, RedisError};
use serde::{de::DeserializeOwned, Serialize};

#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
}

impl RedisClient {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let mut manager = ConnectionManager::new(Client::open(redis_url)?).await?;
        redis::cmd("PING").query_async::<()>(&mut manager).await?;

        Ok(Self { manager })
    }

    /// JSON 으로 저장된 값을 읽습니다. 형식이 맞지 않으면 에러입니다.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RedisError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;

        value
            .map(|json| serde_json::from_str(&json).map_err(|e| codec_error("Deserialization failed", e)))
            .transpose()
    }

    pub async fn set_with_expiry<T: Serialize>(&self, key: &str, value: &T, seconds: u64) -> Result<(), RedisError> {
        let json = serde_json::to_string(value).map_err(|e| codec_error("Serialization failed", e))?;
        let mut conn = self.manager.clone();
        conn.set_ex(key, json, seconds).await
    }

    pub async fn del(&self, key: &str) -> Result<(), RedisError> {
        let mut conn = self.manager.clone();
        conn.del(key).await
    }
}

fn codec_error(what: &'static str, e: serde_json::Error) -> RedisError {
    RedisError::from((ErrorKind::TypeError, what, e.to_string()))
}
