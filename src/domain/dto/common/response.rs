//! 성공 응답 봉투
//!
//! ```json
//! { "status": "success", "results": 2, "data": { "data": [ ... ] } }
//! { "status": "success", "token": "eyJ...", "data": { "user": { ... } } }
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl ApiResponse {
    pub fn success() -> Self {
        Self {
            status: "success",
            results: None,
            token: None,
            data: None,
        }
    }

    /// `data: { key: value }`
    pub fn with(key: &str, value: Value) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), value);
        Self {
            data: Some(data),
            ..Self::success()
        }
    }

    /// `results: n, data: { key: [...] }`
    pub fn list(key: &str, items: Vec<Value>) -> Self {
        let results = items.len();
        Self {
            results: Some(results),
            ..Self::with(key, Value::Array(items))
        }
    }

    pub fn token(mut self, token: String) -> Self {
        self.token = Some(token);
        self
    }
}
