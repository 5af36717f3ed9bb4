//! # 문자열 유틸리티
//!
//! 빈 입력 정리, slug 생성, ObjectId 파싱 등 여러 계층이 공유하는 작은 함수들입니다.

use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::core::errors::AppError;

pub fn clean_optional_string(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(clean_optional_string(opt))
}

/// 이름을 URL용 slug로 바꿉니다. 영숫자 외 문자는 `-` 하나로 합쳐집니다.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// 소수점 첫째 자리까지 반올림
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 경로 파라미터의 ObjectId를 파싱합니다. 형식이 틀리면 400 으로 변환됩니다.
pub fn parse_object_id(value: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| AppError::ValidationError(format!("Invalid _id: {}.", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_optional_string() {
        assert_eq!(clean_optional_string(Some("  World  ".to_string())), Some("World".to_string()));
        assert_eq!(clean_optional_string(Some("   ".to_string())), None);
        assert_eq!(clean_optional_string(None), None);
    }

    #[test]
    fn test_deserialize_optional_string() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(default, deserialize_with = "deserialize_optional_string")]
            name: Option<String>,
        }

        let form: Form = serde_json::from_str(r#"{"name": "  Jonas  "}"#).unwrap();
        assert_eq!(form.name.as_deref(), Some("Jonas"));

        let form: Form = serde_json::from_str(r#"{"name": " "}"#).unwrap();
        assert_eq!(form.name, None);

        let form: Form = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(form.name, None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("The Forest Hiker"), "the-forest-hiker");
        assert_eq!(slugify("  The Sea -- Explorer! "), "the-sea-explorer");
        assert_eq!(slugify("Snow Adventurer 2"), "snow-adventurer-2");
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(4.666_666), 4.7);
        assert_eq!(round_to_tenth(4.0), 4.0);
        assert_eq!(round_to_tenth(3.25), 3.3);
    }

    #[test]
    fn test_parse_object_id() {
        assert!(parse_object_id("5c88fa8cf4afda39709c2955").is_ok());

        let err = parse_object_id("wwwww").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(msg) if msg == "Invalid _id: wwwww."));
    }
}
