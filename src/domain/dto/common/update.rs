//! 부분 수정 DTO → `$set` 문서 변환

use mongodb::bson::{self, Document};
use serde::Serialize;

use crate::core::errors::AppResult;

/// 부분 수정 요청을 `$set`에 넣을 문서로 바꿉니다. 값이 없는 필드는 건드리지 않습니다.
pub trait IntoUpdate {
    fn into_update(self) -> AppResult<Document>;
}

/// `Some`인 값만 직렬화해 넣는 빌더
#[derive(Debug, Default)]
pub struct UpdateDocument(Document);

impl UpdateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(mut self, key: &str, value: Option<T>) -> AppResult<Self> {
        if let Some(value) = value {
            self.0.insert(key, bson::to_bson(&value)?);
        }
        Ok(self)
    }

    pub fn build(self) -> Document {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_only_present_values_are_set() {
        let update = UpdateDocument::new()
            .set("name", Some("The Sea Explorer"))
            .unwrap()
            .set::<f64>("price", None)
            .unwrap()
            .set("secretTour", Some(true))
            .unwrap()
            .build();

        assert_eq!(update, doc! { "name": "The Sea Explorer", "secretTour": true });
    }
}
