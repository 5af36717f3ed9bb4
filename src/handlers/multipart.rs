//! `multipart/form-data` 본문을 텍스트 필드와 파일로 나눠 읽습니다.

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::errors::{AppError, AppResult};
use crate::services::uploads::UploadedFile;

/// 파일 하나의 최대 크기
const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
/// 텍스트 필드 하나의 최대 크기
const MAX_FIELD_BYTES: usize = 10 * 1024;
/// 요청 본문 전체 상한 (표지 1장 + 투어 이미지 3장)
pub const MAX_UPLOAD_BYTES: usize = 4 * MAX_FILE_BYTES;

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadedFile>,
}

impl MultipartForm {
    pub async fn collect(mut payload: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(mut field) = payload.try_next().await.map_err(invalid_body)? {
            let name = field.name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(|mime| mime.to_string());
            let is_file = field
                .content_disposition()
                .and_then(|disposition| disposition.get_filename())
                .is_some();
            let limit = if is_file { MAX_FILE_BYTES } else { MAX_FIELD_BYTES };

            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(invalid_body)? {
                if bytes.len() + chunk.len() > limit {
                    return Err(AppError::ValidationError(format!("Field '{}' is too large.", name)));
                }
                bytes.extend_from_slice(&chunk);
            }

            if is_file {
                form.files.push(UploadedFile {
                    field: name,
                    content_type,
                    bytes,
                });
            } else {
                form.fields.push((name, String::from_utf8_lossy(&bytes).into_owned()));
            }
        }

        Ok(form)
    }

    /// 이름이 `field`인 첫 파일을 꺼냅니다.
    pub fn take_file(&mut self, field: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|file| file.field == field)?;
        Some(self.files.remove(index))
    }

    /// 이름이 `field`인 파일을 모두 꺼냅니다.
    pub fn take_files(&mut self, field: &str) -> Vec<UploadedFile> {
        let (taken, rest): (Vec<UploadedFile>, Vec<UploadedFile>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|file| file.field == field);
        self.files = rest;
        taken
    }

    /// 텍스트 필드를 DTO 로 변환합니다. `typed`이면 숫자/불리언 문자열을 해당 타입으로 읽습니다.
    pub fn into_dto<T: DeserializeOwned>(&self, typed: bool) -> AppResult<T> {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| {
                let value = if typed { literal(value) } else { Value::String(value.clone()) };
                (key.clone(), value)
            })
            .collect();

        serde_json::from_value(Value::Object(object))
            .map_err(|e| AppError::ValidationError(format!("Invalid input data. {}", e)))
    }
}

fn literal(raw: &str) -> Value {
    if let Ok(integer) = raw.parse::<i64>() {
        return Value::from(integer);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() {
            return Value::from(float);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn invalid_body(error: actix_multipart::MultipartError) -> AppError {
    AppError::ValidationError(format!("Invalid multipart body: {}", error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dto::tours::UpdateTourRequest;
    use crate::domain::dto::users::UpdateMeRequest;

    fn form(fields: &[(&str, &str)]) -> MultipartForm {
        MultipartForm {
            fields: fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            files: vec![
                UploadedFile { field: "images".into(), content_type: None, bytes: vec![1] },
                UploadedFile { field: "imageCover".into(), content_type: None, bytes: vec![2] },
                UploadedFile { field: "images".into(), content_type: None, bytes: vec![3] },
            ],
        }
    }

    #[test]
    fn test_typed_fields_for_tour_update() {
        let request: UpdateTourRequest = form(&[("price", "497"), ("secretTour", "false")])
            .into_dto(true)
            .unwrap();
        assert_eq!(request.price, Some(497.0));
        assert_eq!(request.secret_tour, Some(false));
    }

    #[test]
    fn test_text_fields_stay_strings() {
        let request: UpdateMeRequest = form(&[("name", "1234")]).into_dto(false).unwrap();
        assert_eq!(request.name.as_deref(), Some("1234"));
    }

    #[test]
    fn test_take_files_by_field() {
        let mut form = form(&[]);
        assert_eq!(form.take_file("imageCover").unwrap().bytes, vec![2]);
        let images = form.take_files("images");
        assert_eq!(images.len(), 2);
        assert!(form.files.is_empty());
    }
}
