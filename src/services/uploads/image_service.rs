//! # 이미지 업로드 서비스
//!
//! 업로드된 이미지를 고정 크기로 잘라 JPEG(품질 90)으로 `public/img/...`에 저장합니다.
//!
//! | 대상          | 크기        | 파일 이름                         |
//! |---------------|-------------|-----------------------------------|
//! | 사용자 사진    | 500 × 500   | `user-{id}-{ts}.jpeg`             |
//! | 투어 커버      | 2000 × 1333 | `tour-{id}-{ts}-cover.jpeg`       |
//! | 투어 이미지    | 2000 × 1333 | `tour-{id}-{ts}-{n}.jpeg` (최대 3) |
//!
//! 디코딩과 리사이즈는 블로킹 스레드 풀에서 실행됩니다.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::web;
use chrono::Utc;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::config::UploadConfig;
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::core::registry::ServiceLocator;

pub const USER_PHOTO_SIZE: (u32, u32) = (500, 500);
pub const TOUR_IMAGE_SIZE: (u32, u32) = (2000, 1333);
pub const MAX_TOUR_IMAGES: usize = 3;
const JPEG_QUALITY: u8 = 90;

/// 멀티파트에서 읽어 온 파일 하나
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// `image/*` 이외의 업로드는 거절합니다.
    pub fn ensure_image(&self) -> AppResult<()> {
        match &self.content_type {
            Some(content_type) if content_type.starts_with("image/") => Ok(()),
            _ => Err(not_an_image()),
        }
    }
}

fn not_an_image() -> AppError {
    AppError::ValidationError("Not an image! Please upload only images.".to_string())
}

pub struct ImageService {
    users_dir: PathBuf,
    tours_dir: PathBuf,
}

impl ImageService {
    pub fn new(users_dir: PathBuf, tours_dir: PathBuf) -> Self {
        Self { users_dir, tours_dir }
    }

    pub fn from_env() -> Self {
        Self::new(UploadConfig::user_images_dir(), UploadConfig::tour_images_dir())
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// 사용자 사진을 저장하고 파일 이름을 돌려줍니다.
    pub async fn save_user_photo(&self, user_id: &str, file: UploadedFile) -> AppResult<String> {
        file.ensure_image()?;
        let filename = format!("user-{}-{}.jpeg", user_id, Utc::now().timestamp_millis());
        self.store(self.users_dir.clone(), filename, file.bytes, USER_PHOTO_SIZE).await
    }

    /// 투어 커버와 추가 이미지를 저장합니다. 추가 이미지는 앞에서부터 최대 3장입니다.
    pub async fn save_tour_images(
        &self,
        tour_id: &str,
        cover: Option<UploadedFile>,
        images: Vec<UploadedFile>,
    ) -> AppResult<(Option<String>, Vec<String>)> {
        let timestamp = Utc::now().timestamp_millis();

        let cover = match cover {
            Some(file) => {
                file.ensure_image()?;
                let filename = format!("tour-{}-{}-cover.jpeg", tour_id, timestamp);
                Some(self.store(self.tours_dir.clone(), filename, file.bytes, TOUR_IMAGE_SIZE).await?)
            }
            None => None,
        };

        let mut saved = Vec::new();
        for (index, file) in images.into_iter().take(MAX_TOUR_IMAGES).enumerate() {
            file.ensure_image()?;
            let filename = format!("tour-{}-{}-{}.jpeg", tour_id, timestamp, index + 1);
            saved.push(self.store(self.tours_dir.clone(), filename, file.bytes, TOUR_IMAGE_SIZE).await?);
        }

        Ok((cover, saved))
    }

    async fn store(&self, dir: PathBuf, filename: String, bytes: Vec<u8>, size: (u32, u32)) -> AppResult<String> {
        let written = web::block(move || -> AppResult<String> {
            let jpeg = resize_to_jpeg(&bytes, size)?;
            fs::create_dir_all(&dir).context("이미지 디렉터리 생성 실패")?;
            fs::write(dir.join(&filename), jpeg).context("이미지 저장 실패")?;
            Ok(filename)
        })
        .await
        .map_err(|e| AppError::InternalError(format!("이미지 처리 작업 실패: {}", e)))??;

        log::debug!("🖼️ 이미지 저장: {}", written);
        Ok(written)
    }
}

/// 가운데를 기준으로 잘라 `size`로 맞춘 뒤 JPEG 으로 인코딩합니다.
pub fn resize_to_jpeg(bytes: &[u8], (width, height): (u32, u32)) -> AppResult<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).map_err(|_| not_an_image())?;
    let resized = decoded.resize_to_fill(width, height, FilterType::Lanczos3);

    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(resized.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY))
        .map_err(|e| AppError::InternalError(format!("JPEG 인코딩 실패: {}", e)))?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::{ImageFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_resize_to_jpeg_fills_target() {
        let jpeg = resize_to_jpeg(&png(80, 40), (50, 50)).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (50, 50));
        assert_eq!(image::guess_format(&jpeg).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_non_image_bytes_are_rejected() {
        let err = resize_to_jpeg(b"definitely not an image", (50, 50)).unwrap_err();
        assert_eq!(err.to_string(), not_an_image().to_string());
    }

    #[test]
    fn test_content_type_must_be_image() {
        let file = UploadedFile {
            field: "photo".to_string(),
            content_type: Some("text/plain".to_string()),
            bytes: Vec::new(),
        };
        assert!(matches!(file.ensure_image(), Err(AppError::ValidationError(_))));
    }
}
