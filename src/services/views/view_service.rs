//! # 서버 렌더링 뷰 서비스
//!
//! `templates/**/*.html`의 Tera 템플릿을 시작 시 한 번 읽어 둡니다.
//! 모든 페이지는 `title`과(로그인 시) `user`를 공통 컨텍스트로 받습니다.

use std::sync::Arc;

use serde_json::Value;
use tera::{Context, Tera};

use crate::config::UploadConfig;
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::ServiceLocator;
use crate::domain::models::auth::AuthenticatedUser;

pub struct ViewService {
    tera: Tera,
}

impl ViewService {
    pub fn new(tera: Tera) -> Self {
        Self { tera }
    }

    pub fn from_env() -> AppResult<Self> {
        let glob = UploadConfig::templates_glob();
        let tera = Tera::new(&glob)
            .map_err(|e| AppError::InternalError(format!("템플릿 로드 실패 ({}): {}", glob, e)))?;

        log::info!("🖼️ 템플릿 {}개 로드", tera.get_template_names().count());
        Ok(Self::new(tera))
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// `title`, `user`와 페이지별 값을 합쳐 렌더링합니다.
    pub fn render(
        &self,
        template: &str,
        title: &str,
        user: Option<&AuthenticatedUser>,
        extra: &[(&str, Value)],
    ) -> AppResult<String> {
        let mut context = Context::new();
        context.insert("title", title);
        if let Some(user) = user {
            context.insert("user", user);
            context.insert("first_name", user.first_name());
        }
        for (key, value) in extra {
            context.insert(*key, value);
        }

        self.tera
            .render(template, &context)
            .map_err(|e| AppError::InternalError(format!("템플릿 렌더링 실패 ({}): {:?}", template, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> ViewService {
        let mut tera = Tera::default();
        tera.add_raw_template(
            "card.html",
            "{{ title }}|{% if user %}{{ first_name }}{% else %}guest{% endif %}|{{ tour.name }}",
        )
        .unwrap();
        ViewService::new(tera)
    }

    #[test]
    fn test_render_without_user() {
        let html = service()
            .render("card.html", "All Tours", None, &[("tour", json!({ "name": "The Sea Explorer" }))])
            .unwrap();
        assert_eq!(html, "All Tours|guest|The Sea Explorer");
    }

    #[test]
    fn test_render_escapes_values() {
        let html = service()
            .render("card.html", "<b>", None, &[("tour", json!({ "name": "x" }))])
            .unwrap();
        assert!(html.starts_with("&lt;b&gt;"));
    }

    #[test]
    fn test_missing_template_is_error() {
        assert!(service().render("nope.html", "x", None, &[]).is_err());
    }
}
