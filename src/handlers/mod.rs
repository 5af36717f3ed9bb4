//! HTTP 핸들러
//!
//! 핸들러는 요청을 DTO 로 받아 서비스나 [`factory`]에 넘기고, 결과를 응답 봉투로 감쌉니다.
//! 에러는 모두 [`AppError`](crate::core::errors::AppError)로 반환되어 JSON 에러 응답이 됩니다
//! (페이지 라우트는 [`views::error_page`]).

use actix_web::HttpRequest;

pub mod factory;
pub mod multipart;
pub mod auth;
pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;
pub mod views;

/// 메일 링크와 체크아웃 URL 에 쓰는 `{scheme}://{host}`
pub fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_base_url_uses_host_header() {
        let req = TestRequest::default()
            .insert_header(("host", "tours.example.com"))
            .to_http_request();
        assert_eq!(base_url(&req), "http://tours.example.com");
    }
}
