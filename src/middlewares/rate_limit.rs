//! # 요청 제한 응답 미들웨어
//!
//! `actix-governor`가 내보내는 429 응답을 표준 에러 봉투로 바꿉니다.
//! `Governor`보다 바깥쪽(나중에 `.wrap`)에 두어야 합니다.
//!
//! ```json
//! { "status": "fail", "message": "Too many requests from this IP, please try again in an hour!" }
//! ```

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::StatusCode,
    Error, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use serde_json::json;

pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests from this IP, please try again in an hour!";

pub struct RateLimitEnvelope;

impl<S, B> Transform<S, ServiceRequest> for RateLimitEnvelope
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = RateLimitEnvelopeService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitEnvelopeService {
            service: Rc::new(service),
        }))
    }
}

pub struct RateLimitEnvelopeService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitEnvelopeService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let http_req = req.request().clone();

        Box::pin(async move {
            match service.call(req).await {
                Ok(res) if res.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let (req, _) = res.into_parts();
                    Ok(ServiceResponse::new(req, too_many_requests()))
                }
                Ok(res) => Ok(res.map_into_boxed_body()),
                Err(err) if err.as_response_error().status_code() == StatusCode::TOO_MANY_REQUESTS => {
                    log::warn!("⏱️ 요청 제한 초과: {}", http_req.path());
                    Ok(ServiceResponse::new(http_req, too_many_requests()))
                }
                Err(err) => Err(err),
            }
        })
    }
}

fn too_many_requests() -> HttpResponse {
    HttpResponse::TooManyRequests().json(json!({
        "status": "fail",
        "message": TOO_MANY_REQUESTS_MESSAGE
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_429_is_wrapped_in_envelope() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitEnvelope)
                .route("/limited", web::get().to(|| async { HttpResponse::TooManyRequests().body("slow down") }))
                .route("/fine", web::get().to(|| async { HttpResponse::Ok().body("ok") })),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/limited").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], TOO_MANY_REQUESTS_MESSAGE);

        let res = test::call_service(&app, test::TestRequest::get().uri("/fine").to_request()).await;
        assert_eq!(test::read_body(res).await, "ok");
    }
}
