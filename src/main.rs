//! 투어 예약 서비스 메인 애플리케이션
//!
//! Actix-web 기반의 HTTP 서버를 구동하고 모든 리포지토리와 서비스를 등록합니다.
//! MongoDB, Redis 연결을 설정하고 REST API(`/api/v1`)와 서버 렌더링 페이지를 제공합니다.

use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use tokio::sync::mpsc;

use tour_booking_backend::caching::redis::RedisClient;
use tour_booking_backend::config::{RateLimitConfig, ServerConfig};
use tour_booking_backend::core::errors::AppResult;
use tour_booking_backend::core::registry::ServiceLocator;
use tour_booking_backend::db::Database;
use tour_booking_backend::domain::entities::{Booking, Review, Tour, User};
use tour_booking_backend::middlewares::RateLimitEnvelope;
use tour_booking_backend::repositories::CrudRepository;
use tour_booking_backend::routes;
use tour_booking_backend::services::auth::{AuthService, PasswordService, TokenService};
use tour_booking_backend::services::bookings::BookingService;
use tour_booking_backend::services::email::EmailService;
use tour_booking_backend::services::reviews::ReviewService;
use tour_booking_backend::services::tours::TourService;
use tour_booking_backend::services::uploads::ImageService;
use tour_booking_backend::services::users::UserService;
use tour_booking_backend::services::views::ViewService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 투어 예약 서비스 시작중...");

    // 데이터 스토어 초기화
    let (database, redis_client) = initialize_data_stores().await;

    // ServiceLocator에 핵심 인프라 등록
    ServiceLocator::set(database.clone());
    ServiceLocator::set(redis_client.clone());

    if let Err(e) = register_components(database, redis_client) {
        error!("💥 서비스 등록 실패: {}", e);
        std::process::exit(1);
    }

    // 인덱스 생성 등 초기화
    if let Err(e) = ServiceLocator::initialize_all().await {
        error!("💥 서비스 초기화 실패: {}", e);
        std::process::exit(1);
    }

    info!("✅ 모든 서비스가 성공적으로 초기화되었습니다!");

    // HTTP 서버 시작
    start_http_server().await
}

/// 리포지토리와 서비스를 생성해 레지스트리에 등록합니다.
///
/// 서비스는 생성 시점에 의존 리포지토리를 주입받으므로 리포지토리를 먼저 등록합니다.
fn register_components(db: Arc<Database>, redis: Arc<RedisClient>) -> AppResult<()> {
    let users = Arc::new(CrudRepository::<User>::new(db.clone(), redis.clone()));
    let tours = Arc::new(CrudRepository::<Tour>::new(db.clone(), redis.clone()));
    let reviews = Arc::new(CrudRepository::<Review>::new(db.clone(), redis.clone()));
    let bookings = Arc::new(CrudRepository::<Booking>::new(db, redis));

    ServiceLocator::register_repository(users.clone());
    ServiceLocator::register_repository(tours.clone());
    ServiceLocator::register_repository(reviews.clone());
    ServiceLocator::register_repository(bookings.clone());

    let token_service = Arc::new(TokenService::from_env());
    let password_service = Arc::new(PasswordService::from_env());
    let email_service = Arc::new(EmailService::from_env());

    ServiceLocator::register_service("TokenService", token_service.clone());
    ServiceLocator::register_service("PasswordService", password_service.clone());
    ServiceLocator::register_service("EmailService", email_service.clone());
    ServiceLocator::register_service(
        "AuthService",
        Arc::new(AuthService::new(users.clone(), token_service, password_service, email_service)),
    );
    ServiceLocator::register_service("UserService", Arc::new(UserService::new(users)));
    ServiceLocator::register_service("TourService", Arc::new(TourService::new(tours.clone())));
    ServiceLocator::register_service(
        "ReviewService",
        Arc::new(ReviewService::new(reviews, tours.clone())),
    );
    ServiceLocator::register_service("BookingService", Arc::new(BookingService::new(bookings, tours)));
    ServiceLocator::register_service("ImageService", Arc::new(ImageService::from_env()));
    ServiceLocator::register_service("ViewService", Arc::new(ViewService::from_env()?));

    Ok(())
}

/// HTTP 서버를 구성하고 실행합니다
///
/// 처리되지 않은 패닉이 발생하면 진행 중인 요청을 마무리한 뒤 프로세스를 종료합니다.
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server() -> std::io::Result<()> {
    let bind_address = format!("{}:{}", ServerConfig::host(), ServerConfig::port());

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 API: http://{}/api/v1", bind_address);

    // Rate Limiting 설정 (/api 에만 적용)
    let rate_limit = RateLimitConfig::from_env();
    let governor_conf = GovernorConfigBuilder::default()
        .seconds_per_request(rate_limit.seconds_per_request())
        .burst_size(rate_limit.max_requests)
        .use_headers()
        .finish()
        .ok_or_else(|| std::io::Error::other("잘못된 요청 제한 설정"))?;

    info!(
        "🛡️ Rate Limiting 활성화: {}초당 {}요청",
        rate_limit.window_secs, rate_limit.max_requests
    );

    let server = HttpServer::new(move || {
        App::new()
            .wrap(security_headers())
            .wrap(configure_cors())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(routes::configure_extractors)
            .service(routes::health_check)
            .service(
                web::scope("/api/v1")
                    .wrap(Governor::new(&governor_conf))
                    .wrap(RateLimitEnvelope)
                    .configure(routes::configure_api_routes),
            )
            .configure(routes::configure_page_routes)
            .default_service(web::to(routes::not_found))
    })
    .bind(bind_address)?
    .workers(ServerConfig::workers())
    .run();

    shutdown_on_panic(server.handle());

    server.await
}

/// 패닉 훅에서 종료 신호를 보내고, 신호를 받으면 서버를 정상 종료한 뒤 코드 1로 끝냅니다.
fn shutdown_on_panic(handle: actix_web::dev::ServerHandle) {
    let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<String>();

    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = shutdown_tx.send(panic_info.to_string());
    }));

    actix_web::rt::spawn(async move {
        if let Some(reason) = shutdown_rx.recv().await {
            error!("💥 UNHANDLED PANIC! 서버를 종료합니다...");
            error!("{}", reason);
            handle.stop(true).await;
            std::process::exit(1);
        }
    });
}

/// 환경별 설정 파일을 로드합니다
///
/// # Environment Variables
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=debug")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// MongoDB와 Redis 연결을 초기화합니다
///
/// 연결 실패는 복구할 수 없으므로 로그를 남기고 코드 1로 종료합니다.
async fn initialize_data_stores() -> (Arc<Database>, Arc<RedisClient>) {
    info!("📡 데이터베이스 연결 중...");

    let database = match Database::new().await {
        Ok(database) => Arc::new(database),
        Err(e) => {
            error!("💥 데이터베이스 연결 실패: {}", e);
            std::process::exit(1);
        }
    };

    info!("✅ MongoDB 연결 성공");

    let redis_client = match RedisClient::new().await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("💥 Redis 연결 실패: {}", e);
            std::process::exit(1);
        }
    };

    info!("✅ Redis 연결 성공");

    (database, redis_client)
}

/// CORS 설정을 구성합니다
///
/// `CORS_ALLOWED_ORIGINS`(쉼표 구분)가 있으면 해당 Origin만, 없으면 모든 Origin을 허용합니다.
fn configure_cors() -> Cors {
    let origins: Vec<String> = std::env::var("CORS_ALLOWED_ORIGINS")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let cors = if origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors
        // 허용할 HTTP 메서드
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"])
        // 허용할 헤더
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        // 자격 증명(쿠키 등) 지원
        .supports_credentials()
        // Preflight 요청 캐시 시간 (초)
        .max_age(3600)
}

/// 기본 보안 응답 헤더
fn security_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .add((header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .add((header::REFERRER_POLICY, "no-referrer"))
        .add((header::STRICT_TRANSPORT_SECURITY, "max-age=15552000; includeSubDomains"))
        .add((header::X_XSS_PROTECTION, "0"))
}
