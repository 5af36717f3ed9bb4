//! 투어 예약 서비스 백엔드
//!
//! 투어 카탈로그, 리뷰, 예약을 다루는 REST API(`/api/v1`)와
//! Tera 템플릿으로 렌더링되는 페이지를 함께 제공합니다.
//!
//! # Features
//!
//! - **투어**: 필터/정렬/필드 선택/페이지네이션 목록, 통계, 월별 일정, 지리 검색
//! - **리뷰**: 투어당 사용자 1개, 평점 집계 자동 갱신
//! - **예약**: 체크아웃 세션, 내 예약 투어 조회
//! - **인증**: JWT 세션(헤더 또는 쿠키), 역할 기반 제한, 비밀번호 재설정 메일
//! - **업로드**: 사용자 사진, 투어 이미지 리사이즈 후 JPEG 저장
//! - **MongoDB**: 데이터 영구 저장
//! - **Redis**: 인증 시 사용자 조회 캐시
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     Routes      │ ← /api/v1/*, 페이지, 정적 파일
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Middlewares     │ ← 인증(AuthMiddleware), 요청 제한
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Handlers     │ ← 요청/응답 처리, 공통 CRUD 팩토리
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 비즈니스 로직
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← CrudRepository<E: Entity>
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ MongoDB + Redis │ ← 저장소
//! └─────────────────┘
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use tour_booking_backend::services::tours::TourService;
//!
//! // 레지스트리에 등록된 서비스 인스턴스 가져오기
//! let stats = TourService::instance().tour_stats().await?;
//! ```

pub mod core;
pub mod config;
pub mod db;
pub mod caching;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod utils;
pub mod routes;
pub mod handlers;
pub mod middlewares;
