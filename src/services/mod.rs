//! 비즈니스 로직 계층
//!
//! 서비스는 리포지토리와 다른 서비스를 `Arc`로 주입받아 생성되고, `main`에서
//! `ServiceLocator::register_service`로 등록된 뒤 `XxxService::instance()`로 사용됩니다.
//! 제네릭 CRUD로 충분한 연산은 서비스 없이 핸들러 팩토리가 리포지토리를 직접 호출합니다.

pub mod auth;
pub mod email;
pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;
pub mod uploads;
pub mod views;
