//! 데이터 액세스 계층
//!
//! 모든 컬렉션은 [`crud::CrudRepository`] 하나로 다루고, 엔티티별로 필요한 조회만
//! `impl CrudRepository<Entity>` 블록으로 덧붙입니다. 인스턴스는 `ServiceLocator`에
//! 등록되어 `XxxRepository::instance()`로 꺼내 씁니다.
//!
//! ```rust,ignore
//! use crate::repositories::users::UserRepository;
//!
//! let user_repo = UserRepository::instance();
//! let user = user_repo.find_by_email("user@example.com").await?;
//! ```

pub mod crud;
pub mod users;
pub mod tours;
pub mod reviews;
pub mod bookings;

pub use crud::CrudRepository;
