//! # Service Registry
//!
//! 타입 기반 싱글톤 컨테이너입니다. 인프라(`Database`, `RedisClient`, `Tera`),
//! 리포지토리, 서비스 인스턴스를 `TypeId`로 보관하고, 각 타입은 `Type::instance()`로
//! 자신을 꺼내 씁니다.
//!
//! ```text
//! main
//!  ├─ ServiceLocator::set(database)                 인프라 등록
//!  ├─ ServiceLocator::register_repository(repo)     리포지토리 등록 (+ init 대상)
//!  ├─ ServiceLocator::register_service(name, svc)   서비스 등록
//!  └─ ServiceLocator::initialize_all().await        인덱스 생성 등 초기화
//! ```
//!
//! 등록되지 않은 타입을 `get`으로 요청하는 것은 배선 실수이므로 패닉으로 즉시 드러냅니다.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::core::errors::AppResult;
use crate::utils::display_terminal::{
    print_boxed_title, print_final_summary, print_step_complete, print_step_start, print_sub_task,
};

/// 시작 시 초기화가 필요한 데이터 접근 컴포넌트
#[async_trait]
pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    fn collection_name(&self) -> &str;

    /// 컬렉션 인덱스 생성 등 시작 시 한 번 실행되는 작업
    async fn init(&self) -> AppResult<()>;
}

pub struct ServiceLocator {
    instances: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    repositories: RwLock<Vec<Arc<dyn Repository>>>,
    services: RwLock<Vec<&'static str>>,
}

impl ServiceLocator {
    fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            repositories: RwLock::new(Vec::new()),
            services: RwLock::new(Vec::new()),
        }
    }

    /// 등록된 인스턴스를 반환합니다. 등록되지 않았다면 패닉합니다.
    pub fn get<T: 'static + Send + Sync>() -> Arc<T> {
        match Self::try_get::<T>() {
            Some(instance) => instance,
            None => panic!(
                "Service not found: {}. Register it with ServiceLocator::set() before use",
                std::any::type_name::<T>()
            ),
        }
    }

    pub fn try_get<T: 'static + Send + Sync>() -> Option<Arc<T>> {
        let instances = LOCATOR.instances.read().unwrap_or_else(PoisonError::into_inner);
        instances
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|instance| instance.downcast::<T>().ok())
    }

    pub fn set<T: 'static + Send + Sync>(instance: Arc<T>) {
        let clean_name = Self::extract_clean_type_name(std::any::type_name::<T>());
        log::debug!("📦 Registering: {}", clean_name);

        let mut instances = LOCATOR.instances.write().unwrap_or_else(PoisonError::into_inner);
        instances.insert(TypeId::of::<T>(), instance as Arc<dyn Any + Send + Sync>);
    }

    pub fn register_repository<T: Repository + 'static>(repository: Arc<T>) {
        Self::set(repository.clone());
        LOCATOR
            .repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(repository);
    }

    pub fn register_service<T: 'static + Send + Sync>(name: &'static str, service: Arc<T>) {
        Self::set(service);
        LOCATOR
            .services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(name);
    }

    /// 등록된 리포지토리를 차례로 초기화하고 요약을 출력합니다.
    pub async fn initialize_all() -> AppResult<()> {
        print_boxed_title("🔄 INITIALIZING SERVICE REGISTRY");

        let repositories: Vec<Arc<dyn Repository>> = LOCATOR
            .repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        print_step_start(1, "Initializing repositories");
        for repository in &repositories {
            print_sub_task(repository.name(), repository.collection_name());
            repository.init().await?;
        }
        print_step_complete(1, "Repositories initialized", repositories.len());

        let services = LOCATOR.services.read().unwrap_or_else(PoisonError::into_inner).clone();
        print_step_start(2, "Registering services");
        for name in &services {
            print_sub_task(name, "✓ Ready");
        }
        print_step_complete(2, "Services registered", services.len());

        print_final_summary(repositories.len(), services.len());
        Ok(())
    }

    fn extract_clean_type_name(type_name: &str) -> &str {
        let base = type_name.split('<').next().unwrap_or(type_name);
        match base.rfind("::") {
            Some(pos) => &type_name[pos + 2..],
            None => type_name,
        }
    }
}

static LOCATOR: Lazy<ServiceLocator> = Lazy::new(ServiceLocator::new);

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(u8);

    struct Missing;

    #[test]
    fn test_set_then_get_returns_same_instance() {
        ServiceLocator::set(Arc::new(Marker(7)));

        let first = ServiceLocator::get::<Marker>();
        let second = ServiceLocator::get::<Marker>();

        assert_eq!(first.0, 7);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_try_get_unregistered_is_none() {
        assert!(ServiceLocator::try_get::<Missing>().is_none());
    }

    #[test]
    fn test_clean_type_name() {
        assert_eq!(
            ServiceLocator::extract_clean_type_name("crate::services::tours::TourService"),
            "TourService"
        );
        assert_eq!(
            ServiceLocator::extract_clean_type_name(
                "crate::repositories::crud::CrudRepository<crate::domain::entities::Tour>"
            ),
            "CrudRepository<crate::domain::entities::Tour>"
        );
    }
}
