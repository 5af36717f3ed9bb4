//! # 제네릭 CRUD 리포지토리
//!
//! 하나의 구현으로 모든 [`Entity`] 컬렉션의 조회/생성/수정/삭제를 처리합니다.
//! 엔티티가 선언한 기본 제외 조건, 숨김 필드, population 규칙, 인덱스를 그대로 따릅니다.
//!
//! ## 캐싱
//!
//! - **키 패턴**: `{label}:{id}` (예: `user:5c8a1d5b0190b214360dc057`)
//! - **TTL**: 600초
//! - 수정/삭제 시 해당 키를 무효화합니다. 캐시 장애는 조회를 막지 않습니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! let tours = CrudRepository::<Tour>::instance();
//! let features = QueryFeatures::parse(&pairs, Tour::multi_value_fields())?;
//! let page = tours.find_all(&features, None).await?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Collection;
use serde_json::Value;

use crate::caching::redis::RedisClient;
use crate::core::errors::{AppError, AppResult};
use crate::core::registry::{Repository, ServiceLocator};
use crate::db::Database;
use crate::domain::entities::entity::{Entity, Population};
use crate::domain::models::query::{combine_filters, QueryFeatures};
use crate::utils::string_utils::parse_object_id;

/// 캐시 TTL (초)
const CACHE_TTL_SECS: u64 = 600;

pub struct CrudRepository<E: Entity> {
    db: Arc<Database>,
    redis: Arc<RedisClient>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> CrudRepository<E> {
    pub fn new(db: Arc<Database>, redis: Arc<RedisClient>) -> Self {
        Self {
            db,
            redis,
            _entity: PhantomData,
        }
    }

    pub fn instance() -> Arc<Self> {
        ServiceLocator::get::<Self>()
    }

    /// 타입이 지정된 컬렉션 핸들
    pub fn collection(&self) -> Collection<E> {
        self.db.get_database().collection::<E>(E::COLLECTION)
    }

    /// 원본 문서 컬렉션 핸들 (집계, 부분 수정용)
    pub fn documents(&self) -> Collection<Document> {
        self.db.documents(E::COLLECTION)
    }

    pub fn not_found() -> AppError {
        AppError::NotFound(format!("No {} found with that ID", E::LABEL))
    }

    /// 엔티티 기본 제외 조건(소프트 삭제, 비밀 투어)을 덧붙인 단건 조회 조건
    pub fn scoped_filter(filter: Document) -> Document {
        combine_filters(vec![E::default_filter(), filter])
    }

    fn cache_key(id: &ObjectId) -> String {
        format!("{}:{}", E::LABEL, id.to_hex())
    }

    /// 필터, 정렬, 페이지, 필드 선택이 적용된 목록 조회
    ///
    /// `scope`는 상위 리소스 조건입니다 (예: 특정 투어의 리뷰).
    /// 요청한 페이지가 결과 범위를 벗어나면 [`AppError::InvalidPage`]를 반환합니다.
    pub async fn find_all(&self, features: &QueryFeatures, scope: Option<Document>) -> AppResult<Vec<Value>> {
        let match_filter = features.match_filter(E::default_filter(), scope);

        if features.page_requested {
            let total = self.documents().count_documents(match_filter.clone()).await?;
            features.ensure_page_exists(total)?;
        }

        let pipeline = features.pipeline(match_filter, &E::populations(), E::hidden_fields());
        let documents = self.aggregate(pipeline).await?;

        Ok(documents.into_iter().map(E::present).collect())
    }

    /// ID로 한 건 조회. 엔티티 기본 population 뒤에 `extra`를 덧붙입니다.
    pub async fn find_one(&self, id: &str, extra: Vec<Population>) -> AppResult<Value> {
        let object_id = parse_object_id(id)?;
        self.find_one_by(doc! { "_id": object_id }, extra)
            .await?
            .ok_or_else(Self::not_found)
    }

    /// 임의 조건으로 한 건 조회 (기본 제외 조건 포함)
    pub async fn find_one_by(&self, filter: Document, extra: Vec<Population>) -> AppResult<Option<Value>> {
        let match_filter = Self::scoped_filter(filter);
        self.fetch_presented(match_filter, extra).await
    }

    async fn fetch_presented(&self, match_filter: Document, extra: Vec<Population>) -> AppResult<Option<Value>> {
        let mut pipeline = vec![doc! { "$match": match_filter }, doc! { "$limit": 1 }];
        for population in E::populations().iter().chain(extra.iter()) {
            pipeline.extend(population.stages());
        }
        pipeline.push(doc! { "$project": E::exclusion_projection() });

        let mut documents = self.aggregate(pipeline).await?;
        Ok(documents.pop().map(E::present))
    }

    /// 타입이 지정된 엔티티 조회 (기본 제외 조건 포함)
    pub async fn find_entity(&self, id: &ObjectId) -> AppResult<Option<E>> {
        self.find_entity_by(doc! { "_id": *id }).await
    }

    pub async fn find_entity_by(&self, filter: Document) -> AppResult<Option<E>> {
        let filter = Self::scoped_filter(filter);
        Ok(self.collection().find_one(filter).await?)
    }

    /// 캐시 우선 엔티티 조회
    pub async fn find_cached(&self, id: &ObjectId) -> AppResult<Option<E>> {
        let cache_key = Self::cache_key(id);

        if let Ok(Some(cached)) = self.redis.get::<E>(&cache_key).await {
            return Ok(Some(cached));
        }

        let entity = self.find_entity(id).await?;

        if let Some(ref entity) = entity {
            let _ = self.redis.set_with_expiry(&cache_key, entity, CACHE_TTL_SECS).await;
        }

        Ok(entity)
    }

    /// 저장 전 훅과 검증을 거쳐 새 문서를 저장하고, `_id`가 채워진 문서를 반환합니다.
    pub async fn create(&self, mut entity: E) -> AppResult<Document> {
        entity.before_save();
        entity.validate()?;

        let mut document = bson::to_document(&entity)?;
        let result = self.documents().insert_one(&document).await?;
        document.insert("_id", result.inserted_id);

        log::debug!("{} 생성: {:?}", E::LABEL, document.get("_id"));
        Ok(document)
    }

    /// 부분 수정
    ///
    /// 기존 엔티티에 `patch`를 덮어쓴 결과로 저장 전 훅과 검증을 다시 실행한 뒤,
    /// 요청된 필드와 파생 필드만 `$set` 합니다. 보호 필드는 무시됩니다.
    pub async fn update(&self, id: &str, patch: Document) -> AppResult<Value> {
        let object_id = parse_object_id(id)?;
        let existing = self.find_entity(&object_id).await?.ok_or_else(Self::not_found)?;

        let set = Self::merge_patch(&existing, patch)?;
        if !set.is_empty() {
            self.documents()
                .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set })
                .with_options(
                    FindOneAndUpdateOptions::builder()
                        .return_document(ReturnDocument::After)
                        .build(),
                )
                .await?
                .ok_or_else(Self::not_found)?;
            self.invalidate_cache(&object_id).await;
        }

        self.fetch_presented(doc! { "_id": object_id }, Vec::new())
            .await?
            .ok_or_else(Self::not_found)
    }

    /// 병합 결과에서 실제로 저장할 `$set` 문서를 계산합니다.
    fn merge_patch(existing: &E, patch: Document) -> AppResult<Document> {
        let patch: Document = patch
            .into_iter()
            .filter(|(key, _)| {
                let protected = E::protected_fields().contains(&key.as_str());
                if protected {
                    log::debug!("보호 필드 수정 무시: {}.{}", E::LABEL, key);
                }
                !protected
            })
            .collect();
        if patch.is_empty() {
            return Ok(Document::new());
        }

        let mut merged = bson::to_document(existing)?;
        for (key, value) in patch.iter() {
            merged.insert(key.clone(), value.clone());
        }

        let mut updated: E = bson::from_document(merged)?;
        updated.before_save();
        updated.validate()?;

        let stored = bson::to_document(&updated)?;
        let set = patch
            .keys()
            .map(String::as_str)
            .chain(E::derived_fields().iter().copied())
            .filter_map(|key| stored.get(key).map(|value| (key.to_string(), value.clone())))
            .collect();
        Ok(set)
    }

    /// 검증 없이 필드를 직접 `$set` 합니다. 내부 상태(비밀번호, 평점 집계 등) 갱신용입니다.
    pub async fn set_fields(&self, id: &ObjectId, set: Document) -> AppResult<()> {
        self.documents()
            .update_one(doc! { "_id": *id }, doc! { "$set": set })
            .await?;
        self.invalidate_cache(id).await;
        Ok(())
    }

    /// 삭제된 문서를 반환합니다.
    pub async fn delete(&self, id: &str) -> AppResult<Document> {
        let object_id = parse_object_id(id)?;
        let filter = Self::scoped_filter(doc! { "_id": object_id });

        let deleted = self
            .documents()
            .find_one_and_delete(filter)
            .await?
            .ok_or_else(Self::not_found)?;

        self.invalidate_cache(&object_id).await;
        Ok(deleted)
    }

    pub async fn aggregate(&self, pipeline: Vec<Document>) -> AppResult<Vec<Document>> {
        let cursor = self.documents().aggregate(pipeline).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn invalidate_cache(&self, id: &ObjectId) {
        if let Err(e) = self.redis.del(&Self::cache_key(id)).await {
            log::warn!("캐시 무효화 실패 ({}): {}", Self::cache_key(id), e);
        }
    }
}

#[async_trait]
impl<E: Entity> Repository for CrudRepository<E> {
    fn name(&self) -> &str {
        E::LABEL
    }

    fn collection_name(&self) -> &str {
        E::COLLECTION
    }

    async fn init(&self) -> AppResult<()> {
        let indexes = E::indexes();
        if indexes.is_empty() {
            return Ok(());
        }

        let count = indexes.len();
        self.collection().create_indexes(indexes).await?;
        log::info!("📑 {} 인덱스 {}개 준비 완료", E::COLLECTION, count);
        Ok(())
    }
}
