//! 제네릭 CRUD 팩토리가 다루는 엔티티의 공통 계약
//!
//! 각 엔티티는 컬렉션 이름, 기본 제외 조건(소프트 삭제, 비밀 투어), 숨김 필드,
//! 조회 시 채워 넣을 참조(population), 인덱스, 저장 전 훅과 검증을 스스로 선언합니다.
//! 리포지토리와 쿼리 조합기는 이 선언만 보고 쿼리를 만듭니다.

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::IndexModel;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::errors::AppResult;
use crate::utils::bson_json::document_to_json;

pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// MongoDB 컬렉션 이름
    const COLLECTION: &'static str;

    /// 에러 메시지에 쓰이는 단수형 이름 (`No tour found with that ID`)
    const LABEL: &'static str;

    fn id(&self) -> Option<ObjectId>;

    /// 저장 직전 파생 필드 계산 (slug, 반올림 등)
    fn before_save(&mut self) {}

    /// 저장 직전 문서 단위 검증
    fn validate(&self) -> AppResult<()> {
        Ok(())
    }

    /// 모든 조회 쿼리에 `$and`로 덧붙는 기본 제외 조건
    fn default_filter() -> Document {
        Document::new()
    }

    /// 응답과 프로젝션에서 절대 노출되지 않는 필드
    fn hidden_fields() -> &'static [&'static str] {
        &["__v"]
    }

    /// 부분 수정 시 `before_save` 결과를 함께 저장해야 하는 파생 필드
    fn derived_fields() -> &'static [&'static str] {
        &[]
    }

    /// 제네릭 부분 수정으로 바꿀 수 없는 필드
    fn protected_fields() -> &'static [&'static str] {
        &["_id"]
    }

    /// 같은 쿼리 키가 반복될 때 `$in`으로 묶는 필드
    fn multi_value_fields() -> &'static [&'static str] {
        &[]
    }

    /// 목록/단건 조회에서 항상 채워 넣는 참조
    fn populations() -> Vec<Population> {
        Vec::new()
    }

    fn indexes() -> Vec<IndexModel> {
        Vec::new()
    }

    /// 가상 필드 추가 등 응답 직전 후처리
    fn decorate(_fields: &mut Map<String, Value>) {}

    /// 저장된 문서를 API 응답용 JSON으로 변환합니다.
    fn present(document: Document) -> Value {
        let mut json = document_to_json(document);
        if let Value::Object(fields) = &mut json {
            for hidden in Self::hidden_fields() {
                fields.remove(*hidden);
            }
            if let Some(id) = fields.get("_id").cloned() {
                fields.insert("id".to_string(), id);
            }
            Self::decorate(fields);
        }
        json
    }

    /// 숨김 필드를 제외하는 `$project` 문서
    fn exclusion_projection() -> Document {
        exclusion(Self::hidden_fields())
    }
}

/// 필드 목록을 `{field: 0}` 형태의 제외 프로젝션으로 만듭니다.
pub fn exclusion(fields: &[&str]) -> Document {
    fields
        .iter()
        .map(|field| (field.to_string(), Bson::Int32(0)))
        .collect()
}

/// 참조 필드를 `$lookup`으로 채워 넣는 규칙
#[derive(Debug, Clone)]
pub struct Population {
    /// 참조 대상 컬렉션
    pub from: &'static str,
    /// 현재 문서의 참조 필드
    pub local_field: &'static str,
    /// 대상 문서에서 비교할 필드
    pub foreign_field: &'static str,
    /// 결과를 담을 필드
    pub as_field: &'static str,
    /// 대상 문서 프로젝션
    pub select: Document,
    /// 대상 문서 기본 제외 조건
    pub filter: Document,
    /// 단일 참조면 배열을 풀어 객체 하나로 둡니다
    pub single: bool,
    /// 대상 문서 안에서 다시 채워 넣을 참조
    pub nested: Vec<Population>,
}

impl Population {
    /// `field`를 `from` 컬렉션의 `_id`로 채우는 기본 규칙
    pub fn reference(field: &'static str, from: &'static str, select: Document) -> Self {
        Self {
            from,
            local_field: field,
            foreign_field: "_id",
            as_field: field,
            select,
            filter: Document::new(),
            single: false,
            nested: Vec::new(),
        }
    }

    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn filtered(mut self, filter: Document) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_nested(mut self, nested: Vec<Population>) -> Self {
        self.nested = nested;
        self
    }

    /// 집계 파이프라인 단계로 변환합니다.
    pub fn stages(&self) -> Vec<Document> {
        let mut inner: Vec<Document> = Vec::new();
        if !self.filter.is_empty() {
            inner.push(doc! { "$match": self.filter.clone() });
        }
        for nested in &self.nested {
            inner.extend(nested.stages());
        }
        if !self.select.is_empty() {
            inner.push(doc! { "$project": self.select.clone() });
        }

        let mut stages = vec![doc! {
            "$lookup": {
                "from": self.from,
                "localField": self.local_field,
                "foreignField": self.foreign_field,
                "pipeline": inner,
                "as": self.as_field,
            }
        }];

        if self.single {
            stages.push(doc! {
                "$unwind": {
                    "path": format!("${}", self.as_field),
                    "preserveNullAndEmptyArrays": true,
                }
            });
        }
        stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_projection() {
        let projection = exclusion(&["password", "__v"]);
        assert_eq!(projection, doc! { "password": 0, "__v": 0 });
    }

    #[test]
    fn test_single_population_unwinds() {
        let population = Population::reference("user", "users", doc! { "name": 1, "photo": 1 })
            .single()
            .filtered(doc! { "active": { "$ne": false } });

        let stages = population.stages();
        assert_eq!(stages.len(), 2);

        let lookup = stages[0].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), "users");
        assert_eq!(lookup.get_str("foreignField").unwrap(), "_id");
        let inner = lookup.get_array("pipeline").unwrap();
        assert_eq!(inner.len(), 2);

        let unwind = stages[1].get_document("$unwind").unwrap();
        assert_eq!(unwind.get_str("path").unwrap(), "$user");
    }

    #[test]
    fn test_nested_population_is_inlined() {
        let author = Population::reference("user", "users", doc! { "name": 1 }).single();
        let reviews = Population {
            from: "reviews",
            local_field: "_id",
            foreign_field: "tour",
            as_field: "reviews",
            select: doc! { "__v": 0 },
            filter: Document::new(),
            single: false,
            nested: vec![author],
        };

        let stages = reviews.stages();
        assert_eq!(stages.len(), 1);
        let inner = stages[0].get_document("$lookup").unwrap().get_array("pipeline").unwrap();
        // $lookup + $unwind (작성자) + $project
        assert_eq!(inner.len(), 3);
    }
}
