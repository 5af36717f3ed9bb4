//! 쿼리 문자열 → MongoDB 집계 파이프라인 조합기
//!
//! `?duration[gte]=5&difficulty=easy&sort=-price,ratingsAverage&fields=name,price&page=2&limit=10`
//! 같은 요청을 필터, 정렬, 프로젝션, 페이지 단계로 나눠 조립합니다.
//!
//! - `page`, `sort`, `limit`, `fields` 는 필터에서 제외됩니다.
//! - `field[gt|gte|lt|lte]=v` 는 `{field: {$op: v}}` 로 바뀝니다.
//! - 그 밖의 연산자나 `$` 로 시작하는 키는 거절합니다.
//! - 같은 키가 반복되면 마지막 값이 이깁니다. 엔티티가 허용한 필드만 `$in` 으로 묶습니다.
//! - `fields=name,price` 는 포함, `fields=-summary,-description` 은 제외입니다. 둘을 섞으면 400 입니다.

use std::collections::BTreeMap;

use mongodb::bson::{doc, Bson, Document};

use crate::core::errors::{AppError, AppResult};
use crate::domain::entities::entity::{exclusion, Population};

pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];
pub const COMPARISON_OPERATORS: [&str; 4] = ["gt", "gte", "lt", "lte"];
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 100;
pub const MAX_LIMIT: u64 = 100;
pub const DEFAULT_SORT: &str = "-createdAt";

/// `fields` 파라미터가 고른 필드
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSelection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryFeatures {
    pub filter: Document,
    pub sort: Document,
    pub fields: Option<FieldSelection>,
    pub page: u64,
    pub limit: u64,
    /// 클라이언트가 `page`를 명시했는지 여부
    pub page_requested: bool,
}

impl Default for QueryFeatures {
    fn default() -> Self {
        Self {
            filter: Document::new(),
            sort: parse_sort(DEFAULT_SORT).unwrap_or_default(),
            fields: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            page_requested: false,
        }
    }
}

impl QueryFeatures {
    /// 쿼리 쌍 목록을 해석합니다. `multi_value_fields`에 있는 필드만 반복 값을 `$in`으로 묶습니다.
    pub fn parse(pairs: &[(String, String)], multi_value_fields: &[&str]) -> AppResult<Self> {
        let mut features = Self::default();
        let mut equals: BTreeMap<String, Vec<Bson>> = BTreeMap::new();
        let mut comparisons: BTreeMap<String, Document> = BTreeMap::new();

        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    features.page_requested = true;
                    features.page = parse_positive(value).unwrap_or(DEFAULT_PAGE);
                }
                "limit" => {
                    features.limit = parse_positive(value).unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
                }
                "sort" => features.sort = parse_sort(value)?,
                "fields" => features.fields = parse_field_selection(value)?,
                _ => {
                    let (field, operator) = split_key(key)?;
                    let value = coerce(value);
                    match operator {
                        Some(op) => {
                            comparisons.entry(field).or_default().insert(format!("${}", op), value);
                        }
                        None => equals.entry(field).or_default().push(value),
                    }
                }
            }
        }

        for (field, mut values) in equals {
            let condition = if values.len() > 1 && multi_value_fields.contains(&field.as_str()) {
                doc! { "$in": values }.into()
            } else {
                values.pop().unwrap_or(Bson::Null)
            };
            features.filter.insert(field, condition);
        }
        for (field, operators) in comparisons {
            features.filter.insert(field, operators);
        }

        Ok(features)
    }

    pub fn skip(&self) -> u64 {
        (self.page.saturating_sub(1)).saturating_mul(self.limit)
    }

    /// 첫 페이지는 항상 유효합니다. 그 뒤 페이지는 시작 위치가 전체 개수 안에 있어야 합니다.
    pub fn ensure_page_exists(&self, total: u64) -> AppResult<()> {
        if self.page_requested && self.page > 1 && self.skip() >= total {
            return Err(AppError::InvalidPage);
        }
        Ok(())
    }

    /// 기본 제외 조건, 상위 리소스 범위, 요청 필터를 하나의 `$match` 조건으로 합칩니다.
    pub fn match_filter(&self, default_filter: Document, scope: Option<Document>) -> Document {
        combine_filters(vec![default_filter, scope.unwrap_or_default(), self.filter.clone()])
    }

    /// 요청된 필드만 포함하거나, 요청된 필드를 제외합니다. 숨김 필드는 어느 쪽이든 빠집니다.
    pub fn projection(&self, hidden: &[&str]) -> Document {
        match &self.fields {
            Some(FieldSelection::Include(fields)) => {
                let included: Document = fields
                    .iter()
                    .filter(|field| !hidden.contains(&field.as_str()))
                    .map(|field| (field.clone(), Bson::Int32(1)))
                    .collect();
                if included.is_empty() {
                    exclusion(hidden)
                } else {
                    included
                }
            }
            Some(FieldSelection::Exclude(fields)) => {
                let mut excluded: Document = fields.iter().map(|field| (field.clone(), Bson::Int32(0))).collect();
                for field in hidden {
                    if !excluded.contains_key(*field) {
                        excluded.insert(*field, 0);
                    }
                }
                excluded
            }
            None => exclusion(hidden),
        }
    }

    /// 목록 조회용 집계 파이프라인
    pub fn pipeline(&self, match_filter: Document, populations: &[Population], hidden: &[&str]) -> Vec<Document> {
        let mut sort = self.sort.clone();
        if !sort.contains_key("_id") {
            sort.insert("_id", 1);
        }

        let mut pipeline = vec![
            doc! { "$match": match_filter },
            doc! { "$sort": sort },
            doc! { "$skip": self.skip() as i64 },
            doc! { "$limit": self.limit as i64 },
        ];
        for population in populations {
            pipeline.extend(population.stages());
        }
        pipeline.push(doc! { "$project": self.projection(hidden) });
        pipeline
    }

    /// 별칭 라우트(`top-5-cheap`)가 미리 채운 값을 덮어씁니다.
    pub fn with_alias(pairs: &[(String, String)], alias: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = pairs
            .iter()
            .filter(|(key, _)| !alias.iter().any(|(alias_key, _)| alias_key == key))
            .cloned()
            .collect();
        merged.extend(alias.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        merged
    }
}

/// 비어 있지 않은 조건이 둘 이상이면 `$and`로 묶습니다.
pub fn combine_filters(parts: Vec<Document>) -> Document {
    let mut parts: Vec<Document> = parts.into_iter().filter(|part| !part.is_empty()).collect();
    if parts.len() > 1 {
        doc! { "$and": parts }
    } else {
        parts.pop().unwrap_or_default()
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !name.ends_with('.')
        && !name.contains("..")
}

/// `price[gte]` → (`price`, Some(`gte`))
fn split_key(key: &str) -> AppResult<(String, Option<&str>)> {
    let invalid = || AppError::ValidationError(format!("Invalid query parameter: {}", key));

    let (field, operator) = match key.find('[') {
        Some(open) => {
            let operator = key[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
            if !COMPARISON_OPERATORS.contains(&operator) {
                return Err(invalid());
            }
            (&key[..open], Some(operator))
        }
        None => (key, None),
    };

    if !is_field_name(field) {
        return Err(invalid());
    }
    Ok((field.to_string(), operator))
}

fn parse_field_list(value: &str) -> AppResult<Vec<String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            let name = field.trim_start_matches('-');
            if is_field_name(name) {
                Ok(field.to_string())
            } else {
                Err(AppError::ValidationError(format!("Invalid field name: {}", field)))
            }
        })
        .collect()
}

/// 모든 항목이 `-` 로 시작하면 제외, 하나도 없으면 포함입니다.
fn parse_field_selection(value: &str) -> AppResult<Option<FieldSelection>> {
    let fields = parse_field_list(value)?;
    if fields.is_empty() {
        return Ok(None);
    }

    let excluded: Vec<String> = fields
        .iter()
        .filter_map(|field| field.strip_prefix('-').map(str::to_string))
        .collect();

    if excluded.is_empty() {
        Ok(Some(FieldSelection::Include(fields)))
    } else if excluded.len() == fields.len() {
        Ok(Some(FieldSelection::Exclude(excluded)))
    } else {
        Err(AppError::ValidationError(format!(
            "Cannot mix included and excluded fields: {}",
            value
        )))
    }
}

/// `-price,ratingsAverage` → `{price: -1, ratingsAverage: 1}`
fn parse_sort(value: &str) -> AppResult<Document> {
    let mut sort = Document::new();
    for field in parse_field_list(value)? {
        match field.strip_prefix('-') {
            Some(name) => sort.insert(name, -1),
            None => sort.insert(field, 1),
        };
    }
    Ok(sort)
}

/// 숫자와 불리언 리터럴은 해당 타입으로, 나머지는 문자열로 둡니다.
fn coerce(value: &str) -> Bson {
    let trimmed = value.trim();
    match trimmed {
        "true" => return Bson::Boolean(true),
        "false" => return Bson::Boolean(false),
        _ => {}
    }
    if let Ok(integer) = trimmed.parse::<i64>() {
        return Bson::Int64(integer);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if float.is_finite() {
            return Bson::Double(float);
        }
    }
    Bson::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOUR_MULTI: &[&str] = &["duration", "difficulty", "price"];

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let features = QueryFeatures::parse(&[], TOUR_MULTI).unwrap();

        assert_eq!(features.filter, Document::new());
        assert_eq!(features.sort, doc! { "createdAt": -1 });
        assert_eq!(features.page, 1);
        assert_eq!(features.limit, 100);
        assert_eq!(features.skip(), 0);
        assert_eq!(features.projection(&["__v"]), doc! { "__v": 0 });
    }

    #[test]
    fn test_reserved_keys_are_not_filters() {
        let features = QueryFeatures::parse(
            &pairs(&[("difficulty", "easy"), ("page", "2"), ("sort", "price"), ("limit", "5"), ("fields", "name")]),
            TOUR_MULTI,
        )
        .unwrap();

        assert_eq!(features.filter, doc! { "difficulty": "easy" });
        assert_eq!(features.skip(), 5);
    }

    #[test]
    fn test_comparison_operators_are_rewritten() {
        let features = QueryFeatures::parse(
            &pairs(&[("duration[gte]", "5"), ("duration[lt]", "10"), ("price[lte]", "997.5")]),
            TOUR_MULTI,
        )
        .unwrap();

        assert_eq!(
            features.filter,
            doc! {
                "duration": { "$gte": 5_i64, "$lt": 10_i64 },
                "price": { "$lte": 997.5 },
            }
        );
    }

    #[test]
    fn test_unknown_operators_and_dollar_keys_are_rejected() {
        assert!(QueryFeatures::parse(&pairs(&[("price[ne]", "1")]), TOUR_MULTI).is_err());
        assert!(QueryFeatures::parse(&pairs(&[("$where", "1")]), TOUR_MULTI).is_err());
        assert!(QueryFeatures::parse(&pairs(&[("price[gte", "1")]), TOUR_MULTI).is_err());
        assert!(QueryFeatures::parse(&pairs(&[("sort", "$natural")]), TOUR_MULTI).is_err());
    }

    #[test]
    fn test_parameter_pollution() {
        let features = QueryFeatures::parse(
            &pairs(&[("duration", "5"), ("duration", "9"), ("name", "a"), ("name", "b"), ("sort", "duration"), ("sort", "price")]),
            TOUR_MULTI,
        )
        .unwrap();

        assert_eq!(features.filter.get_document("duration").unwrap(), &doc! { "$in": [5_i64, 9_i64] });
        assert_eq!(features.filter.get_str("name").unwrap(), "b");
        assert_eq!(features.sort, doc! { "price": 1 });
    }

    #[test]
    fn test_sort_limit_and_first_page() {
        let features = QueryFeatures::parse(
            &pairs(&[("sort", "-price"), ("limit", "2"), ("page", "1")]),
            TOUR_MULTI,
        )
        .unwrap();

        let pipeline = features.pipeline(doc! {}, &[], &["__v"]);
        assert_eq!(pipeline[1], doc! { "$sort": { "price": -1, "_id": 1 } });
        assert_eq!(pipeline[2], doc! { "$skip": 0_i64 });
        assert_eq!(pipeline[3], doc! { "$limit": 2_i64 });
        assert!(features.ensure_page_exists(0).is_ok());
    }

    #[test]
    fn test_page_beyond_count_is_invalid() {
        let features = QueryFeatures::parse(&pairs(&[("limit", "2"), ("page", "3")]), TOUR_MULTI).unwrap();

        assert_eq!(features.skip(), 4);
        assert!(features.ensure_page_exists(5).is_ok());
        assert!(matches!(features.ensure_page_exists(4), Err(AppError::InvalidPage)));
    }

    #[test]
    fn test_limit_is_bounded() {
        let features = QueryFeatures::parse(&pairs(&[("limit", "100000"), ("page", "zero")]), TOUR_MULTI).unwrap();
        assert_eq!(features.limit, MAX_LIMIT);
        assert_eq!(features.page, 1);
    }

    #[test]
    fn test_projection_never_includes_hidden_fields() {
        let features = QueryFeatures::parse(&pairs(&[("fields", "name,password,email")]), &[]).unwrap();
        assert_eq!(features.projection(&["password", "__v"]), doc! { "name": 1, "email": 1 });

        let only_hidden = QueryFeatures::parse(&pairs(&[("fields", "password")]), &[]).unwrap();
        assert_eq!(only_hidden.projection(&["password"]), doc! { "password": 0 });
    }

    #[test]
    fn test_minus_prefixed_fields_are_excluded() {
        let features = QueryFeatures::parse(&pairs(&[("fields", "-description,-summary")]), &[]).unwrap();

        assert_eq!(
            features.fields,
            Some(FieldSelection::Exclude(vec!["description".to_string(), "summary".to_string()]))
        );
        assert_eq!(
            features.projection(&["__v"]),
            doc! { "description": 0, "summary": 0, "__v": 0 }
        );

        let hidden_twice = QueryFeatures::parse(&pairs(&[("fields", "-password")]), &[]).unwrap();
        assert_eq!(hidden_twice.projection(&["password", "__v"]), doc! { "password": 0, "__v": 0 });
    }

    #[test]
    fn test_mixed_field_selection_is_rejected() {
        let result = QueryFeatures::parse(&pairs(&[("fields", "name,-summary")]), &[]);
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_match_filter_keeps_default_exclusion() {
        let features = QueryFeatures::parse(&pairs(&[("secretTour", "true")]), &[]).unwrap();
        let combined = features.match_filter(doc! { "secretTour": { "$ne": true } }, None);

        assert_eq!(
            combined,
            doc! { "$and": [ { "secretTour": { "$ne": true } }, { "secretTour": true } ] }
        );
        assert_eq!(QueryFeatures::default().match_filter(doc! { "a": 1 }, None), doc! { "a": 1 });
    }

    #[test]
    fn test_alias_overrides_client_values() {
        let merged = QueryFeatures::with_alias(
            &pairs(&[("limit", "50"), ("difficulty", "easy")]),
            &[("limit", "5"), ("sort", "-ratingsAverage,price")],
        );
        let features = QueryFeatures::parse(&merged, TOUR_MULTI).unwrap();

        assert_eq!(features.limit, 5);
        assert_eq!(features.sort, doc! { "ratingsAverage": -1, "price": 1 });
        assert_eq!(features.filter, doc! { "difficulty": "easy" });
    }
}
