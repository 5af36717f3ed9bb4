//! BSON 문서를 API 응답용 평범한 JSON으로 변환합니다.
//!
//! 확장 JSON(`{"$oid": ...}`, `{"$date": ...}`) 대신 ObjectId는 hex 문자열,
//! 날짜는 RFC 3339 문자열로 내보냅니다.

use mongodb::bson::{Bson, Document};
use serde_json::{Map, Number, Value};

pub fn document_to_json(document: Document) -> Value {
    let fields: Map<String, Value> = document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Value::Object(fields)
}

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(date) => date
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Document(document) => document_to_json(document),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Double(number) => Number::from_f64(number).map(Value::Number).unwrap_or(Value::Null),
        Bson::Int32(number) => Value::from(number),
        Bson::Int64(number) => Value::from(number),
        Bson::String(text) => Value::String(text),
        Bson::Boolean(flag) => Value::Bool(flag),
        Bson::Null | Bson::Undefined => Value::Null,
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId, DateTime};
    use serde_json::json;

    #[test]
    fn test_object_ids_and_dates_become_strings() {
        let id = ObjectId::parse_str("5c88fa8cf4afda39709c2955").unwrap();
        let created = DateTime::from_millis(0);

        let json = document_to_json(doc! {
            "_id": id,
            "createdAt": created,
            "guides": [id],
            "price": 397.0,
            "ratingsQuantity": 9,
        });

        assert!(json["createdAt"].as_str().unwrap().starts_with("1970-01-01T00:00:00"));
        assert_eq!(json["_id"], json!("5c88fa8cf4afda39709c2955"));
        assert_eq!(json["guides"], json!(["5c88fa8cf4afda39709c2955"]));
        assert_eq!(json["price"], json!(397.0));
        assert_eq!(json["ratingsQuantity"], json!(9));
    }

    #[test]
    fn test_nested_documents_are_converted() {
        let json = document_to_json(doc! {
            "startLocation": { "type": "Point", "coordinates": [-80.185942, 25.774772] },
            "secretTour": false,
            "description": null,
        });

        assert_eq!(json["startLocation"]["type"], "Point");
        assert_eq!(json["startLocation"]["coordinates"][1], 25.774772);
        assert_eq!(json["secretTour"], false);
        assert!(json["description"].is_null());
    }
}
