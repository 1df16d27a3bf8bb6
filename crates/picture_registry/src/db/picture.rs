use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub type Fields = Map<String, Value>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PictureError {
    #[error("picture record is not a JSON object")]
    NotAnObject,
    #[error("picture record has no id")]
    MissingId,
    #[error("picture id {0} is not an integer")]
    InvalidId(String),
}

/// A picture record: the service-managed `id` plus whatever the client sent.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Picture {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Picture {
    /// Builds a record from client fields. A client-supplied `id` is dropped.
    pub fn with_id(id: i64, mut fields: Fields) -> Self {
        fields.remove("id");
        Self { id, fields }
    }

    /// Converts a stored JSON record, coercing its `id` to an integer.
    pub fn from_value(value: Value) -> Result<Self, PictureError> {
        let Value::Object(mut fields) = value else {
            return Err(PictureError::NotAnObject);
        };
        let raw = fields.remove("id").ok_or(PictureError::MissingId)?;
        let id = coerce_id(&raw).ok_or_else(|| PictureError::InvalidId(raw.to_string()))?;
        Ok(Self { id, fields })
    }
}

fn coerce_id(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_id_first_then_fields_in_order() {
        let pic = Picture::from_value(json!({"title": "x", "id": 3, "city": "Oslo"})).unwrap();
        assert_eq!(
            serde_json::to_string(&pic).unwrap(),
            r#"{"id":3,"title":"x","city":"Oslo"}"#
        );
    }

    #[test]
    fn accepts_integer_like_ids() {
        assert_eq!(Picture::from_value(json!({"id": "7"})).unwrap().id, 7);
        assert_eq!(Picture::from_value(json!({"id": " 8 "})).unwrap().id, 8);
        assert_eq!(Picture::from_value(json!({"id": 9.0})).unwrap().id, 9);
    }

    #[test]
    fn rejects_missing_or_bad_ids() {
        assert_eq!(
            Picture::from_value(json!({"title": "x"})),
            Err(PictureError::MissingId)
        );
        assert!(matches!(
            Picture::from_value(json!({"id": "abc"})),
            Err(PictureError::InvalidId(_))
        ));
        assert!(matches!(
            Picture::from_value(json!({"id": 1.5})),
            Err(PictureError::InvalidId(_))
        ));
        assert!(matches!(
            Picture::from_value(json!({"id": null})),
            Err(PictureError::InvalidId(_))
        ));
        assert_eq!(
            Picture::from_value(json!([1, 2])),
            Err(PictureError::NotAnObject)
        );
    }

    #[test]
    fn with_id_overrides_client_id() {
        let fields = json!({"id": 99, "title": "dawn"})
            .as_object()
            .cloned()
            .unwrap();
        let pic = Picture::with_id(4, fields);
        assert_eq!(pic.id, 4);
        assert_eq!(serde_json::to_value(&pic).unwrap(), json!({"id": 4, "title": "dawn"}));
    }
}
