//! A single record retrieved from the Gab API.
//!
//! Gab returns posts ("gabs"), comments, and accounts as JSON objects.
//! garc does not model their full schema; a [`Record`] is simply the
//! object as it came over the wire, with accessors for the handful of
//! fields the harvester itself reads.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A post, comment, account, or other object returned by the API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Converts an arbitrary JSON value into a record.
    ///
    /// Returns [`Error::UnexpectedFieldType`] if `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(Error::UnexpectedFieldType {
                field: String::from("record"),
                expected: "object",
            }),
        }
    }

    /// Looks up a field, failing if it is absent.
    pub fn field(&self, name: &str) -> Result<&Value> {
        self.0
            .get(name)
            .ok_or_else(|| Error::MissingField(name.to_string()))
    }

    /// Looks up a field that must hold a string.
    pub fn str_field(&self, name: &str) -> Result<&str> {
        self.field(name)?
            .as_str()
            .ok_or_else(|| Error::UnexpectedFieldType {
                field: name.to_string(),
                expected: "string",
            })
    }

    /// The record's identifier, rendered for logging.
    ///
    /// Gab ids are usually strings, but numeric ids are accepted too.
    pub fn id(&self) -> Result<String> {
        match self.field("id")? {
            Value::String(id) => Ok(id.clone()),
            other => Ok(other.to_string()),
        }
    }

    /// The record's `created_at` timestamp, if present and a string.
    pub fn created_at(&self) -> Option<&str> {
        self.0.get("created_at").and_then(Value::as_str)
    }

    /// True if the field is present and not `null`.
    pub fn has(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|v| !v.is_null())
    }

    /// Consumes the record, returning the underlying JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn it_returns_string_ids() {
        let r = record(json!({"id": "10987"}));
        assert_eq!(r.id().unwrap(), "10987");
    }

    #[test]
    fn it_returns_numeric_ids() {
        let r = record(json!({"id": 42}));
        assert_eq!(r.id().unwrap(), "42");
    }

    #[test]
    fn it_fails_when_the_id_is_missing() {
        let r = record(json!({"content": "hi"}));
        assert!(matches!(r.id(), Err(Error::MissingField(f)) if f == "id"));
    }

    #[test]
    fn it_fails_when_a_string_field_is_not_a_string() {
        let r = record(json!({"id": "1", "content": null}));
        assert!(matches!(
            r.str_field("content"),
            Err(Error::UnexpectedFieldType { expected: "string", .. })
        ));
    }

    #[test]
    fn it_returns_its_creation_time() {
        let r = record(json!({"id": "1", "created_at": "2020-01-01T00:00:00.000Z"}));
        assert_eq!(r.created_at(), Some("2020-01-01T00:00:00.000Z"));
    }

    #[test]
    fn it_treats_null_fields_as_absent() {
        let r = record(json!({"id": "1", "in_reply_to_id": null}));
        assert!(!r.has("in_reply_to_id"));
        assert!(r.has("id"));
    }

    #[test]
    fn it_rejects_non_objects() {
        assert!(Record::from_value(json!(["a", "b"])).is_err());
    }

    #[test]
    fn it_serializes_transparently() {
        let value = json!({"id": "1", "content": "<p>x</p>", "nested": {"a": [1, 2]}});
        let r = record(value.clone());
        assert_eq!(serde_json::to_value(&r).unwrap(), value);
    }
}
