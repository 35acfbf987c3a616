//! Apache Avro binary datum encoding (no container header) via `apache-avro`.

use super::{Codec, CodecError};
use crate::fixture::Fixture;
use apache_avro::types::Value;
use apache_avro::Schema;
use chrono::DateTime;

const NAME: &str = "avro";

const SCHEMA: &str = r#"{
    "type": "record",
    "name": "User",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "name", "type": "string"},
        {"name": "is_active", "type": "boolean"},
        {"name": "created_at", "type": {"type": "long", "logicalType": "timestamp-millis"}}
    ]
}"#;

pub struct AvroCodec {
    schema: Result<Schema, String>,
}

impl AvroCodec {
    pub fn new() -> Self {
        Self {
            schema: Schema::parse_str(SCHEMA).map_err(|e| e.to_string()),
        }
    }

    fn schema(&self) -> Result<&Schema, String> {
        self.schema.as_ref().map_err(|e| format!("invalid schema: {e}"))
    }
}

impl Default for AvroCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn to_record(f: &Fixture) -> Value {
    Value::Record(vec![
        ("id".to_string(), Value::Long(f.id())),
        ("name".to_string(), Value::String(f.name().to_string())),
        ("is_active".to_string(), Value::Boolean(f.is_active())),
        (
            "created_at".to_string(),
            Value::TimestampMillis(f.created_at().timestamp_millis()),
        ),
    ])
}

fn from_record(value: Value) -> Result<Fixture, String> {
    let fields = match value {
        Value::Record(fields) => fields,
        other => return Err(format!("expected record, got {other:?}")),
    };

    let mut id = None;
    let mut name = None;
    let mut is_active = None;
    let mut created_at = None;
    for (field, v) in fields {
        match (field.as_str(), v) {
            ("id", Value::Long(x)) => id = Some(x),
            ("name", Value::String(x)) => name = Some(x),
            ("is_active", Value::Boolean(x)) => is_active = Some(x),
            ("created_at", Value::TimestampMillis(ms)) => {
                created_at = Some(
                    DateTime::from_timestamp_millis(ms).ok_or("created_at out of range")?,
                );
            }
            (other, v) => return Err(format!("unexpected field {other}: {v:?}")),
        }
    }

    Ok(Fixture::new(
        id.ok_or("missing field id")?,
        name.ok_or("missing field name")?,
        is_active.ok_or("missing field is_active")?,
        created_at.ok_or("missing field created_at")?,
    ))
}

impl Codec for AvroCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        let schema = self.schema().map_err(|e| CodecError::encode(NAME, e))?;
        apache_avro::to_avro_datum(schema, to_record(fixture)).map_err(|e| CodecError::encode(NAME, e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        let schema = self.schema().map_err(|e| CodecError::decode(NAME, e))?;
        let mut reader = bytes;
        let value = apache_avro::from_avro_datum(schema, &mut reader, None)
            .map_err(|e| CodecError::decode(NAME, e))?;
        if !reader.is_empty() {
            return Err(CodecError::decode(
                NAME,
                format!("{} trailing byte(s)", reader.len()),
            ));
        }
        from_record(value).map_err(|e| CodecError::decode(NAME, e))
    }
}
