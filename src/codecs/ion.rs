//! Binary Amazon Ion via the `ion-rs` element API.
//!
//! `created_at` is an int of epoch milliseconds. Ion timestamps only cover
//! years 0001 through 9999, narrower than the fixture's range.

use super::{Codec, CodecError};
use crate::fixture::Fixture;
use chrono::DateTime;
use ion_rs::{v1_0, Element, Struct};

const NAME: &str = "ion";

#[derive(Debug, Clone, Copy, Default)]
pub struct IonCodec;

fn to_struct(f: &Fixture) -> Struct {
    Struct::builder()
        .with_field("id", f.id())
        .with_field("name", f.name())
        .with_field("is_active", f.is_active())
        .with_field("created_at", f.created_at().timestamp_millis())
        .build()
}

fn field<'a>(record: &'a Struct, name: &str) -> Result<&'a Element, CodecError> {
    record
        .get(name)
        .ok_or_else(|| CodecError::decode(NAME, format!("missing field {name}")))
}

fn wrong_type(name: &str) -> CodecError {
    CodecError::decode(NAME, format!("wrong type for field {name}"))
}

impl Codec for IonCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        Element::from(to_struct(fixture))
            .encode_as(v1_0::Binary)
            .map_err(|e| CodecError::encode(NAME, e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        let element = Element::read_one(bytes).map_err(|e| CodecError::decode(NAME, e))?;
        let record = element
            .as_struct()
            .ok_or_else(|| CodecError::decode(NAME, "expected a struct"))?;

        let id = field(record, "id")?.as_i64().ok_or_else(|| wrong_type("id"))?;
        let name = field(record, "name")?
            .as_string()
            .ok_or_else(|| wrong_type("name"))?;
        let is_active = field(record, "is_active")?
            .as_bool()
            .ok_or_else(|| wrong_type("is_active"))?;
        let millis = field(record, "created_at")?
            .as_i64()
            .ok_or_else(|| wrong_type("created_at"))?;
        let created_at = DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| CodecError::decode(NAME, "created_at out of range"))?;

        Ok(Fixture::new(id, name, is_active, created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_starts_with_binary_version_marker() {
        let bytes = IonCodec.encode(&Fixture::standard()).unwrap();
        assert_eq!(&bytes[..4], &[0xE0, 0x01, 0x00, 0xEA]);
    }

    #[test]
    fn timestamp_is_carried_as_epoch_millis() {
        let record = to_struct(&Fixture::standard());
        assert_eq!(
            record.get("created_at").and_then(Element::as_i64),
            Some(1_704_067_200_000)
        );
    }

    #[test]
    fn wrong_field_type_is_a_decode_error() {
        let record = Struct::builder()
            .with_field("id", "one")
            .with_field("name", "Alice")
            .with_field("is_active", true)
            .with_field("created_at", 0i64)
            .build();
        let bytes = Element::from(record).encode_as(v1_0::Binary).unwrap();
        assert_eq!(IonCodec.decode(&bytes), Err(wrong_type("id")));
    }
}
