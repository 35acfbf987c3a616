//! BSON documents via the `bson` crate, `created_at` as a native BSON datetime.

use super::{Codec, CodecError};
use crate::fixture::Fixture;
use bson::{doc, Document};
use chrono::DateTime;

const NAME: &str = "bson";

#[derive(Debug, Clone, Copy, Default)]
pub struct BsonCodec;

impl Codec for BsonCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        let document = doc! {
            "id": fixture.id(),
            "name": fixture.name(),
            "is_active": fixture.is_active(),
            "created_at": bson::DateTime::from_millis(fixture.created_at().timestamp_millis()),
        };
        let mut buf = Vec::with_capacity(64);
        document
            .to_writer(&mut buf)
            .map_err(|e| CodecError::encode(NAME, e))?;
        Ok(buf)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        let err = |e: bson::document::ValueAccessError| CodecError::decode(NAME, e);
        let document = Document::from_reader(bytes).map_err(|e| CodecError::decode(NAME, e))?;
        let millis = document.get_datetime("created_at").map_err(err)?.timestamp_millis();
        Ok(Fixture::new(
            document.get_i64("id").map_err(err)?,
            document.get_str("name").map_err(err)?,
            document.get_bool("is_active").map_err(err)?,
            DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| CodecError::decode(NAME, "created_at out of range"))?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stored_as_int64() {
        let bytes = BsonCodec.encode(&Fixture::standard()).unwrap();
        let document = Document::from_reader(bytes.as_slice()).unwrap();
        assert!(matches!(document.get("id"), Some(bson::Bson::Int64(1))));
    }

    #[test]
    fn wrong_field_type_is_a_decode_error() {
        let document = doc! { "id": "one", "name": "Alice", "is_active": true };
        let mut bytes = Vec::new();
        document.to_writer(&mut bytes).unwrap();
        assert!(matches!(
            BsonCodec.decode(&bytes),
            Err(CodecError::Decode { .. })
        ));
    }
}
