//! Protocol Buffers via `prost`, with a well-known `Timestamp` for `created_at`.

use super::{Codec, CodecError};
use crate::fixture::Fixture;
use chrono::DateTime;
use prost::Message;

const NAME: &str = "protobuf";

/// Wire message, equivalent to:
///
/// ```text
/// message UserProto {
///   int64 id = 1;
///   string name = 2;
///   bool is_active = 3;
///   google.protobuf.Timestamp created_at = 4;
/// }
/// ```
#[derive(Clone, PartialEq, Message)]
pub struct UserProto {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(bool, tag = "3")]
    pub is_active: bool,
    #[prost(message, optional, tag = "4")]
    pub created_at: Option<prost_types::Timestamp>,
}

impl From<&Fixture> for UserProto {
    fn from(f: &Fixture) -> Self {
        UserProto {
            id: f.id(),
            name: f.name().to_string(),
            is_active: f.is_active(),
            created_at: Some(prost_types::Timestamp {
                seconds: f.created_at().timestamp(),
                nanos: f.created_at().timestamp_subsec_nanos() as i32,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl Codec for ProtobufCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        Ok(UserProto::from(fixture).encode_to_vec())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        let msg = UserProto::decode(bytes).map_err(|e| CodecError::decode(NAME, e))?;
        let ts = msg
            .created_at
            .ok_or_else(|| CodecError::decode(NAME, "missing field created_at"))?;
        let nanos = u32::try_from(ts.nanos).map_err(|e| CodecError::decode(NAME, e))?;
        let created_at = DateTime::from_timestamp(ts.seconds, nanos)
            .ok_or_else(|| CodecError::decode(NAME, "created_at out of range"))?;
        Ok(Fixture::new(msg.id, msg.name, msg.is_active, created_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_survives_as_seconds_and_nanos() {
        let msg = UserProto::from(&Fixture::standard());
        let ts = msg.created_at.unwrap();
        assert_eq!(ts.seconds, 1_704_067_200);
        assert_eq!(ts.nanos, 0);
    }

    #[test]
    fn missing_timestamp_is_a_decode_error() {
        let mut msg = UserProto::from(&Fixture::standard());
        msg.created_at = None;
        let err = ProtobufCodec.decode(&msg.encode_to_vec()).unwrap_err();
        assert!(matches!(err, CodecError::Decode { .. }));
    }
}
