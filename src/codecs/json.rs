//! JSON via `serde_json`. Text baseline for the binary formats.

use super::{Codec, CodecError};
use crate::fixture::Fixture;

const NAME: &str = "json";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(fixture).map_err(|e| CodecError::encode(NAME, e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::decode(NAME, e))
    }
}
