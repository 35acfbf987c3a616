//! CBOR via `serde_cbor`.

use super::{Codec, CodecError};
use crate::fixture::Fixture;

const NAME: &str = "cbor";

#[derive(Debug, Clone, Copy, Default)]
pub struct CborCodec;

impl Codec for CborCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        serde_cbor::to_vec(fixture).map_err(|e| CodecError::encode(NAME, e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        serde_cbor::from_slice(bytes).map_err(|e| CodecError::decode(NAME, e))
    }
}
