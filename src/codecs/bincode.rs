//! `bincode` 1.x with its default (fixed-int, little-endian) options.

use super::{Codec, CodecError};
use crate::fixture::Fixture;

const NAME: &str = "bincode";

#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl Codec for BincodeCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(fixture).map_err(|e| CodecError::encode(NAME, e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError::decode(NAME, e))
    }
}
