//! MessagePack via `rmp-serde`.
//!
//! Fields are written positionally (a 4-element array), the compact layout
//! produced by index-keyed MessagePack models.

use super::{Codec, CodecError};
use crate::fixture::Fixture;

const NAME: &str = "msgpack";

#[derive(Debug, Clone, Copy, Default)]
pub struct MessagePackCodec;

impl Codec for MessagePackCodec {
    fn name(&self) -> &str {
        NAME
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        rmp_serde::to_vec(fixture).map_err(|e| CodecError::encode(NAME, e))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        rmp_serde::from_slice(bytes).map_err(|e| CodecError::decode(NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_fixarray_of_four() {
        let bytes = MessagePackCodec.encode(&Fixture::standard()).unwrap();
        assert_eq!(bytes[0], 0x94);
    }
}
