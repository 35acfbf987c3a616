//! Codec adapters: one uniform encode/decode contract per serialization format.
//!
//! Every adapter wraps a third-party library. Adapters are stateless; the
//! runner calls into them, they never call back into the runner.

use crate::error::ConfigError;
use crate::fixture::Fixture;
use thiserror::Error;

pub mod avro;
pub mod bincode;
pub mod bson;
pub mod cbor;
pub mod ion;
pub mod json;
pub mod msgpack;
pub mod protobuf;

/// Failure reported by an adapter for a single call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("{format}: encode failed: {message}")]
    Encode { format: String, message: String },

    #[error("{format}: decode failed: {message}")]
    Decode { format: String, message: String },
}

impl CodecError {
    pub fn encode(format: &str, err: impl std::fmt::Display) -> Self {
        CodecError::Encode {
            format: format.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode(format: &str, err: impl std::fmt::Display) -> Self {
        CodecError::Decode {
            format: format.to_string(),
            message: err.to_string(),
        }
    }
}

/// Uniform adapter contract.
///
/// `decode(encode(f)) == f` must hold for every fixture. Implementations must
/// not retain the byte buffer passed to `decode` past the call.
pub trait Codec: Send + Sync {
    fn name(&self) -> &str;
    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError>;
}

type EncodeFn = dyn Fn(&Fixture) -> Result<Vec<u8>, CodecError> + Send + Sync;
type DecodeFn = dyn Fn(&[u8]) -> Result<Fixture, CodecError> + Send + Sync;

/// Adapter assembled from a `(name, encode, decode)` registration.
pub struct FnCodec {
    name: String,
    encode: Box<EncodeFn>,
    decode: Box<DecodeFn>,
}

impl FnCodec {
    pub fn new<E, D>(name: impl Into<String>, encode: E, decode: D) -> Self
    where
        E: Fn(&Fixture) -> Result<Vec<u8>, CodecError> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<Fixture, CodecError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl Codec for FnCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, fixture: &Fixture) -> Result<Vec<u8>, CodecError> {
        (self.encode)(fixture)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Fixture, CodecError> {
        (self.decode)(bytes)
    }
}

/// Ordered, name-unique set of adapters. Fixed once the run starts.
#[derive(Default)]
pub struct Registry {
    codecs: Vec<Box<dyn Codec>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in adapters, in their canonical benchmarking order.
    pub fn builtin() -> Self {
        let codecs: Vec<Box<dyn Codec>> = vec![
            Box::new(protobuf::ProtobufCodec),
            Box::new(avro::AvroCodec::new()),
            Box::new(bson::BsonCodec),
            Box::new(cbor::CborCodec),
            Box::new(ion::IonCodec),
            Box::new(msgpack::MessagePackCodec),
            Box::new(json::JsonCodec),
            Box::new(bincode::BincodeCodec),
        ];
        Self { codecs }
    }

    pub fn register(&mut self, codec: Box<dyn Codec>) -> Result<(), ConfigError> {
        if self.get(codec.name()).is_some() {
            return Err(ConfigError::DuplicateFormat {
                name: codec.name().to_string(),
            });
        }
        self.codecs.push(codec);
        Ok(())
    }

    pub fn register_fn<E, D>(&mut self, name: &str, encode: E, decode: D) -> Result<(), ConfigError>
    where
        E: Fn(&Fixture) -> Result<Vec<u8>, CodecError> + Send + Sync + 'static,
        D: Fn(&[u8]) -> Result<Fixture, CodecError> + Send + Sync + 'static,
    {
        self.register(Box::new(FnCodec::new(name, encode, decode)))
    }

    pub fn get(&self, name: &str) -> Option<&dyn Codec> {
        self.codecs
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.codecs.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Codec> {
        self.codecs.iter().map(|c| c.as_ref())
    }

    /// Keep only the named formats. Registration order is preserved; an
    /// empty filter keeps everything.
    pub fn select(self, filter: &[String]) -> Result<Self, ConfigError> {
        if filter.is_empty() {
            return Ok(self);
        }
        for name in filter {
            if self.get(name).is_none() {
                return Err(ConfigError::UnknownFormat {
                    name: name.clone(),
                    known: self.names().join(", "),
                });
            }
        }
        let codecs = self
            .codecs
            .into_iter()
            .filter(|c| filter.iter().any(|f| f == c.name()))
            .collect();
        Ok(Self { codecs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_fixture(rng: &mut ChaCha8Rng) -> Fixture {
        let len = rng.gen_range(0..64);
        let name: String = (0..len)
            .map(|_| rng.gen_range('a'..='z'))
            .chain(std::iter::once('é'))
            .collect();
        let secs = rng.gen_range(0..4_000_000_000i64);
        let nanos = rng.gen_range(0..1_000_000_000u32);
        let ts = chrono::DateTime::from_timestamp(secs, nanos).unwrap();
        Fixture::new(rng.gen(), name, rng.gen(), ts)
    }

    #[test]
    fn every_builtin_round_trips_the_standard_fixture() {
        let fixture = Fixture::standard();
        for codec in Registry::builtin().iter() {
            let bytes = codec.encode(&fixture).unwrap();
            assert!(!bytes.is_empty(), "{} produced no bytes", codec.name());
            let back = codec.decode(&bytes).unwrap();
            assert_eq!(back, fixture, "{} round-trip mismatch", codec.name());
        }
    }

    #[test]
    fn every_builtin_round_trips_seeded_fixtures() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let registry = Registry::builtin();
        for _ in 0..64 {
            let fixture = random_fixture(&mut rng);
            for codec in registry.iter() {
                let bytes = codec.encode(&fixture).unwrap();
                assert_eq!(codec.decode(&bytes).unwrap(), fixture, "{}", codec.name());
            }
        }
    }

    #[test]
    fn every_builtin_round_trips_extreme_timestamps() {
        use chrono::{TimeZone, Utc};
        let registry = Registry::builtin();
        let stamps = [
            Utc.with_ymd_and_hms(-5, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap(),
            chrono::DateTime::from_timestamp_millis(-500).unwrap(),
        ];
        for ts in stamps {
            let fixture = Fixture::new(-1, "Alice", false, ts);
            for codec in registry.iter() {
                let bytes = codec.encode(&fixture).unwrap();
                assert_eq!(codec.decode(&bytes).unwrap(), fixture, "{} at {ts}", codec.name());
            }
        }
    }

    #[test]
    fn every_builtin_rejects_truncated_input() {
        let fixture = Fixture::standard();
        for codec in Registry::builtin().iter() {
            let bytes = codec.encode(&fixture).unwrap();
            let truncated = &bytes[..bytes.len() / 2];
            match codec.decode(truncated) {
                Err(CodecError::Decode { format, .. }) => assert_eq!(format, codec.name()),
                other => panic!("{}: expected decode error, got {other:?}", codec.name()),
            }
        }
    }

    #[test]
    fn builtin_names_are_unique_and_ordered() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.names(),
            vec!["protobuf", "avro", "bson", "cbor", "ion", "msgpack", "json", "bincode"]
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = Registry::builtin();
        let err = registry
            .register_fn("json", |_| Ok(Vec::new()), |_| Ok(Fixture::standard()))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateFormat {
                name: "json".into()
            }
        );
    }

    #[test]
    fn select_keeps_registration_order() {
        let filter = vec!["json".to_string(), "protobuf".to_string()];
        let registry = Registry::builtin().select(&filter).unwrap();
        assert_eq!(registry.names(), vec!["protobuf", "json"]);
    }

    #[test]
    fn select_rejects_unknown_format() {
        let filter = vec!["yaml".to_string()];
        let err = Registry::builtin().select(&filter).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownFormat { name, .. } if name == "yaml"));
    }
}
