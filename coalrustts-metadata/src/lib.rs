//! Support for table row metadata.
//!
//! Metadata is an opaque byte payload attached to a table row.
//! The library does not interpret it; client code declares a type,
//! implements [`MetadataRoundtrip`] for it, and the tables store
//! and return the encoded bytes.
//!
//! We strongly recommend the [serde](https://serde.rs/) ecosystem
//! for row metadata.  Two codecs are supported out of the box via
//! declarative macros:
//!
//! * [`serde_json_metadata`] for schema-friendly JSON payloads
//!   that other tooling can inspect,
//! * [`serde_bincode_metadata`] for compact structured binary
//!   payloads.
//!
//! # Example
//!
//! ```
//! #[derive(serde::Serialize, serde::Deserialize)]
//! struct MutationData {
//!     effect_size: f64,
//!     dominance: f64,
//! }
//!
//! coalrustts_metadata::serde_json_metadata!(MutationData);
//!
//! use coalrustts_metadata::MetadataRoundtrip;
//! let m = MutationData {
//!     effect_size: -1e-3,
//!     dominance: 0.1,
//! };
//! let encoded = m.encode().unwrap();
//! let decoded = MutationData::decode(&encoded).unwrap();
//! assert!((m.effect_size - decoded.effect_size).abs() < f64::EPSILON);
//! ```

use thiserror::Error;

/// Error type for metadata encoding/decoding.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Error related to types implementing
    /// [``MetadataRoundtrip``]
    #[error("{}", *value)]
    RoundtripError {
        /// The redirected error
        #[from]
        value: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Enable a type to be used as table metadata.
///
/// Decoding does not require that the input and output types be
/// identical.  They only need the same field layout, which allows
/// separate tooling to declare mirror types for payloads it did
/// not create.
pub trait MetadataRoundtrip {
    /// Encode `self` as a byte payload.
    fn encode(&self) -> Result<Vec<u8>, MetadataError>;
    /// Decode a byte payload.
    fn decode(md: &[u8]) -> Result<Self, MetadataError>
    where
        Self: Sized;
}

/// Marker trait indicating [`MetadataRoundtrip`]
/// for the mutation table of a table collection.
pub trait MutationMetadata: MetadataRoundtrip {}

/// Marker trait indicating [`MetadataRoundtrip`]
/// for the individual table of a table collection.
pub trait IndividualMetadata: MetadataRoundtrip {}

/// Marker trait indicating [`MetadataRoundtrip`]
/// for the population table of a table collection.
pub trait PopulationMetadata: MetadataRoundtrip {}

/// Convenience macro to map arbitrary errors into
/// [`MetadataError::RoundtripError`].
#[macro_export]
macro_rules! handle_metadata_return {
    ($e: expr) => {
        match $e {
            Ok(x) => Ok(x),
            Err(e) => Err($crate::MetadataError::RoundtripError { value: Box::new(e) }),
        }
    };
}

/// Encode a serializable value as JSON bytes.
///
/// Used by [`serde_json_metadata`]; usable directly as well.
pub fn encode_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, MetadataError> {
    handle_metadata_return!(serde_json::to_vec(value))
}

/// Decode a JSON byte payload.
pub fn decode_json<T: serde::de::DeserializeOwned>(md: &[u8]) -> Result<T, MetadataError> {
    handle_metadata_return!(serde_json::from_slice(md))
}

/// Encode a serializable value with `bincode`.
///
/// Used by [`serde_bincode_metadata`]; usable directly as well.
pub fn encode_bincode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, MetadataError> {
    handle_metadata_return!(bincode::serialize(value))
}

/// Decode a `bincode` byte payload.
pub fn decode_bincode<T: serde::de::DeserializeOwned>(md: &[u8]) -> Result<T, MetadataError> {
    handle_metadata_return!(bincode::deserialize(md))
}

/// Implement [`MetadataRoundtrip`] for a type using a JSON codec.
///
/// The type must implement `serde::Serialize` and
/// `serde::Deserialize`.
#[macro_export]
macro_rules! serde_json_metadata {
    ($ty: ty) => {
        impl $crate::MetadataRoundtrip for $ty {
            fn encode(&self) -> Result<Vec<u8>, $crate::MetadataError> {
                $crate::encode_json(self)
            }
            fn decode(md: &[u8]) -> Result<Self, $crate::MetadataError> {
                $crate::decode_json(md)
            }
        }
    };
}

/// Implement [`MetadataRoundtrip`] for a type using a
/// `bincode` codec.
///
/// The type must implement `serde::Serialize` and
/// `serde::Deserialize`.
#[macro_export]
macro_rules! serde_bincode_metadata {
    ($ty: ty) => {
        impl $crate::MetadataRoundtrip for $ty {
            fn encode(&self) -> Result<Vec<u8>, $crate::MetadataError> {
                $crate::encode_bincode(self)
            }
            fn decode(md: &[u8]) -> Result<Self, $crate::MetadataError> {
                $crate::decode_bincode(md)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct F {
        x: i32,
        y: u32,
    }

    impl MetadataRoundtrip for F {
        fn encode(&self) -> Result<Vec<u8>, MetadataError> {
            let mut rv = vec![];
            rv.extend(self.x.to_le_bytes().iter().copied());
            rv.extend(self.y.to_le_bytes().iter().copied());
            Ok(rv)
        }
        fn decode(md: &[u8]) -> Result<Self, MetadataError> {
            let (x_int_bytes, rest) = md.split_at(std::mem::size_of::<i32>());
            let (y_int_bytes, _) = rest.split_at(std::mem::size_of::<u32>());
            Ok(Self {
                x: i32::from_le_bytes(x_int_bytes.try_into().unwrap()),
                y: u32::from_le_bytes(y_int_bytes.try_into().unwrap()),
            })
        }
    }

    impl MutationMetadata for F {}

    #[test]
    fn test_metadata_round_trip() {
        let f = F { x: -3, y: 42 };
        let v = f.encode().unwrap();
        let df = F::decode(&v).unwrap();
        assert_eq!(f.x, df.x);
        assert_eq!(f.y, df.y);
    }
}
