// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conversion between cached values and the bytes held by the store.

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// Encodes values into bytes and decodes them back.
///
/// A codec must round-trip every value it accepts: `decode(encode(v))` yields a value
/// equal to `v`. Encoding failures are reported as [`ErrorKind::Encode`](crate::ErrorKind::Encode)
/// and decoding failures as [`ErrorKind::Decode`](crate::ErrorKind::Decode).
///
/// Codecs are generic per call so one cache can hold values of many types.
///
/// # Examples
///
/// ```
/// use nscache::{Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&vec![1, 2, 3])?;
/// let back: Vec<i32> = codec.decode(&bytes)?;
/// assert_eq!(back, [1, 2, 3]);
/// # Ok::<(), nscache::Error>(())
/// ```
pub trait Codec: Clone + Send + Sync + 'static {
    /// Serializes `value` into bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Encode`](crate::ErrorKind::Encode) error if the value
    /// cannot be represented in this format.
    fn encode<V>(&self, value: &V) -> Result<Vec<u8>>
    where
        V: Serialize + ?Sized;

    /// Deserializes a value from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Decode`](crate::ErrorKind::Decode) error if the bytes are
    /// malformed or do not describe a `V`.
    fn decode<V>(&self, bytes: &[u8]) -> Result<V>
    where
        V: DeserializeOwned;

    /// A short name for the format, used in logs.
    fn name(&self) -> &'static str;
}

/// Self-describing JSON encoding via `serde_json`. This is the default codec.
///
/// Stored values are readable by any JSON-aware tool, and decoding into a different but
/// compatible type (for example a map into a struct) works.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<V>(&self, value: &V) -> Result<Vec<u8>>
    where
        V: Serialize + ?Sized,
    {
        serde_json::to_vec(value).map_err(Error::encode)
    }

    fn decode<V>(&self, bytes: &[u8]) -> Result<V>
    where
        V: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(Error::decode)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Compact binary encoding via `bincode`.
///
/// Bincode is not self-describing: values must be decoded into the same type they were
/// encoded from, and types relying on `deserialize_any` (such as `serde_json::Value`) are
/// not supported.
#[cfg(feature = "bincode")]
#[cfg_attr(docsrs, doc(cfg(feature = "bincode")))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BincodeCodec;

#[cfg(feature = "bincode")]
impl Codec for BincodeCodec {
    fn encode<V>(&self, value: &V) -> Result<Vec<u8>>
    where
        V: Serialize + ?Sized,
    {
        bincode::serialize(value).map_err(Error::encode)
    }

    fn decode<V>(&self, bytes: &[u8]) -> Result<V>
    where
        V: DeserializeOwned,
    {
        bincode::deserialize(bytes).map_err(Error::decode)
    }

    fn name(&self) -> &'static str {
        "bincode"
    }
}

/// CBOR encoding via `ciborium`.
///
/// CBOR is self-describing like JSON but binary, so it reads values written by other CBOR
/// producers sharing the store. A map keyed by field names decodes into a struct with the
/// same fields.
#[cfg(feature = "cbor")]
#[cfg_attr(docsrs, doc(cfg(feature = "cbor")))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CborCodec;

#[cfg(feature = "cbor")]
impl Codec for CborCodec {
    fn encode<V>(&self, value: &V) -> Result<Vec<u8>>
    where
        V: Serialize + ?Sized,
    {
        let mut bytes = Vec::new();
        ciborium::into_writer(value, &mut bytes).map_err(Error::encode)?;
        Ok(bytes)
    }

    fn decode<V>(&self, bytes: &[u8]) -> Result<V>
    where
        V: DeserializeOwned,
    {
        ciborium::from_reader(bytes).map_err(Error::decode)
    }

    fn name(&self) -> &'static str {
        "cbor"
    }
}
