//! Decoders for `OK <bytes>` response bodies.
//!
//! List and statistics commands answer with a small YAML document. Each
//! command names the decoder that turns its body into a [`Payload`].

use std::collections::BTreeMap;

use crate::error::BodyError;
use crate::response::{Payload, StatValue};

/// Turns a raw response body into a payload.
pub trait BodyDecoder: Send + Sync {
    /// Decodes `body`, which excludes the trailing CRLF.
    ///
    /// # Errors
    ///
    /// Returns a [`BodyError`] when the body does not have the expected shape.
    fn decode(&self, body: &[u8]) -> Result<Payload, BodyError>;
}

/// Keeps the body as raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl BodyDecoder for RawDecoder {
    fn decode(&self, body: &[u8]) -> Result<Payload, BodyError> {
        Ok(Payload::Bytes(body.to_vec()))
    }
}

/// Decodes a YAML sequence of strings, as sent by `list-tubes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlListDecoder;

impl BodyDecoder for YamlListDecoder {
    fn decode(&self, body: &[u8]) -> Result<Payload, BodyError> {
        let text = std::str::from_utf8(body)?;
        let items: Vec<String> =
            serde_saphyr::from_str(text).map_err(|error| BodyError::Yaml {
                expected: "list",
                message: error.to_string(),
            })?;
        Ok(Payload::List(items))
    }
}

/// Decodes a flat YAML mapping, as sent by the `stats` family.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlMapDecoder;

impl BodyDecoder for YamlMapDecoder {
    fn decode(&self, body: &[u8]) -> Result<Payload, BodyError> {
        let text = std::str::from_utf8(body)?;
        let entries: BTreeMap<String, StatValue> =
            serde_saphyr::from_str(text).map_err(|error| BodyError::Yaml {
                expected: "mapping",
                message: error.to_string(),
            })?;
        Ok(Payload::Map(entries))
    }
}
