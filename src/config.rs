//! # Configuration
//!
//! The knobs the decoder and encoder share. Grounded in `sioresp.config.Config`
//! (resp_version, encoding) and extended to the full set in §6 of the spec
//! (`errors` policy, `dict_for_map`) - both are referenced at the point of use
//! in [`crate::decoder`] rather than threaded through as free parameters.

/// Which revision of the wire protocol is active.
///
/// Gates which RESP3 type bytes the decoder accepts and which null/encoding
/// the encoder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RespVersion {
    V2,
    V3,
}

impl Default for RespVersion {
    fn default() -> Self {
        RespVersion::V2
    }
}

/// Policy applied when converting a text-bearing [`crate::value::Value`] payload
/// to a host string fails to decode under `encoding`.
///
/// Mirrors the three policies Python's `bytes.decode(errors=...)` recognizes,
/// since that is the convention `sioresp.Connection.pack_*` was built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorPolicy {
    /// Fail the conversion with [`crate::errors::ProtocolError::InvalidText`] /
    /// [`crate::errors::EncodeError::InvalidText`].
    Strict,
    /// Substitute the Unicode replacement character for invalid sequences.
    Replace,
    /// Drop invalid sequences silently.
    Ignore,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        ErrorPolicy::Strict
    }
}

/// How a decoded `Map` frame is handed to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapShape {
    /// An ordered sequence of `(key, value)` pairs - safe even when keys are
    /// themselves aggregates (and therefore not hashable).
    Pairs,
    /// A host mapping keyed by the decoded key. Only safe when the
    /// application knows every key it will receive is hashable.
    Dict,
}

impl Default for MapShape {
    fn default() -> Self {
        MapShape::Pairs
    }
}

/// Shared configuration for [`crate::decoder::Decoder`] and [`crate::encoder`].
///
/// `Default` matches the conservative combination: RESP2, UTF-8, strict text
/// conversion, and the safe sequence-of-pairs map shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    pub resp_version: RespVersion,
    pub encoding: TextEncoding,
    pub errors: ErrorPolicy,
    pub dict_for_map: bool,
}

impl Config {
    pub fn new(resp_version: RespVersion) -> Self {
        Self {
            resp_version,
            ..Self::default()
        }
    }

    pub fn map_shape(&self) -> MapShape {
        if self.dict_for_map {
            MapShape::Dict
        } else {
            MapShape::Pairs
        }
    }

    pub fn is_resp3(&self) -> bool {
        matches!(self.resp_version, RespVersion::V3)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resp_version: RespVersion::default(),
            encoding: TextEncoding::default(),
            errors: ErrorPolicy::default(),
            dict_for_map: false,
        }
    }
}

/// The text encoding applied by the text converters on [`crate::value::Value`].
///
/// RESP itself is a binary-safe protocol; this only governs the convenience
/// `to_text` conversions, not the wire framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
}

impl Default for TextEncoding {
    fn default() -> Self {
        TextEncoding::Utf8
    }
}

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
        }
    }
}
