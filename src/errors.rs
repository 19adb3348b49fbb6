//! # Errors
//!
//! Error types used throughout the codec.
//!
//! The codec distinguishes two failure kinds, per the wire contract:
//! [`ProtocolError`] means the byte stream is not valid RESP and is fatal to the
//! stream (the only recovery is [`crate::decoder::Decoder::reset`]).
//! [`EncodeError`] means a caller asked the encoder to produce something the
//! active protocol version or text encoding cannot represent.
//!
//! "Insufficient data" is not an error at all - see [`crate::decoder::Decoded`].

use std::string::FromUtf8Error;
use thiserror::Error;

/// Errors related to decoding a byte stream as RESP.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unsupported RESP type byte: {0:#04x}")]
    UnsupportedType(u8),

    #[error("missing CRLF terminator")]
    CRLFMissing,

    #[error("length prefix is not a valid signed decimal integer: {0:?}")]
    InvalidLength(String),

    #[error("integer payload is not a valid signed decimal integer: {0:?}")]
    InvalidInteger(String),

    #[error("integer payload {0:?} overflows a 64-bit signed integer")]
    IntegerOverflow(String),

    #[error("big number payload is not a valid decimal integer: {0:?}")]
    InvalidBigNumber(String),

    #[error("double payload is not a valid floating point literal: {0:?}")]
    InvalidDouble(String),

    #[error("null (`_`) frame must not carry a payload")]
    NullWithPayload,

    #[error("boolean (`#`) frame must be `t` or `f`")]
    InvalidBoolean,

    #[error("verbatim string payload is missing its `ttt:` type tag")]
    MissingVerbatimTag,

    #[error("RESP3 type byte {0:#04x} is not valid under RESP2 (strict mode)")]
    Resp3TypeUnderResp2(u8),

    #[error("text payload is not valid {encoding}: {source}")]
    InvalidText {
        encoding: &'static str,
        #[source]
        source: FromUtf8Error,
    },
}

/// Errors related to encoding a [`crate::value::Value`] or host value to bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("RESP2 cannot represent a {0}; use resp_version 3")]
    UnrepresentableUnderResp2(&'static str),

    #[error("text payload cannot be encoded as {encoding} under the `strict` error policy")]
    InvalidText { encoding: &'static str },

    #[error("a command requires at least one argument (its name)")]
    EmptyCommand,
}
