//! # Value Model
//!
//! The tagged union of RESP values described in §3 of the protocol
//! specification, plus the convenience converters from §4.2.
//!
//! A decoded [`Value`] exclusively owns its payload bytes - they are copied
//! out of the [`crate::buffer::Buffer`] as part of decoding, so a `Value`
//! never borrows from the buffer it was parsed out of.
//!
//! Error-kind values ([`Value::SimpleError`], [`Value::BlobError`]) are kept
//! as distinct variants from their non-error counterparts rather than
//! conflated, since they have different wire shapes (line-framed vs.
//! length-prefixed) and different semantics (a reply the application must
//! decide whether to treat as an exception).

use crate::config::Config;
use crate::errors::ProtocolError;
use bytes::Bytes;
use num_bigint::BigInt;
use std::collections::HashMap;
use std::str::FromStr;

/// How a decoded `Map` frame is represented, per the `dict_for_map` setting
/// in [`Config`].
///
/// Kept as its own type rather than two `Value::Map*` variants so match
/// arms that don't care about map shape (e.g. a pretty-printer) only have to
/// handle one `Value::Map(_)` case.
#[derive(Debug, Clone)]
pub enum MapData {
    /// Ordered `(key, value)` pairs - the safe default, since RESP permits
    /// non-hashable keys (nested aggregates).
    Pairs(Vec<(Value, Value)>),
    /// A host mapping. Only constructed when the caller's `Config` asserts
    /// every key it will see is hashable.
    Dict(HashMap<Value, Value>),
}

impl PartialEq for MapData {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MapData::Pairs(a), MapData::Pairs(b)) => a == b,
            (MapData::Dict(a), MapData::Dict(b)) => a == b,
            _ => false,
        }
    }
}

/// A decoded RESP value. See §3 of the specification for the full variant
/// table and the wire shape each one carries.
#[derive(Debug, Clone)]
pub enum Value {
    SimpleString(Bytes),
    SimpleError(Bytes),
    Integer(i64),
    BulkString(Bytes),
    NullBulkString,
    Array(Vec<Value>),
    NullArray,
    /// RESP3 explicit null (`_`), distinct from a null bulk string or array.
    Null,
    Double(f64),
    Boolean(bool),
    /// Arbitrary-precision integer, kept as its decimal-text wire payload;
    /// see [`Value::as_bigint`] for the arbitrary-precision conversion.
    BigNumber(Bytes),
    BlobError(Bytes),
    VerbatimString {
        format: [u8; 3],
        data: Bytes,
    },
    Map(MapData),
    /// Redis sets have no declared wire order; members are kept here in
    /// arrival order rather than deduplicated or rehashed.
    Set(Vec<Value>),
    NullSet,
    /// Out-of-band metadata attached to the wire ahead of the next frame.
    /// Surfaced standalone rather than attached to the following value - see
    /// the attribute-attachment design note.
    Attribute(Vec<(Value, Value)>),
    Push(Vec<Value>),
    NullPush,
}

impl Value {
    /// True for any of the explicit or length-encoded nulls.
    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::NullBulkString | Value::NullArray | Value::NullSet | Value::NullPush
        )
    }

    /// Converts a text-bearing value (`SimpleString`, `SimpleError`,
    /// `BulkString`, `BlobError`, `VerbatimString`) to host text under the
    /// active `Config`.
    ///
    /// Returns `None` for any non-text variant, matching the variant-mismatch
    /// convention the other converters on this type already use
    /// (`as_integer`/`as_float`/`as_bool` return `None`); `Some(Err(_))` is a
    /// genuine conversion failure (invalid bytes under the configured
    /// encoding), not a variant mismatch.
    pub fn as_text(&self, config: &Config) -> Option<Result<String, ProtocolError>> {
        let bytes = match self {
            Value::SimpleString(b) | Value::SimpleError(b) | Value::BulkString(b) | Value::BlobError(b) => b,
            Value::VerbatimString { data, .. } => data,
            _ => return None,
        };
        Some(decode_text(bytes, config))
    }

    /// Converts an `Integer` payload to `i64`. The decoder already validated
    /// and parsed the payload at decode time, so this never fails; it
    /// returns `None` for non-`Integer` variants.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts a `BigNumber` payload to an arbitrary-precision integer.
    pub fn as_bigint(&self) -> Result<BigInt, ProtocolError> {
        match self {
            Value::BigNumber(raw) => {
                let text = String::from_utf8_lossy(raw);
                BigInt::from_str(&text)
                    .map_err(|_| ProtocolError::InvalidBigNumber(text.into_owned()))
            }
            _ => Err(ProtocolError::InvalidBigNumber(String::new())),
        }
    }

    /// Converts a `Double` payload to `f64`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts a `Boolean` payload to `bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

fn decode_text(bytes: &Bytes, config: &Config) -> Result<String, ProtocolError> {
    use crate::config::ErrorPolicy;
    match config.errors {
        ErrorPolicy::Strict => String::from_utf8(bytes.to_vec()).map_err(|e| ProtocolError::InvalidText {
            encoding: config.encoding.name(),
            source: e,
        }),
        ErrorPolicy::Replace => Ok(String::from_utf8_lossy(bytes).into_owned()),
        ErrorPolicy::Ignore => Ok(String::from_utf8_lossy(bytes)
            .chars()
            .filter(|c| *c != '\u{FFFD}')
            .collect()),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (SimpleString(a), SimpleString(b)) => a == b,
            (SimpleError(a), SimpleError(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (BulkString(a), BulkString(b)) => a == b,
            (NullBulkString, NullBulkString) => true,
            (Array(a), Array(b)) => a == b,
            (NullArray, NullArray) => true,
            (Null, Null) => true,
            (Double(a), Double(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (BigNumber(a), BigNumber(b)) => a == b,
            (BlobError(a), BlobError(b)) => a == b,
            (
                VerbatimString { format: f1, data: d1 },
                VerbatimString { format: f2, data: d2 },
            ) => f1 == f2 && d1 == d2,
            (Map(a), Map(b)) => a == b,
            (Set(a), Set(b)) => a == b,
            (NullSet, NullSet) => true,
            (Attribute(a), Attribute(b)) => a == b,
            (Push(a), Push(b)) => a == b,
            (NullPush, NullPush) => true,
            _ => false,
        }
    }
}

/// Manual `Eq`/`Hash` so `Value` can serve as a `HashMap` key when
/// `dict_for_map` is set. `Double` is hashed and compared by bit pattern,
/// which is the conventional escape hatch for putting floats in a key
/// position - it is the caller's responsibility (per the `dict_for_map`
/// contract) to only opt into the dict shape when keys are actually
/// well-behaved, hashable values such as bulk strings.
impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use Value::*;
        std::mem::discriminant(self).hash(state);
        match self {
            SimpleString(b) | SimpleError(b) | BulkString(b) | BigNumber(b) | BlobError(b) => b.hash(state),
            Integer(v) => v.hash(state),
            Double(v) => v.to_bits().hash(state),
            Boolean(v) => v.hash(state),
            VerbatimString { format, data } => {
                format.hash(state);
                data.hash(state);
            }
            Array(v) | Set(v) | Push(v) => v.hash(state),
            Map(MapData::Pairs(v)) => v.hash(state),
            Map(MapData::Dict(_)) => {
                // A nested dict-shaped map as a key is pathological; fall
                // back to the discriminant only rather than hashing an
                // unordered HashMap (which has no stable iteration order).
            }
            Attribute(v) => v.hash(state),
            NullBulkString | NullArray | Null | NullSet | NullPush => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ErrorPolicy};

    #[test]
    fn as_text_strict_utf8() {
        let v = Value::BulkString(Bytes::from_static(b"hello"));
        let cfg = Config::default();
        assert_eq!(v.as_text(&cfg).unwrap().unwrap(), "hello");
    }

    #[test]
    fn as_text_strict_rejects_invalid_utf8() {
        let v = Value::BulkString(Bytes::from_static(&[0xff, 0xfe]));
        let cfg = Config::default();
        assert!(v.as_text(&cfg).unwrap().is_err());
    }

    #[test]
    fn as_text_replace_substitutes() {
        let v = Value::BulkString(Bytes::from_static(&[0xff]));
        let mut cfg = Config::default();
        cfg.errors = ErrorPolicy::Replace;
        assert_eq!(v.as_text(&cfg).unwrap().unwrap(), "\u{FFFD}");
    }

    #[test]
    fn as_text_on_non_text_variant_is_none() {
        let cfg = Config::default();
        assert_eq!(Value::Integer(42).as_text(&cfg), None);
        assert_eq!(Value::Array(vec![]).as_text(&cfg), None);
        assert_eq!(Value::Boolean(true).as_text(&cfg), None);
    }

    #[test]
    fn as_integer_and_as_bigint() {
        assert_eq!(Value::Integer(42).as_integer(), Some(42));
        let big = Value::BigNumber(Bytes::from_static(
            b"3492890328409238509324850943850943825024385",
        ));
        assert_eq!(
            big.as_bigint().unwrap().to_string(),
            "3492890328409238509324850943850943825024385"
        );
    }

    #[test]
    fn null_variants_report_is_null() {
        assert!(Value::Null.is_null());
        assert!(Value::NullBulkString.is_null());
        assert!(Value::NullArray.is_null());
        assert!(Value::NullSet.is_null());
        assert!(Value::NullPush.is_null());
        assert!(!Value::Integer(0).is_null());
    }

    #[test]
    fn value_can_key_a_hashmap() {
        let mut m: HashMap<Value, Value> = HashMap::new();
        m.insert(
            Value::BulkString(Bytes::from_static(b"a")),
            Value::Integer(1),
        );
        assert_eq!(
            m.get(&Value::BulkString(Bytes::from_static(b"a"))),
            Some(&Value::Integer(1))
        );
    }
}
