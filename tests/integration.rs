//! End-to-end scenarios from §8 of the protocol specification that exercise
//! the buffer, decoder, and encoder together rather than any one module in
//! isolation.

use bytes::Bytes;
use resp_codec::config::{Config, RespVersion};
use resp_codec::decoder::{Decoded, Decoder};
use resp_codec::encoder::encode;
use resp_codec::errors::ProtocolError;
use resp_codec::value::{MapData, Value};

fn resp2_decoder() -> Decoder {
    Decoder::new(Config::new(RespVersion::V2))
}

fn resp3_decoder() -> Decoder {
    Decoder::new(Config::new(RespVersion::V3))
}

fn bulk(s: &'static [u8]) -> Value {
    Value::BulkString(Bytes::from_static(s))
}

#[test]
fn scenario_simple_string() {
    let mut d = resp2_decoder();
    d.feed(b"+OK\r\n").unwrap();
    assert_eq!(d.next_value(), Decoded::Value(Value::SimpleString(Bytes::from_static(b"OK"))));
}

#[test]
fn scenario_bulk_string_with_embedded_crlf() {
    let mut d = resp2_decoder();
    d.feed(b"$8\r\nfoo\r\nbar\r\n").unwrap();
    assert_eq!(d.next_value(), Decoded::Value(bulk(b"foo\r\nbar")));
}

#[test]
fn scenario_null_array() {
    let mut d = resp2_decoder();
    d.feed(b"*-1\r\n").unwrap();
    assert_eq!(d.next_value(), Decoded::Value(Value::NullArray));
}

#[test]
fn scenario_nested_arrays() {
    let mut d = resp2_decoder();
    d.feed(b"*2\r\n*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n")
        .unwrap();
    let inner = Value::Array(vec![bulk(b"foo"), bulk(b"bar")]);
    assert_eq!(
        d.next_value(),
        Decoded::Value(Value::Array(vec![inner.clone(), inner]))
    );
}

#[test]
fn scenario_split_feed_across_length_prefix_and_payload() {
    let mut d = resp2_decoder();
    d.feed(b"*5\r\n:1\r").unwrap();
    assert_eq!(d.next_value(), Decoded::Insufficient);
    d.feed(b"\n:2\r\n:3\r\n:4").unwrap();
    assert_eq!(d.next_value(), Decoded::Insufficient);
    d.feed(b"\r\n$6\r\nfoobar\r\n").unwrap();
    assert_eq!(
        d.next_value(),
        Decoded::Value(Value::Array(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
            Value::Integer(4),
            bulk(b"foobar"),
        ]))
    );
}

#[test]
fn scenario_resp3_attribute() {
    let mut d = resp3_decoder();
    d.feed(b"|1\r\n+key-popularity\r\n%2\r\n$1\r\na\r\n,0.1923\r\n$1\r\nb\r\n,0.0012\r\n")
        .unwrap();
    assert_eq!(
        d.next_value(),
        Decoded::Value(Value::Attribute(vec![(
            Value::SimpleString(Bytes::from_static(b"key-popularity")),
            Value::Map(MapData::Pairs(vec![
                (bulk(b"a"), Value::Double(0.1923)),
                (bulk(b"b"), Value::Double(0.0012)),
            ])),
        )]))
    );
}

#[test]
fn scenario_empty_and_null_bulk_string() {
    let mut d = resp2_decoder();
    d.feed(b"$0\r\n\r\n$-1\r\n").unwrap();
    assert_eq!(d.next_value(), Decoded::Value(bulk(b"")));
    assert_eq!(d.next_value(), Decoded::Value(Value::NullBulkString));
}

#[test]
fn scenario_boolean_and_explicit_null() {
    let mut d = resp3_decoder();
    d.feed(b"#t\r\n#f\r\n_\r\n").unwrap();
    assert_eq!(d.next_value(), Decoded::Value(Value::Boolean(true)));
    assert_eq!(d.next_value(), Decoded::Value(Value::Boolean(false)));
    assert_eq!(d.next_value(), Decoded::Value(Value::Null));
}

#[test]
fn scenario_big_number() {
    let mut d = resp3_decoder();
    let digits = "12345678901234567890123456789012345678";
    d.feed(format!("({digits}\r\n").as_bytes()).unwrap();
    let Decoded::Value(v) = d.next_value() else {
        panic!("expected a value");
    };
    assert_eq!(v.as_bigint().unwrap().to_string(), digits);
}

#[test]
fn scenario_push_with_four_children() {
    let mut d = resp3_decoder();
    d.feed(b">4\r\n:1\r\n:2\r\n:3\r\n:4\r\n").unwrap();
    assert_eq!(
        d.next_value(),
        Decoded::Value(Value::Push(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
            Value::Integer(4),
        ]))
    );
}

#[test]
fn scenario_malformed_stream_does_not_consume_later_bytes() {
    let mut d = resp2_decoder();
    let err = d.feed(b"&nope\r\n+OK\r\n").unwrap_err();
    assert_eq!(err, ProtocolError::UnsupportedType(b'&'));
    // Nothing was queued - not even the well-formed `+OK\r\n` that followed
    // the bad byte, since `feed` stops at the first offense.
    assert_eq!(d.next_value(), Decoded::Insufficient);
}

#[test]
fn every_byte_split_of_a_pipelined_stream_yields_the_same_values() {
    let whole: &[u8] = b"*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n+OK\r\n:42\r\n";
    let expected = [
        Value::Array(vec![bulk(b"foo"), bulk(b"bar")]),
        Value::SimpleString(Bytes::from_static(b"OK")),
        Value::Integer(42),
    ];

    for split in 0..=whole.len() {
        let mut d = resp2_decoder();
        d.feed(&whole[..split]).unwrap();
        d.feed(&whole[split..]).unwrap();
        for want in &expected {
            assert_eq!(d.next_value(), Decoded::Value(want.clone()), "split at {split}");
        }
        assert_eq!(d.next_value(), Decoded::Insufficient);
    }
}

#[test]
fn nested_aggregate_can_be_fed_one_byte_at_a_time() {
    let whole: &[u8] = b"*2\r\n*2\r\n:1\r\n:2\r\n$3\r\nfoo\r\n";
    let mut d = resp2_decoder();
    for byte in whole {
        d.feed(std::slice::from_ref(byte)).unwrap();
        if d.next_value() != Decoded::Insufficient {
            panic!("should not have completed before all bytes arrived");
        }
    }
    // Buffer is already drained above; feeding nothing more and retrying
    // should now succeed since the last `feed` delivered the final byte.
    d.feed(b"").unwrap();
    assert_eq!(
        d.next_value(),
        Decoded::Value(Value::Array(vec![
            Value::Array(vec![Value::Integer(1), Value::Integer(2)]),
            bulk(b"foo"),
        ]))
    );
}

#[test]
fn reset_discards_partial_aggregate_and_behaves_like_fresh() {
    let mut d = resp2_decoder();
    d.feed(b"*3\r\n:1\r\n:2\r\n").unwrap();
    assert_eq!(d.next_value(), Decoded::Insufficient);
    d.reset();
    d.feed(b"+OK\r\n").unwrap();
    assert_eq!(d.next_value(), Decoded::Value(Value::SimpleString(Bytes::from_static(b"OK"))));
}

#[test]
fn encode_then_decode_round_trips_a_mixed_aggregate() {
    let config = Config::new(RespVersion::V3);
    let value = Value::Map(MapData::Pairs(vec![
        (bulk(b"a"), Value::Array(vec![Value::Integer(1), Value::Boolean(true)])),
        (bulk(b"b"), Value::Set(vec![bulk(b"x"), bulk(b"y")])),
    ]));
    let bytes = encode(&value, &config).unwrap();
    let mut d = Decoder::new(config);
    d.feed(&bytes).unwrap();
    assert_eq!(d.next_value(), Decoded::Value(value));
}
