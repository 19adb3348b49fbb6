//! # Decoder
//!
//! The incremental, restartable RESP parser described in §4.3 of the
//! specification.
//!
//! The decoder runs in two layers. The outer layer (`feed`) walks the wire
//! bytes exactly once each, turning every complete frame it sees into a
//! "leaf" or "aggregate header" [`Event`] and pushing it onto a flat queue -
//! this is the only layer that ever touches [`crate::buffer::Buffer`]. The
//! inner layer (`next_value`) assembles those events into [`Value`]s,
//! recursing into nested aggregates as needed.
//!
//! Splitting parsing this way is what makes restart across arbitrary feed
//! boundaries cheap: `feed` never needs to unwind a partially read frame; it
//! simply stops advancing the moment a line or a fixed-length payload isn't
//! fully buffered yet; `Buffer::readline`/`Buffer::read` already guarantee
//! the buffer is left untouched when that happens.
//!
//! Assembly restart is the harder half, because an aggregate (`Array`,
//! `Map`, ...) can span more leaf events than have arrived so far, so
//! assembling it can fail partway through after already having consumed some
//! of its children. This decoder resolves that with an event-stream +
//! backup-stack strategy: every event popped off the front of the queue
//! during assembly is also pushed onto a backup stack; if assembly runs out
//! of events, the backup stack is replayed back onto the front of the queue
//! in its original order and the whole attempt is retried from scratch the
//! next time the caller calls `next_value`. This is the same approach
//! `sioresp.Connection` uses (`_events` / `_events_backup`), chosen over the
//! snapshot-restore alternative because it requires no cloning of the
//! decoder's state to attempt a parse.

use crate::buffer::Buffer;
use crate::config::{Config, MapShape};
use crate::errors::ProtocolError;
use crate::value::{MapData, Value};
use bytes::Bytes;
use log::{trace, warn};
use std::collections::{HashMap, VecDeque};

const RESP3_ONLY_TYPES: &[u8] = &[
    b'_', b',', b'#', b'(', b'!', b'=', b'%', b'~', b'|', b'>',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    BulkString,
    BlobError,
    VerbatimString,
}

#[derive(Debug, Clone, PartialEq)]
enum ParserState {
    AwaitType,
    ReadBody(BodyKind, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggregateKind {
    Array,
    Set,
    Map,
    Attribute,
    Push,
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Leaf(Value),
    Aggregate(AggregateKind, usize),
}

/// The result of asking the decoder for the next fully assembled value.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Value(Value),
    /// Not enough bytes have been fed yet to assemble a complete value.
    Insufficient,
}

/// A sans-I/O RESP decoder. Feed it bytes as they arrive; pull values back
/// out independently of how those bytes were chunked on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoder {
    config: Config,
    buffer: Buffer,
    state: ParserState,
    events: VecDeque<Event>,
    backup: Vec<Event>,
}

impl Decoder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            buffer: Buffer::new(),
            state: ParserState::AwaitType,
            events: VecDeque::new(),
            backup: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Appends bytes and eagerly parses as many frames as are fully
    /// available, turning them into queued events.
    ///
    /// Returns as soon as the stream is proven invalid; per §7, the stream
    /// is then unusable until [`Decoder::reset`].
    pub fn feed(&mut self, data: &[u8]) -> Result<(), ProtocolError> {
        self.buffer.append(data);
        trace!(
            "fed {} bytes, {} bytes now buffered",
            data.len(),
            self.buffer.len()
        );
        let result = self.drain_transitions();
        if let Err(ref e) = result {
            warn!("protocol error while decoding: {e}");
        }
        result
    }

    /// Pops the next fully assembled value, if one is available.
    ///
    /// A single call consumes exactly the events that went into the value
    /// it returns (or none at all, on [`Decoded::Insufficient`]) - partial
    /// assembly attempts never leak into the queue.
    pub fn next_value(&mut self) -> Decoded {
        match self.next_element() {
            Some(value) => {
                self.backup.clear();
                Decoded::Value(value)
            }
            None => {
                while let Some(event) = self.backup.pop() {
                    self.events.push_front(event);
                }
                Decoded::Insufficient
            }
        }
    }

    /// Discards all buffered bytes and parser state, including any
    /// partially assembled frame. Idempotent.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.events.clear();
        self.backup.clear();
        self.state = ParserState::AwaitType;
    }

    fn drain_transitions(&mut self) -> Result<(), ProtocolError> {
        loop {
            let state = self.state.clone();
            match state {
                ParserState::AwaitType => {
                    let Some(first) = self.buffer.peek_first_byte() else {
                        break;
                    };
                    self.validate_type_byte(first)?;
                    if !self.step_await_type(first)? {
                        break;
                    }
                }
                ParserState::ReadBody(kind, n) => {
                    if !self.step_read_body(kind, n)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_type_byte(&self, byte: u8) -> Result<(), ProtocolError> {
        match byte {
            b'+' | b'-' | b':' | b'$' | b'*' => Ok(()),
            b if RESP3_ONLY_TYPES.contains(&b) => {
                if self.config.is_resp3() {
                    Ok(())
                } else {
                    Err(ProtocolError::Resp3TypeUnderResp2(b))
                }
            }
            other => Err(ProtocolError::UnsupportedType(other)),
        }
    }

    fn step_await_type(&mut self, first: u8) -> Result<bool, ProtocolError> {
        match first {
            b'+' => self.leaf_line(Value::SimpleString),
            b'-' => self.leaf_line(Value::SimpleError),
            b':' => self.integer_line(),
            b'(' => self.leaf_line(Value::BigNumber),
            b'_' => self.null_line(),
            b',' => self.double_line(),
            b'#' => self.boolean_line(),
            b'$' => self.length_then_body(BodyKind::BulkString),
            b'!' => self.length_then_body(BodyKind::BlobError),
            b'=' => self.length_then_body(BodyKind::VerbatimString),
            b'*' => self.aggregate_header(AggregateKind::Array),
            b'%' => self.aggregate_header(AggregateKind::Map),
            b'~' => self.aggregate_header(AggregateKind::Set),
            b'|' => self.aggregate_header(AggregateKind::Attribute),
            b'>' => self.aggregate_header(AggregateKind::Push),
            other => unreachable!("validate_type_byte let an unknown byte {other:#04x} through"),
        }
    }

    fn leaf_line(&mut self, make: impl FnOnce(Bytes) -> Value) -> Result<bool, ProtocolError> {
        let Some(line) = self.buffer.readline() else {
            return Ok(false);
        };
        let payload = line.slice(1..);
        self.push_leaf(make(payload));
        Ok(true)
    }

    fn integer_line(&mut self) -> Result<bool, ProtocolError> {
        let Some(line) = self.buffer.readline() else {
            return Ok(false);
        };
        let value = parse_signed_i64(&line[1..])?;
        self.push_leaf(Value::Integer(value));
        Ok(true)
    }

    fn null_line(&mut self) -> Result<bool, ProtocolError> {
        let Some(line) = self.buffer.readline() else {
            return Ok(false);
        };
        if line.len() != 1 {
            return Err(ProtocolError::NullWithPayload);
        }
        self.push_leaf(Value::Null);
        Ok(true)
    }

    fn double_line(&mut self) -> Result<bool, ProtocolError> {
        let Some(line) = self.buffer.readline() else {
            return Ok(false);
        };
        let payload = &line[1..];
        let text = std::str::from_utf8(payload)
            .map_err(|_| ProtocolError::InvalidDouble(String::from_utf8_lossy(payload).into_owned()))?;
        let value: f64 = text
            .parse()
            .map_err(|_| ProtocolError::InvalidDouble(text.to_string()))?;
        self.push_leaf(Value::Double(value));
        Ok(true)
    }

    fn boolean_line(&mut self) -> Result<bool, ProtocolError> {
        let Some(line) = self.buffer.readline() else {
            return Ok(false);
        };
        let value = match &line[1..] {
            b"t" => true,
            b"f" => false,
            _ => return Err(ProtocolError::InvalidBoolean),
        };
        self.push_leaf(Value::Boolean(value));
        Ok(true)
    }

    fn length_then_body(&mut self, kind: BodyKind) -> Result<bool, ProtocolError> {
        let Some(line) = self.buffer.readline() else {
            return Ok(false);
        };
        let payload = &line[1..];
        let len = parse_length(payload)?;
        if len < 0 {
            if kind == BodyKind::BulkString {
                self.push_leaf(Value::NullBulkString);
                return Ok(true);
            }
            return Err(ProtocolError::InvalidLength(
                String::from_utf8_lossy(payload).into_owned(),
            ));
        }
        self.state = ParserState::ReadBody(kind, len as usize);
        Ok(true)
    }

    fn step_read_body(&mut self, kind: BodyKind, n: usize) -> Result<bool, ProtocolError> {
        if self.buffer.len() < n + 2 {
            return Ok(false);
        }
        let body = self.buffer.read(n).expect("length checked above");
        let crlf = self.buffer.read(2).expect("length checked above");
        if &crlf[..] != b"\r\n" {
            return Err(ProtocolError::CRLFMissing);
        }
        let value = match kind {
            BodyKind::BulkString => Value::BulkString(body),
            BodyKind::BlobError => Value::BlobError(body),
            BodyKind::VerbatimString => {
                if body.len() < 4 || body[3] != b':' {
                    return Err(ProtocolError::MissingVerbatimTag);
                }
                let mut format = [0u8; 3];
                format.copy_from_slice(&body[..3]);
                Value::VerbatimString {
                    format,
                    data: body.slice(4..),
                }
            }
        };
        self.push_leaf(value);
        self.state = ParserState::AwaitType;
        Ok(true)
    }

    fn aggregate_header(&mut self, kind: AggregateKind) -> Result<bool, ProtocolError> {
        let Some(line) = self.buffer.readline() else {
            return Ok(false);
        };
        let payload = &line[1..];
        let len = parse_length(payload)?;
        if len < 0 {
            let leaf = match kind {
                AggregateKind::Array => Value::NullArray,
                AggregateKind::Set => Value::NullSet,
                AggregateKind::Push => Value::NullPush,
                AggregateKind::Map | AggregateKind::Attribute => {
                    return Err(ProtocolError::InvalidLength(
                        String::from_utf8_lossy(payload).into_owned(),
                    ));
                }
            };
            self.push_leaf(leaf);
            return Ok(true);
        }
        let children = match kind {
            AggregateKind::Map | AggregateKind::Attribute => (len as usize) * 2,
            _ => len as usize,
        };
        self.events.push_back(Event::Aggregate(kind, children));
        trace!("queued aggregate header kind={kind:?} children={children}");
        Ok(true)
    }

    fn push_leaf(&mut self, value: Value) {
        trace!("queued leaf event {value:?}");
        self.events.push_back(Event::Leaf(value));
    }

    fn next_element(&mut self) -> Option<Value> {
        let event = self.events.pop_front()?;
        self.backup.push(event.clone());
        match event {
            Event::Leaf(value) => Some(value),
            Event::Aggregate(kind, remaining) => self.next_aggregate(kind, remaining),
        }
    }

    fn next_aggregate(&mut self, kind: AggregateKind, remaining: usize) -> Option<Value> {
        match kind {
            AggregateKind::Array => Some(Value::Array(self.next_n_elements(remaining)?)),
            AggregateKind::Set => Some(Value::Set(self.next_n_elements(remaining)?)),
            AggregateKind::Push => Some(Value::Push(self.next_n_elements(remaining)?)),
            AggregateKind::Map => {
                let pairs = self.next_n_pairs(remaining / 2)?;
                Some(Value::Map(match self.config.map_shape() {
                    MapShape::Pairs => MapData::Pairs(pairs),
                    MapShape::Dict => MapData::Dict(pairs.into_iter().collect::<HashMap<_, _>>()),
                }))
            }
            AggregateKind::Attribute => Some(Value::Attribute(self.next_n_pairs(remaining / 2)?)),
        }
    }

    fn next_n_elements(&mut self, n: usize) -> Option<Vec<Value>> {
        let mut items = Vec::with_capacity(n);
        for _ in 0..n {
            items.push(self.next_element()?);
        }
        Some(items)
    }

    fn next_n_pairs(&mut self, n: usize) -> Option<Vec<(Value, Value)>> {
        let mut pairs = Vec::with_capacity(n);
        for _ in 0..n {
            let key = self.next_element()?;
            let value = self.next_element()?;
            pairs.push((key, value));
        }
        Some(pairs)
    }
}

fn parse_length(text: &[u8]) -> Result<i64, ProtocolError> {
    let s = std::str::from_utf8(text)
        .map_err(|_| ProtocolError::InvalidLength(String::from_utf8_lossy(text).into_owned()))?;
    s.parse::<i64>()
        .map_err(|_| ProtocolError::InvalidLength(s.to_string()))
}

fn parse_signed_i64(text: &[u8]) -> Result<i64, ProtocolError> {
    let s = std::str::from_utf8(text)
        .map_err(|_| ProtocolError::InvalidInteger(String::from_utf8_lossy(text).into_owned()))?;
    s.parse::<i64>().map_err(|_| {
        let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            ProtocolError::IntegerOverflow(s.to_string())
        } else {
            ProtocolError::InvalidInteger(s.to_string())
        }
    })
}
