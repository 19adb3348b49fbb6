//! # A Sans-I/O Codec for the RESP (REdis Serialization Protocol) Wire Format
//!
//! This crate is a transport-agnostic parser/encoder pair for RESP2 and
//! RESP3. It knows nothing about sockets, connection pooling, pipelining
//! policy, or command semantics: a caller feeds it bytes as they arrive from
//! whatever transport it is driving, pulls decoded [`value::Value`]s back
//! out, and hands values to [`encoder::encode`] to get wire bytes to send.
//!
//! - [`buffer::Buffer`] - the FIFO byte queue both sides are built on.
//! - [`value::Value`] - the tagged union of RESP values.
//! - [`config::Config`] - the shared protocol-version / text-encoding / map-shape knobs.
//! - [`decoder::Decoder`] - the incremental, restartable parser.
//! - [`encoder`] - the total bytes-from-values serializer.
//! - [`errors`] - [`errors::ProtocolError`] (fatal framing violations) and
//!   [`errors::EncodeError`] (unrepresentable encodes).

pub mod buffer;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod errors;
#[macro_use]
pub mod macros;
pub mod value;
