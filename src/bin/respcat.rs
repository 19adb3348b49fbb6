//! # respcat
//!
//! Feeds a file (or stdin) full of RESP-encoded bytes through the codec and
//! prints each decoded value, one per line.
//!
//! This is the closest in-scope analogue to the donor crate's server entry
//! point (`main.rs`, which bound a `TcpListener` and drove `Server::start`):
//! there is no socket here, no connection, nothing to dispatch - just the
//! codec, run end to end against whatever bytes are handed to it. `--chunk-size`
//! exists to make feed-split independence (P2 in the spec) directly
//! observable instead of only covered by the test suite.

use anyhow::{Context, Result};
use clap::Parser;
use resp_codec::config::{Config, ErrorPolicy, RespVersion};
use resp_codec::decoder::{Decoded, Decoder};
use resp_codec::log_and_stderr;
use resp_codec::value::Value;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Decode a RESP byte stream and print the values it contains.
#[derive(Debug, Parser)]
#[command(name = "respcat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to read RESP bytes from; reads stdin when omitted.
    file: Option<PathBuf>,

    /// Decode as RESP3 instead of the RESP2 default.
    #[arg(long)]
    resp3: bool,

    /// Decode Map frames into a host mapping instead of an ordered pair list.
    #[arg(long)]
    dict_for_map: bool,

    /// How to handle invalid text sequences when printing.
    #[arg(long, value_enum, default_value_t = ErrorsArg::Strict)]
    errors: ErrorsArg,

    /// Feed the whole input in one call instead of simulating fragmentation.
    #[arg(long)]
    whole: bool,

    /// Chunk size, in bytes, used to simulate arbitrary transport splits.
    #[arg(long, default_value_t = 4)]
    chunk_size: usize,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ErrorsArg {
    Strict,
    Replace,
    Ignore,
}

impl From<ErrorsArg> for ErrorPolicy {
    fn from(value: ErrorsArg) -> Self {
        match value {
            ErrorsArg::Strict => ErrorPolicy::Strict,
            ErrorsArg::Replace => ErrorPolicy::Replace,
            ErrorsArg::Ignore => ErrorPolicy::Ignore,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let input = read_input(&args)?;

    let config = Config {
        resp_version: if args.resp3 { RespVersion::V3 } else { RespVersion::V2 },
        errors: args.errors.into(),
        dict_for_map: args.dict_for_map,
        ..Config::default()
    };
    let mut decoder = Decoder::new(config);

    let chunk_size = if args.whole {
        input.len().max(1)
    } else {
        args.chunk_size.max(1)
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for chunk in input.chunks(chunk_size) {
        if let Err(e) = decoder.feed(chunk) {
            log_and_stderr!(error, "protocol error:", e);
            std::process::exit(1);
        }
        drain(&mut decoder, &mut out)?;
    }

    Ok(())
}

fn drain(decoder: &mut Decoder, out: &mut impl Write) -> Result<()> {
    loop {
        match decoder.next_value() {
            Decoded::Value(value) => writeln!(out, "{}", describe(&value))?,
            Decoded::Insufficient => break,
        }
    }
    Ok(())
}

fn describe(value: &Value) -> String {
    format!("{value:?}")
}

fn read_input(args: &Args) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match &args.file {
        Some(path) => {
            std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?
                .read_to_end(&mut buf)?;
        }
        None => {
            std::io::stdin().read_to_end(&mut buf)?;
        }
    }
    Ok(buf)
}
