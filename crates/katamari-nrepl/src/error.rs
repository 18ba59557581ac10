//! Error types for the nREPL client.

use std::io;
use std::time::Duration;

/// Errors raised while decoding bencode.
#[derive(Debug, thiserror::Error)]
pub enum BencodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unexpected byte {0:#04x}")]
    UnexpectedByte(u8),

    #[error("invalid integer: {0:?}")]
    InvalidInteger(String),

    #[error("invalid string length: {0:?}")]
    InvalidLength(String),

    #[error("dictionary key is not a byte string")]
    NonStringKey,

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0} trailing byte(s) after value")]
    TrailingBytes(usize),
}

/// Errors raised while connecting to or talking with an nREPL endpoint.
#[derive(Debug, thiserror::Error)]
pub enum NreplError {
    #[error("URI has no scheme: {0}")]
    MissingScheme(String),

    #[error("invalid URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}: missing host or port")]
    MissingAddress(String),

    #[error("no connector registered for scheme `{0}`")]
    NoConnector(String),

    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("protocol error: {0}")]
    Bencode(#[from] BencodeError),

    #[error("connection closed before the response completed")]
    Closed,

    #[error("no complete response within {0:?}")]
    Timeout(Duration),

    #[error("evaluation failed: {ex}")]
    Eval {
        /// Exception class reported by the server.
        ex: String,
        /// Anything the evaluation wrote to its error stream.
        err: String,
    },
}
