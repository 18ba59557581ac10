//! nREPL client for katamari.
//!
//! Messages are bencoded dictionaries ([`Value`]) carried by a
//! [`Transport`]. A [`WatchableConnection`] reads them on a background
//! thread and hands each one to the watches whose [`Matcher`] accepts it;
//! [`eval`] builds request/response on top of that. Endpoints are named by
//! URI and opened through a [`ConnectorRegistry`] keyed by scheme.

mod bencode;
mod client;
mod commands;
mod connect;
mod connection;
mod criteria;
mod error;
mod transport;

/// Bencode values and their codec.
pub use bencode::{Decoder, Value, decode, decode_all};
/// Request helpers and their result.
pub use client::{EvalResult, eval, has_status, next_id, request};
/// Shell commands that talk to nREPL servers.
pub use commands::{TIMEOUT_VAR, register_commands};
/// Scheme-keyed connectors.
pub use connect::{Connector, ConnectorRegistry, NREPL_SCHEME, TcpConnector};
/// Connection that routes messages to watches.
pub use connection::WatchableConnection;
/// Message filters.
pub use criteria::{Criteria, Expect, Matcher};
pub use error::{BencodeError, NreplError};
/// Bencode over a byte stream.
pub use transport::Transport;
