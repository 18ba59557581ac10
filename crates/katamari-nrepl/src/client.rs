//! Request/response helpers on top of a [`WatchableConnection`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::bencode::Value;
use crate::connection::WatchableConnection;
use crate::criteria::Criteria;
use crate::error::NreplError;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// A fresh message id, unique within this process.
pub fn next_id() -> String {
    format!("katamari-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Everything the server reported for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalResult {
    /// Printed results, one per top-level form.
    pub values: Vec<String>,
    pub out: String,
    pub err: String,
    /// Exception class when evaluation threw.
    pub ex: Option<String>,
}

impl EvalResult {
    /// Output followed by every value, one per line.
    pub fn render(&self) -> String {
        let mut text = self.out.clone();
        for value in &self.values {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(value);
        }
        text
    }
}

/// Send `msg` under a fresh id and collect replies until `done`.
///
/// Every reply carrying the message's id is passed to `on_reply`.
pub fn request(
    conn: &WatchableConnection,
    mut msg: Value,
    timeout: Duration,
    mut on_reply: impl FnMut(&Value),
) -> Result<(), NreplError> {
    let id = next_id();
    if let Value::Dict(map) = &mut msg {
        map.insert(b"id".to_vec(), Value::from(id.as_str()));
    }

    let (tx, rx) = mpsc::channel();
    conn.watch(id.as_str(), Criteria::new().equals("id", id.as_str()), move |msg, _, _| {
        // The receiver is gone once the request has finished.
        let _ = tx.send(msg.clone());
    });

    let outcome = conn.send(&msg).and_then(|()| {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let reply = match rx.recv_timeout(remaining) {
                Ok(reply) => reply,
                Err(RecvTimeoutError::Timeout) => return Err(NreplError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => return Err(NreplError::Closed),
            };
            on_reply(&reply);
            if has_status(&reply, "done") {
                return Ok(());
            }
        }
    });
    conn.unwatch(&id);
    outcome
}

/// Evaluate `code` and gather its output, values and exception.
pub fn eval(
    conn: &WatchableConnection,
    code: &str,
    timeout: Duration,
) -> Result<EvalResult, NreplError> {
    let mut result = EvalResult::default();
    let msg = Value::dict([("op", "eval"), ("code", code)]);
    request(conn, msg, timeout, |reply| {
        if let Some(value) = reply.get("value").and_then(Value::as_str) {
            result.values.push(value.to_string());
        }
        if let Some(out) = reply.get("out").and_then(Value::as_str) {
            result.out.push_str(out);
        }
        if let Some(err) = reply.get("err").and_then(Value::as_str) {
            result.err.push_str(err);
        }
        if let Some(ex) = reply.get("ex").and_then(Value::as_str) {
            result.ex = Some(ex.to_string());
        }
    })?;
    Ok(result)
}

/// Whether the reply's `status` list contains `status`.
pub fn has_status(reply: &Value, status: &str) -> bool {
    reply
        .get("status")
        .and_then(Value::as_list)
        .is_some_and(|list| list.iter().any(|s| s.as_str() == Some(status)))
}
