//! Connection that routes incoming messages to keyed watches.

use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use crate::bencode::{Decoder, Value};
use crate::criteria::Matcher;
use crate::error::NreplError;
use crate::transport::Transport;

type Callback = dyn Fn(&Value, &WatchableConnection, &str) + Send + Sync;

#[derive(Clone)]
struct Watch {
    matcher: Arc<dyn Matcher>,
    callback: Arc<Callback>,
}

struct Shared {
    writer: Mutex<Box<dyn Write + Send>>,
    watches: Mutex<HashMap<String, Watch>>,
    on_close: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

/// A connection whose incoming messages are delivered to watches.
///
/// A background thread reads every message and hands it to each watch whose
/// matcher accepts it. Callbacks run on that thread and receive the message,
/// the connection (so they can reply or unwatch) and their own key. Cloning
/// is cheap and every clone shares the same connection; the reader thread
/// runs until [`close`](Self::close) or until the peer hangs up.
#[derive(Clone)]
pub struct WatchableConnection {
    shared: Arc<Shared>,
}

impl WatchableConnection {
    /// Take over `transport` and start reading from it.
    pub fn new(transport: Transport) -> Result<Self, NreplError> {
        let (reader, writer, on_close) = transport.into_parts();
        let conn = Self {
            shared: Arc::new(Shared {
                writer: Mutex::new(writer),
                watches: Mutex::new(HashMap::new()),
                on_close: Mutex::new(on_close),
            }),
        };
        let monitor = conn.clone();
        let _monitor = thread::Builder::new()
            .name("nrepl-monitor".to_string())
            .spawn(move || monitor.monitor(reader))?;
        Ok(conn)
    }

    pub fn send(&self, msg: &Value) -> Result<(), NreplError> {
        let mut writer = lock(&self.shared.writer);
        writer.write_all(&msg.encode())?;
        writer.flush()?;
        Ok(())
    }

    /// Register (or replace) the watch under `key`.
    pub fn watch<M, F>(&self, key: impl Into<String>, matcher: M, callback: F)
    where
        M: Matcher + 'static,
        F: Fn(&Value, &WatchableConnection, &str) + Send + Sync + 'static,
    {
        let watch = Watch {
            matcher: Arc::new(matcher),
            callback: Arc::new(callback),
        };
        lock(&self.shared.watches).insert(key.into(), watch);
    }

    /// Remove the watch under `key`. Returns whether one was registered.
    pub fn unwatch(&self, key: &str) -> bool {
        lock(&self.shared.watches).remove(key).is_some()
    }

    pub fn watch_count(&self) -> usize {
        lock(&self.shared.watches).len()
    }

    /// Close the underlying transport. Later calls do nothing.
    pub fn close(&self) {
        let on_close = lock(&self.shared.on_close).take();
        if let Some(f) = on_close {
            log::debug!("Closing nREPL connection");
            f();
        }
    }

    fn monitor<R: BufRead>(self, mut reader: Decoder<R>) {
        loop {
            match reader.read_value() {
                Ok(Some(msg)) => self.deliver(&msg),
                Ok(None) => {
                    log::debug!("nREPL peer closed the connection");
                    break;
                },
                Err(e) => {
                    log::warn!("nREPL read failed: {e}");
                    break;
                },
            }
        }
        // Dropping the callbacks tells anyone waiting on them that nothing
        // more will arrive.
        lock(&self.shared.watches).clear();
    }

    fn deliver(&self, msg: &Value) {
        // Callbacks may watch or unwatch, so run them on a snapshot.
        let watches: Vec<(String, Watch)> = lock(&self.shared.watches)
            .iter()
            .map(|(key, watch)| (key.clone(), watch.clone()))
            .collect();
        for (key, watch) in &watches {
            if watch.matcher.matches(msg) {
                (watch.callback)(msg, self, key);
            }
        }
    }
}

impl fmt::Debug for WatchableConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchableConnection")
            .field("watches", &self.watch_count())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
