//! Message transport: bencode over a byte stream.

use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::bencode::{Decoder, Value};
use crate::error::NreplError;

type Reader = Decoder<Box<dyn BufRead + Send>>;
type Writer = Box<dyn Write + Send>;
type OnClose = Box<dyn FnOnce() + Send>;

/// Sends and receives bencoded messages over a reader/writer pair.
pub struct Transport {
    reader: Reader,
    writer: Writer,
    on_close: Option<OnClose>,
}

impl Transport {
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        Self {
            reader: Decoder::new(Box::new(BufReader::new(reader))),
            writer: Box::new(writer),
            on_close: None,
        }
    }

    /// Transport over a connected socket. Closing shuts the socket down.
    pub fn tcp(stream: TcpStream) -> Result<Self, NreplError> {
        let reader = stream.try_clone()?;
        let closer = stream.try_clone()?;
        Ok(Self::new(reader, stream).on_close(move || {
            if let Err(e) = closer.shutdown(Shutdown::Both) {
                log::debug!("Socket shutdown failed: {e}");
            }
        }))
    }

    /// Run `f` when the transport is closed.
    pub fn on_close(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn send(&mut self, msg: &Value) -> Result<(), NreplError> {
        self.writer.write_all(&msg.encode())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Next message, or `None` once the peer has closed the stream.
    pub fn recv(&mut self) -> Result<Option<Value>, NreplError> {
        Ok(self.reader.read_value()?)
    }

    pub fn close(mut self) {
        if let Some(f) = self.on_close.take() {
            f();
        }
    }

    pub(crate) fn into_parts(self) -> (Reader, Writer, Option<OnClose>) {
        (self.reader, self.writer, self.on_close)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("closable", &self.on_close.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[test]
    fn recv_reads_successive_messages() {
        let mut t = Transport::new(Cursor::new(b"i1e1:x".to_vec()), Vec::new());
        assert_eq!(t.recv().unwrap(), Some(Value::Int(1)));
        assert_eq!(t.recv().unwrap(), Some(Value::from("x")));
        assert_eq!(t.recv().unwrap(), None);
    }

    #[test]
    fn on_close_runs_once_on_close() {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&closed);
        let t = Transport::new(Cursor::new(Vec::new()), Vec::new())
            .on_close(move || flag.store(true, Ordering::SeqCst));
        t.close();
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn tcp_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut t = Transport::tcp(stream).unwrap();
            let msg = t.recv().unwrap().unwrap();
            t.send(&Value::dict([("echo", msg)])).unwrap();
        });

        let mut client = Transport::tcp(TcpStream::connect(addr).unwrap()).unwrap();
        client.send(&Value::from("ping")).unwrap();
        let reply = client.recv().unwrap().unwrap();
        assert_eq!(reply.get("echo").and_then(Value::as_str), Some("ping"));
        client.close();
        server.join().unwrap();
    }
}
