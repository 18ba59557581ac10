//! Connectors keyed by URI scheme.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use katamari_dispatch::NameTable;
use katamari_types::{CommandName, NameMatch, RegistryError};
use url::Url;

use crate::error::NreplError;
use crate::transport::Transport;

/// Scheme served by [`TcpConnector`] in [`ConnectorRegistry::with_defaults`].
pub const NREPL_SCHEME: &str = "nrepl";

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens a transport to the endpoint a URI names.
pub trait Connector: Send + Sync {
    fn connect(&self, uri: &Url) -> Result<Transport, NreplError>;
}

impl<F> Connector for F
where
    F: Fn(&Url) -> Result<Transport, NreplError> + Send + Sync,
{
    fn connect(&self, uri: &Url) -> Result<Transport, NreplError> {
        self(uri)
    }
}

/// Bencode over TCP to the URI's `host:port`.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnector {
    pub connect_timeout: Duration,
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

impl Connector for TcpConnector {
    fn connect(&self, uri: &Url) -> Result<Transport, NreplError> {
        let (Some(host), Some(port)) = (uri.host_str(), uri.port()) else {
            return Err(NreplError::MissingAddress(uri.to_string()));
        };
        let target = format!("{host}:{port}");
        let connect_err = |source| NreplError::Connect {
            addr: target.clone(),
            source,
        };

        let addr = target
            .to_socket_addrs()
            .map_err(connect_err)?
            .next()
            .ok_or_else(|| connect_err(io::Error::new(io::ErrorKind::NotFound, "no addresses")))?;
        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout).map_err(connect_err)?;
        log::info!("Connected to {target}");
        Transport::tcp(stream)
    }
}

/// Connectors by URI scheme, matched case-insensitively.
///
/// Other transports (HTTP, message queues) plug in by registering a
/// connector for their scheme.
#[derive(Debug, Clone)]
pub struct ConnectorRegistry {
    table: NameTable<dyn Connector>,
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            table: NameTable::with_policy(NameMatch::CaseInsensitive),
        }
    }

    /// A registry serving `nrepl://host:port` over TCP.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(&[NREPL_SCHEME], TcpConnector::default())?;
        Ok(registry)
    }

    /// Register `connector` for every scheme in `schemes`.
    ///
    /// Atomic: on `DuplicateName` or `InvalidName` nothing is registered.
    pub fn register(
        &mut self,
        schemes: &[&str],
        connector: impl Connector + 'static,
    ) -> Result<(), RegistryError> {
        for scheme in schemes {
            CommandName::new(scheme)?;
        }
        let connector: Arc<dyn Connector> = Arc::new(connector);
        self.table.insert(schemes.iter().copied(), connector)?;
        log::debug!("Registered connector for {}", schemes.join(", "));
        Ok(())
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.table.contains(scheme)
    }

    /// Primary schemes in registration order.
    pub fn schemes(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.table.names()
    }

    /// Connect to `uri` with the connector registered for its scheme.
    pub fn connect(&self, uri: &str) -> Result<Transport, NreplError> {
        let parsed = Url::parse(uri).map_err(|source| match source {
            url::ParseError::RelativeUrlWithoutBase => NreplError::MissingScheme(uri.to_string()),
            source => NreplError::InvalidUri {
                uri: uri.to_string(),
                source,
            },
        })?;
        let scheme = parsed.scheme();
        let connector = self
            .table
            .get(scheme)
            .ok_or_else(|| NreplError::NoConnector(scheme.to_string()))?;
        log::debug!("Connecting to {uri}");
        connector.connect(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::net::TcpListener;

    use super::*;
    use crate::bencode::Value;

    fn canned(_: &Url) -> Result<Transport, NreplError> {
        Ok(Transport::new(Cursor::new(b"4:mock".to_vec()), Vec::new()))
    }

    #[test]
    fn unknown_scheme() {
        let registry = ConnectorRegistry::with_defaults().unwrap();
        let err = registry.connect("telnet://localhost:5000").unwrap_err();
        assert!(matches!(err, NreplError::NoConnector(ref s) if s == "telnet"));
        assert_eq!(
            format!("{err}"),
            "no connector registered for scheme `telnet`"
        );
    }

    #[test]
    fn missing_scheme() {
        let registry = ConnectorRegistry::with_defaults().unwrap();
        assert!(matches!(
            registry.connect("/just/a/path"),
            Err(NreplError::MissingScheme(_))
        ));
    }

    #[test]
    fn invalid_uri() {
        let registry = ConnectorRegistry::with_defaults().unwrap();
        assert!(matches!(
            registry.connect("nrepl://[::1"),
            Err(NreplError::InvalidUri { .. })
        ));
    }

    #[test]
    fn scheme_lookup_ignores_case() {
        let mut registry = ConnectorRegistry::new();
        registry.register(&["Mock"], canned).unwrap();
        let mut t = registry.connect("MOCK://anywhere").unwrap();
        assert_eq!(t.recv().unwrap(), Some(Value::from("mock")));
        assert!(registry.contains("mock"));
        assert_eq!(registry.schemes().collect::<Vec<_>>(), vec!["Mock"]);
    }

    #[test]
    fn aliases_share_a_connector() {
        let mut registry = ConnectorRegistry::new();
        registry.register(&["http", "https"], canned).unwrap();
        assert!(registry.connect("https://example.invalid/repl").is_ok());
        assert_eq!(registry.schemes().len(), 1);
    }

    #[test]
    fn duplicate_scheme_rejected_atomically() {
        let mut registry = ConnectorRegistry::with_defaults().unwrap();
        let err = registry.register(&["mock", "NREPL"], canned).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { .. }));
        assert!(!registry.contains("mock"));
    }

    #[test]
    fn invalid_scheme_rejected() {
        let mut registry = ConnectorRegistry::new();
        assert!(matches!(
            registry.register(&["two words"], canned),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(matches!(
            registry.register(&[], canned),
            Err(RegistryError::InvalidName(_))
        ));
    }

    #[test]
    fn tcp_connector_needs_port() {
        let registry = ConnectorRegistry::with_defaults().unwrap();
        assert!(matches!(
            registry.connect("nrepl://localhost"),
            Err(NreplError::MissingAddress(_))
        ));
    }

    #[test]
    fn tcp_connector_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut t = Transport::tcp(stream).unwrap();
            t.send(&Value::from("hello")).unwrap();
        });

        let registry = ConnectorRegistry::with_defaults().unwrap();
        let mut t = registry
            .connect(&format!("nREPL://127.0.0.1:{port}"))
            .unwrap();
        assert_eq!(t.recv().unwrap(), Some(Value::from("hello")));
        server.join().unwrap();
    }

    #[test]
    fn refused_connection_reports_address() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let registry = ConnectorRegistry::with_defaults().unwrap();
        let err = registry
            .connect(&format!("nrepl://127.0.0.1:{port}"))
            .unwrap_err();
        assert!(matches!(err, NreplError::Connect { ref addr, .. } if addr.ends_with(&port.to_string())));
    }
}
