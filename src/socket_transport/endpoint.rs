//! Where the backend listens and how to reach it.

use std::{
    io::{self, Read, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    path::PathBuf,
    time::Duration,
};

use native_tls::{TlsConnector, TlsStream};

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// Backend address.
#[derive(Clone, Debug)]
pub enum SocketEndpoint {
    /// TCP, optionally wrapped in TLS.
    Tcp(TcpEndpoint),
    /// Unix domain socket.
    Unix(UnixEndpoint),
}

#[derive(Clone, Debug)]
pub struct TcpEndpoint {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsOptions>,
}

impl TcpEndpoint {
    fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map(|iter| iter.collect())
    }
}

#[derive(Clone, Debug)]
pub struct UnixEndpoint {
    pub path: PathBuf,
}

/// TLS connection options.
#[derive(Clone, Debug)]
pub struct TlsOptions {
    /// Domain name presented during the handshake.
    pub domain: String,
    /// Skip certificate validation (tests only).
    pub insecure_skip_verify: bool,
}

impl TlsOptions {
    fn connector(&self) -> io::Result<TlsConnector> {
        let mut builder = TlsConnector::builder();
        if self.insecure_skip_verify {
            builder.danger_accept_invalid_certs(true);
            builder.danger_accept_invalid_hostnames(true);
        }
        builder.build().map_err(io::Error::other)
    }
}

/// Open connection to the backend.
pub enum Connection {
    PlainTcp(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Connection {
    pub fn set_write_timeout(&self, timeout: Duration) -> io::Result<()> {
        match self {
            Connection::PlainTcp(stream) => stream.set_write_timeout(Some(timeout)),
            Connection::Tls(stream) => stream.get_ref().set_write_timeout(Some(timeout)),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.set_write_timeout(Some(timeout)),
        }
    }

    /// `None` blocks reads indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Connection::PlainTcp(stream) => stream.set_read_timeout(timeout),
            Connection::Tls(stream) => stream.get_ref().set_read_timeout(timeout),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.set_read_timeout(timeout),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::PlainTcp(stream) => stream.write(buf),
            Connection::Tls(stream) => stream.write(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::PlainTcp(stream) => stream.flush(),
            Connection::Tls(stream) => stream.flush(),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.flush(),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::PlainTcp(stream) => stream.read(buf),
            Connection::Tls(stream) => stream.read(buf),
            #[cfg(unix)]
            Connection::Unix(stream) => stream.read(buf),
        }
    }
}

fn connect_tcp(endpoint: &TcpEndpoint, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in endpoint.socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{}:{} resolved to no addresses", endpoint.host, endpoint.port),
        )
    }))
}

/// Connect to `endpoint`, bounding the TCP connect and TLS handshake by
/// `connect_timeout`.
pub fn connect(endpoint: &SocketEndpoint, connect_timeout: Duration) -> io::Result<Connection> {
    match endpoint {
        SocketEndpoint::Tcp(tcp) => {
            let stream = connect_tcp(tcp, connect_timeout)?;
            let Some(tls) = &tcp.tls else {
                return Ok(Connection::PlainTcp(stream));
            };
            let connector = tls.connector()?;
            stream.set_read_timeout(Some(connect_timeout))?;
            stream.set_write_timeout(Some(connect_timeout))?;
            let stream = connector
                .connect(&tls.domain, stream)
                .map_err(io::Error::other)?;
            stream.get_ref().set_read_timeout(None)?;
            stream.get_ref().set_write_timeout(None)?;
            Ok(Connection::Tls(Box::new(stream)))
        }
        SocketEndpoint::Unix(unix) => {
            #[cfg(unix)]
            {
                Ok(Connection::Unix(UnixStream::connect(&unix.path)?))
            }
            #[cfg(not(unix))]
            {
                let _ = (unix, connect_timeout);
                Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix domain sockets are not supported on this platform",
                ))
            }
        }
    }
}
