//! # Transporte del Cliente
//! src/client/transport.rs
//!
//! Socket TCP propio del cliente, opcionalmente envuelto en TLS (rustls).
//! El handshake TLS es responsabilidad de rustls; aquí solo se pide un
//! stream cifrado cuando el esquema es `https`.

use crate::error::{Error, Result, Stage};
use crate::http::response::{parse_status_line, split_head_body};
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Tamaño del buffer de lectura
const READ_CHUNK: usize = 8192;

/// Límite del head de respuesta del proxy al `CONNECT`
const MAX_TUNNEL_HEAD: usize = 64 * 1024;

/// Conexión abierta, en texto plano o cifrada
#[derive(Debug)]
pub enum Connection {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

/// Resuelve `host` y conecta a la primera dirección que responda
///
/// `timeout` aplica al connect y queda configurado para lecturas y
/// escrituras; `None` bloquea sin límite.
pub fn connect_tcp(host: &str, port: u16, timeout: Option<Duration>) -> io::Result<TcpStream> {
    let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
    let mut last_error = None;

    for addr in addrs {
        let attempt = match timeout {
            Some(limit) => TcpStream::connect_timeout(&addr, limit),
            None => TcpStream::connect(addr),
        };

        match attempt {
            Ok(stream) => {
                stream.set_read_timeout(timeout)?;
                stream.set_write_timeout(timeout)?;
                debug!(addr = %addr, "tcp connected");
                return Ok(stream);
            }
            Err(e) => {
                debug!(addr = %addr, error = %e, "tcp connect attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} did not resolve to any address", host),
        )
    }))
}

/// Abre un túnel `CONNECT` en un socket ya conectado al proxy
///
/// Lee la respuesta del proxy byte a byte para no consumir datos del
/// handshake TLS que viene después.
pub fn open_tunnel(stream: &mut TcpStream, connect_request: &[u8]) -> Result<()> {
    stream
        .write_all(connect_request)
        .and_then(|_| stream.flush())
        .map_err(|e| Error::transport(Stage::Tunnel, e))?;

    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream
            .read(&mut byte)
            .map_err(|e| Error::transport(Stage::Tunnel, e))?;
        if n == 0 {
            return Err(Error::transport(
                Stage::Tunnel,
                io::Error::new(io::ErrorKind::UnexpectedEof, "proxy closed during CONNECT"),
            ));
        }
        head.push(byte[0]);
        if head.ends_with(b"\r\n\r\n") || head.ends_with(b"\n\n") {
            break;
        }
        if head.len() > MAX_TUNNEL_HEAD {
            return Err(Error::Protocol("proxy CONNECT response too large".to_string()));
        }
    }

    let (head, _) = split_head_body(&head);
    let head = String::from_utf8_lossy(head);
    let status_line = head.lines().next().unwrap_or("");
    let status = parse_status_line(status_line)?;

    if !status.is_success() {
        return Err(Error::transport(
            Stage::Tunnel,
            io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("proxy refused tunnel: {}", status),
            ),
        ));
    }

    debug!(status = status.as_u16(), "proxy tunnel established");
    Ok(())
}

/// Configuración TLS con las raíces de confianza de webpki
fn tls_config() -> std::result::Result<Arc<ClientConfig>, rustls::Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Arc::new(config))
}

impl Connection {
    /// Envuelve el socket en TLS y completa el handshake
    ///
    /// El handshake se hace aquí para que sus errores salgan de `connect()`
    /// y no del primer `write()`.
    pub fn tls(stream: TcpStream, host: &str) -> io::Result<Self> {
        let config = tls_config().map_err(io::Error::other)?;
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let conn = ClientConnection::new(config, server_name).map_err(io::Error::other)?;

        let mut tls = StreamOwned::new(conn, stream);
        while tls.conn.is_handshaking() {
            tls.conn.complete_io(&mut tls.sock)?;
        }

        debug!(host = %host, "tls handshake complete");
        Ok(Connection::Tls(Box::new(tls)))
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Connection::Tls(_))
    }

    /// Lee hasta fin de stream
    ///
    /// No usa `Content-Length`: depende de `Connection: Close`. Un peer TLS
    /// que corta sin `close_notify` después de mandar datos cuenta como EOF.
    pub fn read_to_eof(&mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut buffer = [0u8; READ_CHUNK];

        loop {
            match self.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => data.extend_from_slice(&buffer[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if e.kind() == io::ErrorKind::UnexpectedEof
                        && self.is_secure()
                        && !data.is_empty() =>
                {
                    debug!("peer closed without close_notify");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(data)
    }

    /// Cierra la conexión; los errores de cierre se ignoran
    pub fn shutdown(&mut self) {
        match self {
            Connection::Plain(stream) => {
                let _ = stream.shutdown(Shutdown::Both);
            }
            Connection::Tls(tls) => {
                tls.conn.send_close_notify();
                let _ = tls.flush();
                let _ = tls.sock.shutdown(Shutdown::Both);
            }
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(stream) => stream.read(buf),
            Connection::Tls(tls) => tls.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Connection::Plain(stream) => stream.write(buf),
            Connection::Tls(tls) => tls.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Connection::Plain(stream) => stream.flush(),
            Connection::Tls(tls) => tls.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    #[test]
    fn test_connect_and_read_to_eof() {
        let listener = ephemeral_listener();
        let port = listener.local_addr().unwrap().port();

        let t = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"first ").unwrap();
            stream.write_all(b"second").unwrap();
        });

        let stream = connect_tcp("127.0.0.1", port, Some(Duration::from_secs(5))).unwrap();
        let mut connection = Connection::Plain(stream);
        assert!(!connection.is_secure());

        let data = connection.read_to_eof().unwrap();
        assert_eq!(data, b"first second");

        connection.shutdown();
        t.join().unwrap();
    }

    #[test]
    fn test_connect_refused() {
        // Puerto que quedó libre al soltar el listener
        let port = {
            let listener = ephemeral_listener();
            listener.local_addr().unwrap().port()
        };

        let result = connect_tcp("127.0.0.1", port, Some(Duration::from_secs(2)));
        assert!(result.is_err());
    }

    #[test]
    fn test_tunnel_accepted() {
        let listener = ephemeral_listener();
        let port = listener.local_addr().unwrap().port();

        let t = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let n = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            stream
                .write_all(b"HTTP/1.1 200 Connection established\r\n\r\nTLS-BYTES")
                .unwrap();
            request
        });

        let mut stream = connect_tcp("127.0.0.1", port, Some(Duration::from_secs(5))).unwrap();
        open_tunnel(&mut stream, b"CONNECT example.com:443 HTTP/1.1\r\n\r\n").unwrap();

        // Lo que sigue al head queda sin consumir
        let mut rest = Vec::new();
        stream.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"TLS-BYTES");

        let request = t.join().unwrap();
        assert!(request.starts_with("CONNECT example.com:443"));
    }

    #[test]
    fn test_tunnel_refused() {
        let listener = ephemeral_listener();
        let port = listener.local_addr().unwrap().port();

        let t = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).unwrap();
            stream
                .write_all(b"HTTP/1.1 407 Proxy Authentication Required\r\n\r\n")
                .unwrap();
        });

        let mut stream = connect_tcp("127.0.0.1", port, Some(Duration::from_secs(5))).unwrap();
        let result = open_tunnel(&mut stream, b"CONNECT example.com:443 HTTP/1.1\r\n\r\n");
        assert!(matches!(
            result,
            Err(Error::Transport { stage: Stage::Tunnel, .. })
        ));

        t.join().unwrap();
    }
}
