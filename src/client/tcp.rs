//! # Cliente HTTP sobre TCP
//! src/client/tcp.rs
//!
//! Ciclo de vida de un request: configurar → `connect()` → `write()` →
//! `read()` → consultar la respuesta. Una instancia atiende un solo request
//! lógico; el socket se libera al terminar `read()`, en `close()` o al
//! descartar el cliente.

use super::transport::{self, Connection};
use crate::error::{Error, Result, Stage};
use crate::http::{Method, ProxyConfig, Request, Response, StatusCode, Target, Version};
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Timeout por defecto para connect / read / write
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cliente HTTP/1.x de un solo request
///
/// # Ejemplo
///
/// ```no_run
/// use http_client::HttpClient;
///
/// let mut client = HttpClient::new("http://example.com/search").unwrap();
/// client.add_get("q", "rust sockets");
/// client.send().unwrap();
///
/// println!("{}", client.status().unwrap());
/// println!("{}", client.content_string());
/// ```
#[derive(Debug)]
pub struct HttpClient {
    request: Request,
    timeout: Duration,
    connection: Option<Connection>,
    response: Option<Response>,
}

impl HttpClient {
    /// Crea un cliente para la URL dada
    ///
    /// # Errores
    ///
    /// `Error::MalformedUrl` si la URL no tiene esquema http/https y host.
    pub fn new(url: &str) -> Result<Self> {
        let target = Target::parse(url)?;
        Ok(Self {
            request: Request::new(target),
            timeout: DEFAULT_TIMEOUT,
            connection: None,
            response: None,
        })
    }

    // === Configuración ===

    pub fn set_method(&mut self, method: Method) {
        self.request.set_method(method);
    }

    pub fn set_protocol(&mut self, version: Version) {
        self.request.set_version(version);
    }

    /// Timeout de connect / read / write; `Duration::ZERO` desactiva el límite
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Enruta la conexión por un proxy (`None` conecta directo)
    pub fn set_proxy(&mut self, proxy: Option<ProxyConfig>) {
        self.request.set_proxy(proxy);
    }

    /// Credenciales para `Authorization: Basic`
    pub fn set_credentials(&mut self, user: &str, password: &str) {
        self.request.set_credentials(user, password);
    }

    pub fn set_cookie(&mut self, cookie: Option<&str>) {
        self.request.set_cookie(cookie);
    }

    pub fn set_get(&mut self, query: Option<&str>) {
        self.request.set_get(query);
    }

    pub fn set_post(&mut self, body: Option<&str>) {
        self.request.set_post(body);
    }

    pub fn add_get(&mut self, key: &str, value: &str) {
        self.request.add_get(key, value);
    }

    pub fn add_get_pair(&mut self, pair: &str) {
        self.request.add_get_pair(pair);
    }

    /// Agrega un campo al body y cambia el método a POST
    pub fn add_post(&mut self, key: &str, value: &str) {
        self.request.add_post(key, value);
    }

    pub fn add_post_pair(&mut self, pair: &str) {
        self.request.add_post_pair(pair);
    }

    /// Agrega un header extra (rechaza CR/LF)
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        self.request.add_header(name, value)
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn target(&self) -> &Target {
        self.request.target()
    }

    /// Bytes exactos que `write()` enviaría
    pub fn request_bytes(&self) -> Vec<u8> {
        self.request.to_bytes()
    }

    fn io_timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }

    // === Ciclo de vida ===

    /// Abre la conexión al destino (o al proxy)
    ///
    /// El puerto por defecto (80 / 443) se deriva del esquema si la URL no
    /// trae uno. Con `https` la conexión queda cifrada; con `https` y proxy
    /// se abre primero un túnel `CONNECT`.
    ///
    /// # Errores
    ///
    /// `Error::Transport` con la etapa y el error del sistema.
    pub fn connect(&mut self) -> Result<()> {
        self.close();
        self.response = None;

        let target = self.request.target();
        let (host, port) = match self.request.proxy() {
            Some(proxy) => (proxy.host.clone(), proxy.port),
            None => (target.host.clone(), target.effective_port()),
        };

        info!(host = %host, port = port, secure = target.scheme.is_secure(), "connecting");

        let mut stream = transport::connect_tcp(&host, port, self.io_timeout())
            .map_err(|e| Error::transport(Stage::Connect, e))?;

        if self.request.uses_tunnel() {
            transport::open_tunnel(&mut stream, &self.request.tunnel_bytes())?;
        }

        let connection = if target.scheme.is_secure() {
            Connection::tls(stream, &target.host).map_err(|e| Error::transport(Stage::Connect, e))?
        } else {
            Connection::Plain(stream)
        };

        self.connection = Some(connection);
        Ok(())
    }

    /// Envía el request completo en una sola escritura (sin reintentos)
    pub fn write(&mut self) -> Result<()> {
        let bytes = self.request.to_bytes();
        let connection = self.connection.as_mut().ok_or(Error::NotConnected)?;

        debug!(
            method = self.request.method().as_str(),
            target = %self.request.request_target(),
            bytes = bytes.len(),
            "writing request"
        );

        connection
            .write_all(&bytes)
            .and_then(|_| connection.flush())
            .map_err(|e| Error::transport(Stage::Write, e))
    }

    /// Lee la respuesta hasta fin de stream y la parsea
    ///
    /// La conexión se cierra siempre, con o sin error. Si el parsing o la
    /// descompresión fallan no queda respuesta guardada.
    pub fn read(&mut self) -> Result<()> {
        let mut connection = self.connection.take().ok_or(Error::NotConnected)?;
        let raw = connection.read_to_eof();
        connection.shutdown();

        let raw = raw.map_err(|e| Error::transport(Stage::Read, e))?;
        debug!(bytes = raw.len(), "response received");

        let response = Response::parse(&raw)?;
        info!(status = response.status().as_u16(), "response parsed");

        self.response = Some(response);
        Ok(())
    }

    /// `connect()` + `write()` + `read()`
    pub fn send(&mut self) -> Result<()> {
        self.connect()?;
        self.write()?;
        self.read()
    }

    /// Cierra la conexión si sigue abierta
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            debug!("closing connection");
            connection.shutdown();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    // === Respuesta ===

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Código de estado (`None` antes de `read()`)
    pub fn status(&self) -> Option<StatusCode> {
        self.response.as_ref().map(|r| r.status())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.response.as_ref().and_then(|r| r.header(name))
    }

    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.response.as_ref().and_then(|r| r.header_values(name))
    }

    /// Bloque de headers formateado (vacío antes de `read()`)
    pub fn headers_string(&self) -> String {
        self.response
            .as_ref()
            .map(|r| r.headers_string())
            .unwrap_or_default()
    }

    /// Body decodificado (vacío antes de `read()`)
    pub fn content(&self) -> &[u8] {
        self.response.as_ref().map(|r| r.content()).unwrap_or(&[])
    }

    pub fn content_string(&self) -> String {
        String::from_utf8_lossy(self.content()).into_owned()
    }

    /// Cookies recibidas como `a=1; b=2`
    pub fn cookie(&self) -> Option<String> {
        self.response.as_ref().and_then(|r| r.cookie())
    }
}

impl Drop for HttpClient {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    /// Acepta una conexión, lee el request y responde `reply`
    fn serve_once(listener: TcpListener, reply: &'static [u8]) -> thread::JoinHandle<String> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            stream.write_all(reply).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        })
    }

    #[test]
    fn test_new_rejects_bad_url() {
        assert!(matches!(
            HttpClient::new("not a url"),
            Err(Error::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_defaults_before_read() {
        let client = HttpClient::new("http://example.com/").unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.status(), None);
        assert!(client.content().is_empty());
        assert_eq!(client.cookie(), None);
        assert!(client.headers_string().is_empty());
        assert!(!client.is_connected());
    }

    #[test]
    fn test_write_without_connect() {
        let mut client = HttpClient::new("http://example.com/").unwrap();
        assert!(matches!(client.write(), Err(Error::NotConnected)));
        assert!(matches!(client.read(), Err(Error::NotConnected)));
    }

    #[test]
    fn test_connect_refused_is_transport_error() {
        let port = {
            let listener = ephemeral_listener();
            listener.local_addr().unwrap().port()
        };

        let mut client = HttpClient::new(&format!("http://127.0.0.1:{}/", port)).unwrap();
        client.set_timeout(Duration::from_secs(2));
        let err = client.connect().unwrap_err();

        assert!(matches!(err, Error::Transport { stage: Stage::Connect, .. }));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_full_cycle() {
        let listener = ephemeral_listener();
        let port = listener.local_addr().unwrap().port();
        let server = serve_once(
            listener,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nSet-Cookie: sid=1; Path=/\r\n\r\nhello",
        );

        let mut client = HttpClient::new(&format!("http://127.0.0.1:{}/greet", port)).unwrap();
        client.add_get("name", "ana maria");
        client.connect().unwrap();
        assert!(client.is_connected());
        client.write().unwrap();
        client.read().unwrap();

        // read() libera el socket
        assert!(!client.is_connected());
        assert_eq!(client.status().map(|s| s.as_u16()), Some(200));
        assert_eq!(client.header("content-type"), Some("text/plain"));
        assert_eq!(client.content_string(), "hello");
        assert_eq!(client.cookie().as_deref(), Some("sid=1"));

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /greet?name=ana+maria HTTP/1.1\r\n"));
        assert!(request.contains(&format!("Host: 127.0.0.1:{}\r\n", port)));
    }

    #[test]
    fn test_close_releases_connection() {
        let listener = ephemeral_listener();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            // El cliente cierra sin escribir: read_to_end termina
            stream.read_to_end(&mut buf).unwrap();
            buf.len()
        });

        let mut client = HttpClient::new(&format!("http://127.0.0.1:{}/", port)).unwrap();
        client.connect().unwrap();
        client.close();
        assert!(!client.is_connected());
        assert_eq!(server.join().unwrap(), 0);
    }
}
