//! # Serialización de Requests HTTP/1.x
//! src/http/request.rs
//!
//! Este módulo arma el request como texto, listo para escribirse de una vez
//! en el socket.
//!
//! ## Formato generado
//!
//! ```text
//! POST /path?a=1 HTTP/1.1\r\n
//! Connection: Close\r\n
//! Host: example.com\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 7\r\n
//! Authorization: Basic dXNlcjpwYXNz\r\n
//! X-Custom: value\r\n
//! Cookie: session=abc\r\n
//! \r\n
//! b=2&c=3
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD target PROTOCOL`; el target es origin-form
//!    (`/path?query`) en conexión directa y absolute-URI
//!    (`http://host/path?query`) a través de un proxy
//! 2. **Headers**: en el orden fijo de arriba, luego los del usuario
//! 3. **Empty Line**: `\r\n`
//! 4. **Body**: el acumulador POST tal cual

use super::url::{Credentials, Target};
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::str::FromStr;

/// Content-Type de los bodies POST
pub const URLENCODED: &str = "application/x-www-form-urlencoded";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    HEAD,
    DELETE,
    TRACE,
    OPTIONS,
    CONNECT,
}

impl Method {
    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::HEAD => "HEAD",
            Method::DELETE => "DELETE",
            Method::TRACE => "TRACE",
            Method::OPTIONS => "OPTIONS",
            Method::CONNECT => "CONNECT",
        }
    }
}

impl FromStr for Method {
    type Err = String;

    /// Parsea un método (sin importar mayúsculas)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "HEAD" => Ok(Method::HEAD),
            "DELETE" => Ok(Method::DELETE),
            "TRACE" => Ok(Method::TRACE),
            "OPTIONS" => Ok(Method::OPTIONS),
            "CONNECT" => Ok(Method::CONNECT),
            _ => Err(format!("Unsupported HTTP method: {}", s)),
        }
    }
}

/// Versión del protocolo en la request line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    Http10,
    #[default]
    Http11,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

/// Proxy HTTP por el que se enruta la conexión
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

impl ProxyConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            credentials: None,
        }
    }

    /// Agrega usuario y contraseña (`Proxy-Authorization: Basic`)
    pub fn with_credentials(mut self, user: &str, password: &str) -> Self {
        self.credentials = Some(Credentials::new(user, password));
        self
    }

    /// Parsea `host:port`
    ///
    /// # Ejemplo
    /// ```
    /// use http_client::http::ProxyConfig;
    ///
    /// let proxy = ProxyConfig::parse("proxy.local:3128").unwrap();
    /// assert_eq!(proxy.host, "proxy.local");
    /// assert_eq!(proxy.port, 3128);
    /// ```
    pub fn parse(address: &str) -> std::result::Result<Self, String> {
        let (host, port) = address
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| format!("Proxy must be host:port, got `{}`", address))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(format!("Proxy host is empty in `{}`", address));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| format!("Invalid proxy port in `{}`", address))?;
        Ok(Self::new(host, port))
    }
}

/// Valor `Basic base64(user:pass)`
pub fn basic_auth(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.user, credentials.password);
    format!("Basic {}", BASE64.encode(raw))
}

/// Escapa espacios como `+` (estilo formulario, sin percent-encoding)
fn escape_spaces(s: &str) -> String {
    s.replace(' ', "+")
}

/// Separa `key=value`; sin `=` el valor queda vacío
fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}

/// Agrega `key=value` a un acumulador; el primero no lleva `&`
fn append_pair(acc: &mut Option<String>, key: &str, value: &str) {
    match acc {
        Some(existing) => {
            if !existing.is_empty() {
                existing.push('&');
            }
            existing.push_str(key);
            existing.push('=');
            existing.push_str(value);
        }
        None => *acc = Some(format!("{}={}", key, value)),
    }
}

fn contains_line_break(s: &str) -> bool {
    s.contains('\r') || s.contains('\n')
}

/// Estado configurable de un request, antes de serializar
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    version: Version,
    target: Target,

    /// Acumulador de query string (`None` = sin query)
    get: Option<String>,

    /// Acumulador del body POST (`None` = sin body)
    post: Option<String>,

    credentials: Option<Credentials>,
    proxy: Option<ProxyConfig>,

    /// Líneas `Name: value\r\n` agregadas por el usuario
    extra_headers: String,

    cookie: Option<String>,
}

impl Request {
    /// Crea un request GET para el destino dado
    ///
    /// La query de la URL inicializa el acumulador GET y el userinfo las
    /// credenciales.
    pub fn new(target: Target) -> Self {
        Self {
            method: Method::GET,
            version: Version::default(),
            get: target.query.clone(),
            post: None,
            credentials: target.credentials.clone(),
            proxy: None,
            extra_headers: String::new(),
            cookie: None,
            target,
        }
    }

    // === Configuración ===

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    pub fn set_credentials(&mut self, user: &str, password: &str) {
        self.credentials = Some(Credentials::new(user, password));
    }

    pub fn set_proxy(&mut self, proxy: Option<ProxyConfig>) {
        self.proxy = proxy;
    }

    pub fn set_cookie(&mut self, cookie: Option<&str>) {
        self.cookie = cookie.map(|c| c.to_string());
    }

    /// Reemplaza el acumulador GET completo (`None` lo elimina)
    pub fn set_get(&mut self, query: Option<&str>) {
        self.get = query.map(|q| q.to_string());
    }

    /// Reemplaza el acumulador POST completo (`None` lo elimina)
    pub fn set_post(&mut self, body: Option<&str>) {
        self.post = body.map(|b| b.to_string());
    }

    /// Agrega `key=value` a la query string
    ///
    /// # Ejemplo
    /// ```
    /// use http_client::http::{url::Target, Request};
    ///
    /// let mut request = Request::new(Target::parse("http://x/y").unwrap());
    /// request.add_get("a", "1");
    /// request.add_get("b", "2");
    /// assert_eq!(request.request_target(), "/y?a=1&b=2");
    /// ```
    pub fn add_get(&mut self, key: &str, value: &str) {
        append_pair(&mut self.get, key, value);
    }

    /// Igual que `add_get` pero desde un único `key=value`
    pub fn add_get_pair(&mut self, pair: &str) {
        let (key, value) = split_pair(pair);
        self.add_get(key, value);
    }

    /// Agrega `key=value` al body y fuerza el método POST
    pub fn add_post(&mut self, key: &str, value: &str) {
        append_pair(&mut self.post, key, value);
        self.method = Method::POST;
    }

    /// Igual que `add_post` pero desde un único `key=value`
    pub fn add_post_pair(&mut self, pair: &str) {
        let (key, value) = split_pair(pair);
        self.add_post(key, value);
    }

    /// Agrega un header extra, que se envía tal cual
    ///
    /// # Errores
    ///
    /// `Error::InvalidHeader` si el nombre está vacío o contiene `:` o
    /// espacios, o si nombre o valor contienen CR/LF (request splitting).
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeader("empty header name".to_string()));
        }
        if name.contains(':') || name.chars().any(|c| c.is_ascii_whitespace()) {
            return Err(Error::InvalidHeader(format!("bad header name `{}`", name)));
        }
        if contains_line_break(value) {
            return Err(Error::InvalidHeader(format!(
                "value of `{}` contains a line break",
                name
            )));
        }

        self.extra_headers.push_str(name);
        self.extra_headers.push_str(": ");
        self.extra_headers.push_str(value.trim());
        self.extra_headers.push_str("\r\n");
        Ok(())
    }

    // === Acceso ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    pub fn get_query(&self) -> Option<&str> {
        self.get.as_deref()
    }

    pub fn post_body(&self) -> Option<&str> {
        self.post.as_deref()
    }

    /// Body que viaja en el request: solo con POST (vacío si no hay campos)
    fn post_payload(&self) -> Option<&str> {
        if self.method == Method::POST {
            Some(self.post.as_deref().unwrap_or(""))
        } else {
            None
        }
    }

    /// `true` cuando HTTPS pasa por un proxy: se abre un túnel `CONNECT` y
    /// el request interno usa origin-form
    pub fn uses_tunnel(&self) -> bool {
        self.proxy.is_some() && self.target.scheme.is_secure()
    }

    /// Target de la request line
    ///
    /// Origin-form (`/path?query`) directo o por túnel; absolute-URI
    /// (`scheme://host/path?query`) a través de un proxy HTTP plano.
    pub fn request_target(&self) -> String {
        let mut origin = escape_spaces(&self.target.path);
        if let Some(query) = &self.get {
            origin.push('?');
            origin.push_str(&escape_spaces(query));
        }

        if self.proxy.is_some() && !self.uses_tunnel() {
            format!(
                "{}://{}{}",
                self.target.scheme,
                self.target.host_header(),
                origin
            )
        } else {
            origin
        }
    }

    /// Request completo (request line + headers + línea vacía + body)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = String::new();

        // 1. Request line
        head.push_str(&format!(
            "{} {} {}\r\n",
            self.method.as_str(),
            self.request_target(),
            self.version.as_str()
        ));

        // 2. Headers en orden fijo
        head.push_str("Connection: Close\r\n");
        head.push_str(&format!("Host: {}\r\n", self.target.host_header()));

        let body = self.post_payload();
        if let Some(body) = body {
            head.push_str(&format!("Content-Type: {}\r\n", URLENCODED));
            head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }

        if let Some(credentials) = &self.credentials {
            head.push_str(&format!("Authorization: {}\r\n", basic_auth(credentials)));
        }

        // Por túnel la autenticación del proxy va en el CONNECT
        if !self.uses_tunnel() {
            if let Some(value) = self.proxy_authorization() {
                head.push_str(&format!("Proxy-Authorization: {}\r\n", value));
            }
        }

        head.push_str(&self.extra_headers);

        if let Some(cookie) = &self.cookie {
            head.push_str(&format!("Cookie: {}\r\n", cookie));
        }

        // 3. Línea vacía
        head.push_str("\r\n");

        // 4. Body
        let mut bytes = head.into_bytes();
        if let Some(body) = body {
            bytes.extend_from_slice(body.as_bytes());
        }
        bytes
    }

    /// Valor de `Proxy-Authorization`, si el proxy tiene credenciales
    pub fn proxy_authorization(&self) -> Option<String> {
        self.proxy
            .as_ref()
            .and_then(|proxy| proxy.credentials.as_ref())
            .map(basic_auth)
    }

    /// Request `CONNECT host:port` para abrir el túnel por el proxy
    pub fn tunnel_bytes(&self) -> Vec<u8> {
        let authority = self.target.authority();
        let mut head = format!(
            "CONNECT {} {}\r\nHost: {}\r\n",
            authority,
            self.version.as_str(),
            authority
        );
        if let Some(value) = self.proxy_authorization() {
            head.push_str(&format!("Proxy-Authorization: {}\r\n", value));
        }
        head.push_str("\r\n");
        head.into_bytes()
    }
}
