//! # Descomposición de URLs
//! src/http/url.rs
//!
//! Convierte una URL en el destino del request (`Target`).
//!
//! ## Formato aceptado
//!
//! ```text
//! scheme://[user[:pass]@]host[:port][/path][?query][#fragment]
//! ```
//!
//! Solo `http` y `https`. El fragmento se descarta (nunca viaja al servidor).

use crate::error::{Error, Result};
use std::fmt;

/// Esquemas soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// HTTP en texto plano (puerto 80)
    Http,

    /// HTTP sobre TLS (puerto 443)
    Https,
}

impl Scheme {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Puerto por defecto del esquema
    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    /// `true` si el transporte debe ir cifrado
    pub fn is_secure(&self) -> bool {
        matches!(self, Scheme::Https)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usuario y contraseña para `Authorization: Basic`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    /// Parsea `user:pass` (sin `:` la contraseña queda vacía)
    pub fn from_pair(pair: &str) -> Self {
        match pair.split_once(':') {
            Some((user, password)) => Self::new(user, password),
            None => Self::new(pair, ""),
        }
    }
}

/// Destino de un request, derivado una sola vez desde la URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Esquema (http / https)
    pub scheme: Scheme,

    /// Host sin corchetes (IPv6 se guarda como `::1`)
    pub host: String,

    /// Puerto explícito de la URL; `None` usa el del esquema
    pub port: Option<u16>,

    /// Path, `/` si la URL no trae uno
    pub path: String,

    /// Query string sin el `?`
    pub query: Option<String>,

    /// Userinfo embebido en la URL
    pub credentials: Option<Credentials>,
}

impl Target {
    /// Parsea una URL
    ///
    /// # Errores
    ///
    /// `Error::MalformedUrl` si falta el esquema, el esquema no es http/https,
    /// el host está vacío o el puerto no es un número válido.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_client::http::url::Target;
    ///
    /// let target = Target::parse("http://example.com:8080/a/b?x=1").unwrap();
    /// assert_eq!(target.host, "example.com");
    /// assert_eq!(target.port, Some(8080));
    /// assert_eq!(target.path, "/a/b");
    /// assert_eq!(target.query.as_deref(), Some("x=1"));
    /// ```
    pub fn parse(url: &str) -> Result<Self> {
        let trimmed = url.trim();

        let (scheme_str, rest) = trimmed
            .split_once("://")
            .ok_or_else(|| Error::malformed_url(url, "missing scheme"))?;

        let scheme = Scheme::from_str(scheme_str)
            .ok_or_else(|| Error::malformed_url(url, "unsupported scheme"))?;

        // El fragmento nunca se envía
        let rest = match rest.find('#') {
            Some(pos) => &rest[..pos],
            None => rest,
        };

        // La autoridad termina en el primer '/' o '?'
        let authority_end = rest.find(&['/', '?'][..]).unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        let path_and_query = &rest[authority_end..];

        let (credentials, host_port) = match authority.rfind('@') {
            Some(at) => (
                Some(Credentials::from_pair(&authority[..at])),
                &authority[at + 1..],
            ),
            None => (None, authority),
        };

        let (host, port) = Self::parse_host_port(url, host_port)?;

        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (path_and_query, None),
        };

        let path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };

        Ok(Target {
            scheme,
            host,
            port,
            path,
            query,
            credentials,
        })
    }

    /// Separa host y puerto, incluyendo literales IPv6 `[::1]:8080`
    fn parse_host_port(url: &str, host_port: &str) -> Result<(String, Option<u16>)> {
        let (host, port_str) = if let Some(bracketed) = host_port.strip_prefix('[') {
            let close = bracketed
                .find(']')
                .ok_or_else(|| Error::malformed_url(url, "unterminated IPv6 literal"))?;
            let host = &bracketed[..close];
            let after = &bracketed[close + 1..];
            let port = match after.strip_prefix(':') {
                Some(port) => Some(port),
                None if after.is_empty() => None,
                None => return Err(Error::malformed_url(url, "garbage after IPv6 literal")),
            };
            (host, port)
        } else {
            match host_port.rsplit_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (host_port, None),
            }
        };

        if host.is_empty() {
            return Err(Error::malformed_url(url, "missing host"));
        }

        let port = match port_str {
            // "host:" sin número equivale a sin puerto
            Some("") | None => None,
            Some(p) => Some(
                p.parse::<u16>()
                    .map_err(|_| Error::malformed_url(url, "invalid port"))?,
            ),
        };

        Ok((host.to_string(), port))
    }

    /// Puerto efectivo: el explícito o el del esquema
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// Host listo para usar en `Host:` / URIs (IPv6 entre corchetes)
    pub fn host_literal(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// Valor del header `Host`: incluye el puerto solo si no es el por defecto
    pub fn host_header(&self) -> String {
        match self.port {
            Some(port) if port != self.scheme.default_port() => {
                format!("{}:{}", self.host_literal(), port)
            }
            _ => self.host_literal(),
        }
    }

    /// `host:port` para el túnel `CONNECT`
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host_literal(), self.effective_port())
    }
}
