//! # Configuración del Cliente
//! src/config.rs
//!
//! Este módulo define la configuración del cliente HTTP con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_client http://example.com/search \
//!   -q "term=rust sockets" \
//!   -H "Accept: text/html" \
//!   --timeout 10 \
//!   --compressed -i
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_TIMEOUT=5 HTTP_CLIENT_PROXY=proxy.local:3128 ./http_client http://example.com/
//! ```

use crate::client::HttpClient;
use crate::error::{Error, Result};
use crate::http::url::Credentials;
use crate::http::{Method, ProxyConfig, Version};
use clap::Parser;
use std::time::Duration;

/// Configuración de un request desde la línea de comandos
#[derive(Debug, Clone, Parser)]
#[command(name = "http_client")]
#[command(about = "Cliente HTTP/1.x sobre sockets crudos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// URL destino (http:// o https://)
    pub url: String,

    /// Método HTTP (GET, POST, PUT, HEAD, DELETE, TRACE, OPTIONS, CONNECT)
    #[arg(short = 'X', long = "request")]
    pub method: Option<Method>,

    /// Usar HTTP/1.0 en vez de HTTP/1.1
    #[arg(long = "http10")]
    pub http10: bool,

    // === Red ===

    /// Timeout de connect/read/write en segundos
    #[arg(long = "timeout", default_value = "30", env = "HTTP_TIMEOUT")]
    pub timeout_secs: u64,

    /// Proxy HTTP como host:port
    #[arg(long, env = "HTTP_CLIENT_PROXY")]
    pub proxy: Option<String>,

    /// Credenciales del proxy como user:pass
    #[arg(long = "proxy-user", env = "HTTP_CLIENT_PROXY_USER")]
    pub proxy_user: Option<String>,

    // === Request ===

    /// Credenciales Basic como user:pass
    #[arg(short, long)]
    pub user: Option<String>,

    /// Header extra "Name: value" (repetible)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Valor del header Cookie
    #[arg(short = 'b', long)]
    pub cookie: Option<String>,

    /// Campo POST key=value (repetible, fuerza POST)
    #[arg(short, long)]
    pub data: Vec<String>,

    /// Parámetro de query key=value (repetible)
    #[arg(short, long = "query")]
    pub query: Vec<String>,

    /// Pedir respuesta comprimida (Accept-Encoding: gzip, deflate)
    #[arg(long)]
    pub compressed: bool,

    // === Salida ===

    /// Mostrar status line y headers antes del body
    #[arg(short, long)]
    pub include: bool,

    /// Imprimir un resumen JSON (status, headers, cookie, body)
    #[arg(long)]
    pub json: bool,

    /// Logs de depuración en stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Separa `Name: value`
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    if name.trim().is_empty() {
        return None;
    }
    Some((name.trim(), value.trim()))
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("URL must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout must be > 0".to_string());
        }

        if let Some(proxy) = &self.proxy {
            ProxyConfig::parse(proxy)?;
        }

        if self.proxy_user.is_some() && self.proxy.is_none() {
            return Err("Proxy user given without --proxy".to_string());
        }

        if let Some(method) = self.method {
            if method != Method::POST && !self.data.is_empty() {
                return Err(format!("Data fields need POST, got -X {}", method.as_str()));
            }
        }

        for header in &self.headers {
            if parse_header_line(header).is_none() {
                return Err(format!("Header must be \"Name: value\", got `{}`", header));
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Construye un cliente listo para `send()`
    ///
    /// Los campos `--data` fuerzan POST; un `-X` explícito tiene prioridad
    /// (y con otro método el body no se envía).
    pub fn build_client(&self) -> Result<HttpClient> {
        let mut client = HttpClient::new(&self.url)?;

        client.set_timeout(self.timeout());
        if self.http10 {
            client.set_protocol(Version::Http10);
        }

        if let Some(address) = &self.proxy {
            let mut proxy = ProxyConfig::parse(address).map_err(|reason| Error::MalformedUrl {
                url: address.clone(),
                reason,
            })?;
            if let Some(pair) = &self.proxy_user {
                let credentials = Credentials::from_pair(pair);
                proxy = proxy.with_credentials(&credentials.user, &credentials.password);
            }
            client.set_proxy(Some(proxy));
        }

        if let Some(pair) = &self.user {
            let credentials = Credentials::from_pair(pair);
            client.set_credentials(&credentials.user, &credentials.password);
        }

        for pair in &self.query {
            client.add_get_pair(pair);
        }
        for pair in &self.data {
            client.add_post_pair(pair);
        }
        if let Some(method) = self.method {
            client.set_method(method);
        }

        if self.compressed {
            client.add_header("Accept-Encoding", "gzip, deflate")?;
        }
        for header in &self.headers {
            let (name, value) = parse_header_line(header)
                .ok_or_else(|| Error::InvalidHeader(header.clone()))?;
            client.add_header(name, value)?;
        }

        client.set_cookie(self.cookie.as_deref());

        Ok(client)
    }

    /// Imprime un resumen de la configuración (en stderr)
    pub fn print_summary(&self) {
        eprintln!("╔══════════════════════════════════════════════════════════════╗");
        eprintln!("║                HTTP/1.x Client Configuration                 ║");
        eprintln!("╚══════════════════════════════════════════════════════════════╝");
        eprintln!("   URL:          {}", self.url);
        eprintln!(
            "   Method:       {}",
            self.method
                .map(|m| m.as_str())
                .unwrap_or(if self.data.is_empty() { "GET" } else { "POST" })
        );
        eprintln!("   Protocol:     {}", if self.http10 { "HTTP/1.0" } else { "HTTP/1.1" });
        eprintln!("   Timeout:      {} s", self.timeout_secs);
        match &self.proxy {
            Some(proxy) => eprintln!("   Proxy:        {}", proxy),
            None => eprintln!("   Proxy:        none"),
        }
        eprintln!("   Headers:      {}", self.headers.len());
        eprintln!("═══════════════════════════════════════════════════════════════");
    }
}

impl Default for Config {
    /// Configuración por defecto (sin URL)
    fn default() -> Self {
        Self {
            url: String::new(),
            method: None,
            http10: false,
            timeout_secs: 30,
            proxy: None,
            proxy_user: None,
            user: None,
            headers: Vec::new(),
            cookie: None,
            data: Vec::new(),
            query: Vec::new(),
            compressed: false,
            include: false,
            json: false,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> Config {
        Config {
            url: url.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.method.is_none());
        assert!(!config.http10);
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::try_parse_from([
            "http_client",
            "http://example.com/",
            "-X",
            "put",
            "-H",
            "Accept: text/html",
            "-d",
            "a=1",
            "-q",
            "page=2",
            "--timeout",
            "5",
            "-i",
        ])
        .unwrap();

        assert_eq!(config.url, "http://example.com/");
        assert_eq!(config.method, Some(Method::PUT));
        assert_eq!(config.headers, vec!["Accept: text/html".to_string()]);
        assert_eq!(config.data, vec!["a=1".to_string()]);
        assert_eq!(config.query, vec!["page=2".to_string()]);
        assert_eq!(config.timeout_secs, 5);
        assert!(config.include);
    }

    #[test]
    fn test_parse_rejects_unknown_method() {
        let result = Config::try_parse_from(["http_client", "http://x/", "-X", "BREW"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_success() {
        assert!(config("http://example.com/").validate().is_ok());
    }

    #[test]
    fn test_validate_empty_url() {
        let result = config("  ").validate();
        assert!(result.unwrap_err().contains("URL"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = config("http://x/");
        config.timeout_secs = 0;
        assert!(config.validate().unwrap_err().contains("Timeout"));
    }

    #[test]
    fn test_validate_bad_proxy() {
        let mut config = config("http://x/");
        config.proxy = Some("no-port".to_string());
        assert!(config.validate().unwrap_err().contains("Proxy"));
    }

    #[test]
    fn test_validate_proxy_user_without_proxy() {
        let mut config = config("http://x/");
        config.proxy_user = Some("a:b".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bad_header() {
        let mut config = config("http://x/");
        config.headers = vec!["NoColon".to_string()];
        assert!(config.validate().unwrap_err().contains("Header"));
    }

    #[test]
    fn test_build_client_applies_everything() {
        let mut config = config("http://example.com/path");
        config.query = vec!["q=rust".to_string()];
        config.data = vec!["name=ana".to_string()];
        config.user = Some("user:pass".to_string());
        config.headers = vec!["X-Trace: 42".to_string()];
        config.cookie = Some("sid=9".to_string());
        config.compressed = true;
        config.http10 = true;

        let client = config.build_client().unwrap();
        let raw = String::from_utf8(client.request_bytes()).unwrap();

        assert!(raw.starts_with("POST /path?q=rust HTTP/1.0\r\n"));
        assert!(raw.contains("Authorization: Basic dXNlcjpwYXNz\r\n"));
        assert!(raw.contains("Accept-Encoding: gzip, deflate\r\nX-Trace: 42\r\n"));
        assert!(raw.contains("Cookie: sid=9\r\n"));
        assert!(raw.ends_with("\r\n\r\nname=ana"));
    }

    #[test]
    fn test_build_client_explicit_method_wins() {
        let mut config = config("http://example.com/");
        config.data = vec!["a=1".to_string()];
        config.method = Some(Method::PUT);

        let client = config.build_client().unwrap();
        assert_eq!(client.request().method(), Method::PUT);
    }

    #[test]
    fn test_validate_data_with_non_post_method() {
        let mut config = config("http://x/");
        config.data = vec!["a=1".to_string()];
        config.method = Some(Method::PUT);
        assert!(config.validate().unwrap_err().contains("POST"));

        config.method = Some(Method::POST);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_client_with_proxy() {
        let mut config = config("http://example.com/x");
        config.proxy = Some("proxy.local:3128".to_string());
        config.proxy_user = Some("p:w".to_string());

        let client = config.build_client().unwrap();
        let proxy = client.request().proxy().unwrap();
        assert_eq!(proxy.host, "proxy.local");
        assert_eq!(proxy.port, 3128);
        assert_eq!(client.request().request_target(), "http://example.com/x");
    }

    #[test]
    fn test_build_client_bad_url() {
        assert!(matches!(
            config("example.com").build_client(),
            Err(Error::MalformedUrl { .. })
        ));
    }

    #[test]
    fn test_config_print_summary() {
        // Should not panic
        config("http://example.com/").print_summary();
    }
}
