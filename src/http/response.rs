//! # Parsing de Respuestas HTTP/1.x
//! src/http/response.rs
//!
//! Convierte los bytes crudos leídos del socket en una respuesta utilizable.
//!
//! ## Formato de una respuesta
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Transfer-Encoding: chunked\r\n
//! Content-Encoding: gzip\r\n
//! \r\n
//! <body>
//! ```
//!
//! ## Pasos
//!
//! 1. Separar head y body en la primera línea vacía (`\r\n\r\n`, `\n\n` o `\r\r`)
//! 2. Parsear la status line (solo se conserva el código)
//! 3. Parsear headers (repetidos y con folding)
//! 4. Deshacer `Transfer-Encoding: chunked`
//! 5. Descomprimir según `Content-Encoding`

use super::chunked;
use super::encoding::ContentEncoding;
use super::headers::Headers;
use super::StatusCode;
use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Separadores head/body aceptados
const SEPARATORS: [&[u8]; 3] = [b"\r\n\r\n", b"\n\n", b"\r\r"];

fn line_splitter() -> &'static Regex {
    static LINES: OnceLock<Regex> = OnceLock::new();
    // `\r\n`, `\n` o `\r` solo (heads que usan `\r\r` como separador)
    LINES.get_or_init(|| Regex::new(r"\r\n|\n|\r").expect("line regex is valid"))
}

/// Separa head y body en la primera línea vacía
///
/// Sin separador todo es head y el body queda vacío (p. ej. 204/304).
///
/// # Ejemplo
/// ```
/// use http_client::http::response::split_head_body;
///
/// let (head, body) = split_head_body(b"HTTP/1.1 200 OK\n\nhi");
/// assert_eq!(head, b"HTTP/1.1 200 OK");
/// assert_eq!(body, b"hi");
/// ```
pub fn split_head_body(raw: &[u8]) -> (&[u8], &[u8]) {
    let earliest = SEPARATORS
        .iter()
        .filter_map(|sep| find(raw, sep).map(|pos| (pos, sep.len())))
        .min_by_key(|(pos, _)| *pos);

    match earliest {
        Some((pos, len)) => (&raw[..pos], &raw[pos + len..]),
        None => (raw, &raw[raw.len()..]),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Parsea la status line y retorna el código
///
/// Debe tener exactamente tres partes separadas por espacio: protocolo,
/// código y reason phrase (que puede contener espacios).
///
/// # Errores
///
/// `Error::Protocol` si faltan partes o el código no son 3 dígitos.
pub fn parse_status_line(line: &str) -> Result<StatusCode> {
    // El reason phrase puede venir vacío: "HTTP/1.1 200 " tiene tres partes
    let line = line.trim_start().trim_end_matches(&['\r', '\n'][..]);
    let parts: Vec<&str> = line.splitn(3, ' ').collect();

    if parts.len() != 3 {
        return Err(Error::Protocol(format!("malformed status line `{}`", line)));
    }

    if !parts[0].starts_with("HTTP/") {
        return Err(Error::Protocol(format!("unknown protocol `{}`", parts[0])));
    }

    let code = parts[1];
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Protocol(format!("invalid status code `{}`", code)));
    }

    code.parse::<u16>()
        .ok()
        .and_then(StatusCode::from_u16)
        .ok_or_else(|| Error::Protocol(format!("invalid status code `{}`", code)))
}

/// Parsea las líneas de headers (todas menos la status line)
fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> Headers {
    let mut headers = Headers::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        // Folding: la línea continúa el header anterior
        if line.starts_with(' ') || line.starts_with('\t') {
            if !headers.fold_into_last(line) {
                warn!(header_line = %line, "continuation line before any header, skipping");
            }
            continue;
        }

        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => headers.append(name, value),
            _ => warn!(header_line = %line, "malformed header line, skipping"),
        }
    }

    headers
}

/// Resumen serializable de una respuesta (salida `--json`)
#[derive(Debug, Clone, Serialize)]
pub struct ResponseSummary {
    pub status: StatusCode,
    pub headers: BTreeMap<String, Vec<String>>,
    pub cookie: Option<String>,
    pub body: String,
}

/// Respuesta parseada; inmutable una vez construida
#[derive(Debug, Clone)]
pub struct Response {
    /// Head crudo (status line + headers, sin el separador)
    head: String,

    /// Body crudo, antes de chunked / descompresión
    body: Vec<u8>,

    status: StatusCode,
    headers: Headers,

    /// Body decodificado
    content: Vec<u8>,
}

impl Response {
    /// Parsea una respuesta completa
    ///
    /// # Errores
    ///
    /// * `Error::Protocol` - respuesta vacía, status line o framing chunked inválidos
    /// * `Error::Decoding` - body comprimido corrupto
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_client::http::Response;
    ///
    /// let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello";
    /// let response = Response::parse(raw).unwrap();
    ///
    /// assert_eq!(response.status().as_u16(), 200);
    /// assert_eq!(response.header("content-type"), Some("text/plain"));
    /// assert_eq!(response.content(), b"hello");
    /// ```
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(Error::Protocol("empty response".to_string()));
        }

        let (head_bytes, body) = split_head_body(raw);
        let head = String::from_utf8_lossy(head_bytes).into_owned();

        let mut lines = line_splitter().split(&head);
        let status_line = lines.next().unwrap_or("");
        let status = parse_status_line(status_line)?;
        let headers = parse_headers(lines);

        debug!(
            status = status.as_u16(),
            headers = headers.len(),
            body_bytes = body.len(),
            "parsed response head"
        );

        let is_chunked = headers
            .get("Transfer-Encoding")
            .map(|v| v.trim().eq_ignore_ascii_case("chunked"))
            .unwrap_or(false);

        let dechunked = if is_chunked {
            chunked::decode(body)?
        } else {
            body.to_vec()
        };

        let encoding = ContentEncoding::from_header(headers.get("Content-Encoding"));
        let content = encoding.decode(dechunked)?;

        Ok(Response {
            head,
            body: body.to_vec(),
            status,
            headers,
            content,
        })
    }

    // === Acceso ===

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Primer valor de un header (nombre sin importar mayúsculas ni `-`/`_`)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Todos los valores de un header, en orden de llegada
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers.get_all(name)
    }

    /// Bloque de headers formateado `Name: value\r\n`
    pub fn headers_string(&self) -> String {
        self.headers.to_header_block()
    }

    pub fn raw_head(&self) -> &str {
        &self.head
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    /// Body ya decodificado (chunked + Content-Encoding)
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Body decodificado como texto (lossy)
    pub fn content_string(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Une los `name=value` de todos los `Set-Cookie` con `"; "`
    ///
    /// Atributos como `Path` o `Expires` se descartan.
    ///
    /// # Ejemplo
    /// ```
    /// use http_client::http::Response;
    ///
    /// let raw = b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1; Path=/\r\nSet-Cookie: b=2\r\n\r\n";
    /// let response = Response::parse(raw).unwrap();
    /// assert_eq!(response.cookie().as_deref(), Some("a=1; b=2"));
    /// ```
    pub fn cookie(&self) -> Option<String> {
        let values = self.headers.get_all("Set-Cookie")?;

        let pairs: Vec<&str> = values
            .iter()
            .map(|value| value.split(';').next().unwrap_or("").trim())
            .filter(|pair| !pair.is_empty())
            .collect();

        if pairs.is_empty() {
            return None;
        }
        Some(pairs.join("; "))
    }

    /// Resumen con nombres de header para mostrar (`Content-Type`)
    pub fn summary(&self) -> ResponseSummary {
        let headers = self
            .headers
            .iter()
            .map(|(name, values)| (super::headers::display_name(name), values.to_vec()))
            .collect();

        ResponseSummary {
            status: self.status,
            headers,
            cookie: self.cookie(),
            body: self.content_string(),
        }
    }
}
