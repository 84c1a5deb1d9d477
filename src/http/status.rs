//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! El cliente recibe cualquier código de 3 dígitos, así que el status se
//! guarda como número. Las clases siguen el RFC 7231:
//!
//! - **1xx**: Informacional
//! - **2xx**: Éxito
//! - **3xx**: Redirección (el cliente no las sigue)
//! - **4xx**: Error del cliente
//! - **5xx**: Error del servidor

use serde::Serialize;

/// Código de estado numérico de una respuesta
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Crea un código si está en el rango 100..=999
    ///
    /// # Ejemplo
    /// ```
    /// use http_client::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(404).unwrap().as_u16(), 404);
    /// assert!(StatusCode::from_u16(42).is_none());
    /// ```
    pub fn from_u16(code: u16) -> Option<Self> {
        if (100..1000).contains(&code) {
            Some(StatusCode(code))
        } else {
            None
        }
    }

    /// Convierte el código a su valor numérico
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Reason phrase estándar, o `""` para códigos no registrados
    ///
    /// # Ejemplo
    /// ```
    /// use http_client::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(200).unwrap().reason_phrase(), "OK");
    /// assert_eq!(StatusCode::from_u16(404).unwrap().reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            206 => "Partial Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            409 => "Conflict",
            411 => "Length Required",
            413 => "Payload Too Large",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Verifica si el código es una redirección (3xx)
    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.0)
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.0)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK" (solo el número si no hay reason phrase conocida)
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = self.reason_phrase();
        if reason.is_empty() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{} {}", self.0, reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(n: u16) -> StatusCode {
        StatusCode::from_u16(n).unwrap()
    }

    #[test]
    fn test_from_u16_range() {
        assert!(StatusCode::from_u16(99).is_none());
        assert!(StatusCode::from_u16(1000).is_none());
        assert_eq!(code(599).as_u16(), 599);
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(code(200).reason_phrase(), "OK");
        assert_eq!(code(400).reason_phrase(), "Bad Request");
        assert_eq!(code(503).reason_phrase(), "Service Unavailable");
        assert_eq!(code(299).reason_phrase(), "");
    }

    #[test]
    fn test_classes() {
        assert!(code(204).is_success());
        assert!(code(304).is_redirection());
        assert!(code(404).is_client_error());
        assert!(!code(404).is_server_error());
        assert!(code(502).is_server_error());
        assert!(!code(502).is_success());
    }

    #[test]
    fn test_display() {
        assert_eq!(code(200).to_string(), "200 OK");
        assert_eq!(code(404).to_string(), "404 Not Found");
        assert_eq!(code(299).to_string(), "299");
    }
}
