//! # Módulo HTTP
//!
//! Este módulo implementa el lado cliente de HTTP/1.x desde cero, sin usar
//! librerías de alto nivel. Incluye:
//!
//! - Descomposición de URLs
//! - Serialización de requests
//! - Parsing de responses (status line, headers repetidos y con folding)
//! - Transfer-Encoding chunked
//! - Content-Encoding gzip / deflate
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Connection: Close\r\n
//! Host: example.com\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 13\r\n
//! \r\n
//! {"ok": true}
//! ```

pub mod chunked;   // Transfer-Encoding: chunked
pub mod encoding;  // Content-Encoding: gzip / deflate
pub mod headers;   // Mapa de headers con valores repetidos
pub mod request;   // Serialización de HTTP requests
pub mod response;  // Parsing de HTTP responses
pub mod status;    // Códigos de estado HTTP
pub mod url;       // Descomposición de URLs

// Re-exportamos los tipos principales para facilitar su uso
pub use headers::Headers;
pub use request::{Method, ProxyConfig, Request, Version};
pub use response::Response;
pub use status::StatusCode;
pub use url::{Credentials, Scheme, Target};
