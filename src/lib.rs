//! # HTTP Client
//! src/lib.rs
//!
//! Cliente HTTP/1.x implementado desde cero sobre sockets TCP: arma el
//! request como texto, lo escribe en el socket, lee la respuesta cruda y
//! la parsea (status line, headers, chunked, gzip/deflate).
//!
//! ## Arquitectura
//!
//! El cliente está dividido en módulos especializados:
//! - `http`: URLs, serialización de requests y parsing de responses
//! - `client`: Conexión TCP/TLS y ciclo de vida de un request
//! - `config`: Configuración por CLI y variables de entorno
//! - `error`: Errores tipados
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_client::HttpClient;
//!
//! let mut client = HttpClient::new("http://example.com/").expect("URL inválida");
//! client.send().expect("Error en el request");
//!
//! println!("{}", client.status().unwrap());
//! println!("{}", client.content_string());
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;

pub use client::HttpClient;
pub use error::{Error, Result};
