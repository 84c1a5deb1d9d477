//! # Content-Encoding
//! src/http/encoding.rs
//!
//! Descompresión del body según `Content-Encoding`, aplicada después de
//! deshacer el framing chunked.
//!
//! | valor      | acción                                                   |
//! |------------|----------------------------------------------------------|
//! | `gzip`     | saltar los 10 bytes del header gzip e inflar raw deflate |
//! | `deflate`  | inflar un stream zlib                                    |
//! | otro/vacío | sin cambios                                              |

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::{self, Read};

/// Tamaño fijo del header gzip que se descarta
pub const GZIP_HEADER_LEN: usize = 10;

/// Codificaciones de contenido reconocidas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    Deflate,
    Identity,
}

impl ContentEncoding {
    /// Interpreta el valor del header (ausente o desconocido → `Identity`)
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("gzip") => ContentEncoding::Gzip,
            Some("deflate") => ContentEncoding::Deflate,
            _ => ContentEncoding::Identity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
            ContentEncoding::Identity => "identity",
        }
    }

    /// Decodifica `data`; `Identity` lo devuelve intacto
    ///
    /// Un body vacío (HEAD, 204, 304) queda vacío con cualquier encoding.
    ///
    /// # Errores
    ///
    /// `Error::Decoding` si el stream está corrupto o truncado.
    pub fn decode(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Ok(data);
        }

        let decoded = match self {
            ContentEncoding::Identity => return Ok(data),
            ContentEncoding::Gzip => {
                if data.len() < GZIP_HEADER_LEN {
                    Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "body shorter than the gzip header",
                    ))
                } else {
                    inflate(DeflateDecoder::new(&data[GZIP_HEADER_LEN..]))
                }
            }
            ContentEncoding::Deflate => inflate(ZlibDecoder::new(&data[..])),
        };

        decoded.map_err(|source| Error::Decoding {
            encoding: self.as_str().to_string(),
            source,
        })
    }
}

fn inflate<R: Read>(mut decoder: R) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
