//! # Decodificación Chunked
//! src/http/chunked.rs
//!
//! Reensambla un body con `Transfer-Encoding: chunked`.
//!
//! ```text
//! 4\r\n
//! Wiki\r\n
//! 5\r\n
//! pedia\r\n
//! 0\r\n
//! \r\n
//! ```
//!
//! El CRLF después de los datos de cada chunk se consume si está presente,
//! pero no se exige. Los trailers después del chunk `0` se ignoran.

use crate::error::{Error, Result};

/// Decodifica un body chunked completo
///
/// # Errores
///
/// `Error::Protocol` si un tamaño no es hexadecimal o excede los datos
/// disponibles.
///
/// # Ejemplo
///
/// ```
/// use http_client::http::chunked;
///
/// let body = chunked::decode(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n").unwrap();
/// assert_eq!(body, b"Wikipedia");
/// ```
pub fn decode(body: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::with_capacity(body.len());
    let mut rest = body;

    while !rest.is_empty() {
        let (line, after_line) = split_line(rest);

        // Líneas vacías sueltas entre chunks
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            rest = after_line;
            continue;
        }

        let size = parse_size(line)?;
        if size == 0 {
            break;
        }

        if size > after_line.len() {
            return Err(Error::Protocol(format!(
                "chunk of {} bytes exceeds the {} bytes left",
                size,
                after_line.len()
            )));
        }

        decoded.extend_from_slice(&after_line[..size]);
        rest = skip_crlf(&after_line[size..]);
    }

    Ok(decoded)
}

/// Corta en el primer `\n` (quitando un `\r` previo); sin `\n` toma todo
fn split_line(data: &[u8]) -> (&[u8], &[u8]) {
    match data.iter().position(|&b| b == b'\n') {
        Some(pos) => {
            let line = &data[..pos];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            (line, &data[pos + 1..])
        }
        None => (data, &data[data.len()..]),
    }
}

fn skip_crlf(data: &[u8]) -> &[u8] {
    if let Some(rest) = data.strip_prefix(b"\r\n") {
        rest
    } else if let Some(rest) = data.strip_prefix(b"\n") {
        rest
    } else {
        data
    }
}

/// Tamaño hexadecimal de la línea, ignorando extensiones `;name=value`
fn parse_size(line: &[u8]) -> Result<usize> {
    let text = std::str::from_utf8(line)
        .map_err(|_| Error::Protocol("chunk size line is not ASCII".to_string()))?;

    let token = text.split(';').next().unwrap_or("").trim();

    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Protocol(format!("invalid chunk size `{}`", token)));
    }

    usize::from_str_radix(token, 16)
        .map_err(|_| Error::Protocol(format!("chunk size `{}` out of range", token)))
}
