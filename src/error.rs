//! # Errores del Cliente
//! src/error.rs
//!
//! Taxonomía de errores del cliente HTTP. Cada variante permite distinguir
//! "entrada inválida" de "red caída" de "el servidor mandó basura".

use std::fmt;
use std::io;
use thiserror::Error;

/// Etapa de transporte en la que ocurrió un error de socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resolución DNS + conexión TCP (y handshake TLS)
    Connect,

    /// Túnel `CONNECT` a través del proxy
    Tunnel,

    /// Envío del request
    Write,

    /// Lectura de la respuesta
    Read,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Connect => "connect",
            Stage::Tunnel => "proxy tunnel",
            Stage::Write => "write",
            Stage::Read => "read",
        };
        f.write_str(name)
    }
}

/// Errores que puede producir el cliente
#[derive(Debug, Error)]
pub enum Error {
    /// La URL no se pudo descomponer en al menos esquema y host
    #[error("malformed URL `{url}`: {reason}")]
    MalformedUrl { url: String, reason: String },

    /// Falla del socket (connect / write / read) con el error del sistema
    #[error("{stage} failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: io::Error,
    },

    /// Status line o framing chunked ilegibles
    #[error("protocol error: {0}")]
    Protocol(String),

    /// El body comprimido no se pudo inflar
    #[error("cannot decode `{encoding}` content: {source}")]
    Decoding {
        encoding: String,
        #[source]
        source: io::Error,
    },

    /// Header con CR/LF embebido o nombre inválido
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Se intentó escribir o leer sin conexión abierta
    #[error("not connected")]
    NotConnected,
}

impl Error {
    pub(crate) fn malformed_url(url: &str, reason: &str) -> Self {
        Error::MalformedUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn transport(stage: Stage, source: io::Error) -> Self {
        Error::Transport { stage, source }
    }

    /// Código de error del sistema operativo (errno), si lo hay
    pub fn os_code(&self) -> Option<i32> {
        match self {
            Error::Transport { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// `true` para fallas de red (connect, túnel, write, read)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

/// Alias de `Result` para operaciones del cliente
pub type Result<T> = std::result::Result<T, Error>;
