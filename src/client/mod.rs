//! # Módulo del Cliente HTTP
//! src/client/mod.rs
//!
//! Este módulo implementa el cliente que:
//! 1. Se conecta al servidor (o al proxy)
//! 2. Escribe el request HTTP serializado
//! 3. Lee la respuesta completa hasta que el servidor cierra
//! 4. Expone la respuesta parseada
//!
//! Todo es bloqueante y de un solo hilo: una instancia, un request.

pub mod tcp;
pub mod transport;

// Re-exportar para facilitar el uso
pub use tcp::{HttpClient, DEFAULT_TIMEOUT};
pub use transport::Connection;
