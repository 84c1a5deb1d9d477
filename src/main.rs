//! # HTTP Client - Entry Point
//! src/main.rs
//!
//! Punto de entrada del cliente HTTP/1.x.
//!
//! Lee la configuración (CLI + variables de entorno), ejecuta un request y
//! escribe la respuesta en stdout. Los logs van a stderr.

use http_client::config::Config;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "http_client=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    // Crear configuración (CLI o env)
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(2);
    }

    init_tracing(config.verbose);
    if config.verbose {
        config.print_summary();
    }

    let mut client = match config.build_client() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("💥 Error: {}", e);
            std::process::exit(2);
        }
    };

    // Ejecutar el request (esto bloqueará el thread)
    if let Err(e) = client.send() {
        eprintln!("💥 Error: {}", e);
        if let Some(code) = e.os_code() {
            eprintln!("   errno: {}", code);
        }
        std::process::exit(1);
    }

    let Some(response) = client.response() else {
        eprintln!("💥 Error: no response");
        std::process::exit(1);
    };

    let mut stdout = std::io::stdout().lock();
    let written = if config.json {
        match serde_json::to_string_pretty(&response.summary()) {
            Ok(json) => writeln!(stdout, "{}", json),
            Err(e) => {
                eprintln!("💥 Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        let mut result = Ok(());
        if config.include {
            result = write!(
                stdout,
                "{}\r\n{}\r\n",
                response.status(),
                response.headers_string()
            );
        }
        result.and_then(|_| stdout.write_all(response.content()))
    };

    if let Err(e) = written.and_then(|_| stdout.flush()) {
        eprintln!("💥 Error escribiendo salida: {}", e);
        std::process::exit(1);
    }
}
