//! Startup errors
//!
//! Everything that can stop the process before it starts serving. Request handling itself
//! never fails: unmatched requests are answered with a 404.

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{host}': {source}")]
    InvalidAddress {
        host: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("failed to open log files: {0}")]
    Logger(std::io::Error),

    #[error("failed to build tokio runtime: {0}")]
    Runtime(std::io::Error),

    #[error("failed to register signal handlers: {0}")]
    Signal(std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_names_address() {
        let err = StartupError::Bind {
            addr: "127.0.0.1:3000".parse().unwrap(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:3000"));
        assert!(msg.contains("address in use"));
    }
}
