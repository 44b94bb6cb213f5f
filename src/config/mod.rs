// Configuration module entry point
// Loads settings from defaults, an optional file and the environment

mod state;
mod types;

use config::Map;
use std::net::{IpAddr, SocketAddr};

pub use state::AppState;
pub use types::{AccessLogFormat, Config};

/// Config file looked up in the working directory (any extension `config` understands)
pub const CONFIG_FILE: &str = "echo-backend";

/// Environment variable that always decides the listening port
pub const PORT_ENV: &str = "PORT";

/// Port used when `PORT` is unset or empty
pub const DEFAULT_PORT: u16 = 3000;

const ENV_PREFIX: &str = "ECHO";

impl Config {
    /// Load configuration from `echo-backend.*` and `ECHO_*` variables, with the raw
    /// `PORT` value supplied by the caller
    pub fn load_with_port(port: Option<String>) -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE, None, port)
    }

    /// Load configuration from the given file path (without extension)
    ///
    /// Layers, lowest to highest: defaults, the file, `ECHO_*` variables, `port`.
    /// `env` replaces the process environment as the source of `ECHO_*` variables when given.
    /// `port` is the raw value of the `PORT` variable. An empty value counts as unset,
    /// anything that is not a valid `u16` is rejected.
    pub fn load_from(
        config_path: &str,
        env: Option<Map<String, String>>,
        port: Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let port = port.filter(|p| !p.trim().is_empty());

        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.keep_alive", true)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("server.port", port.map(|p| p.trim().to_string()))?
            .build()?;

        settings.try_deserialize()
    }

    /// Built-in defaults only, untouched by files or the environment
    #[cfg(test)]
    pub fn defaults() -> Self {
        Self::load_from("does-not-exist/echo-backend", Some(Map::new()), None)
            .unwrap_or_else(|e| panic!("built-in defaults must deserialize: {e}"))
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let ip: IpAddr = self.server.host.parse()?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
