//! Server configuration
//!
//! Command-line flags, each with an environment variable fallback.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Filament inventory server
#[derive(Debug, Clone, Parser)]
#[command(name = "filament-tracker", version, about)]
pub struct Config {
    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file, or `:memory:`
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/filament_inventory.db")]
    pub database: PathBuf,

    #[arg(long, env = "LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Browser UI bundle served at `/`
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Do not send CORS headers
    #[arg(long, env = "DISABLE_CORS")]
    pub no_cors: bool,

    /// Default log filter; `RUST_LOG` takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["filament-tracker"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database, PathBuf::from("./data/filament_inventory.db"));
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
        assert!(config.static_dir.is_none());
        assert!(!config.no_cors);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "filament-tracker",
            "--host",
            "127.0.0.1",
            "-p",
            "8080",
            "--database",
            ":memory:",
            "--static-dir",
            "public",
            "--no-cors",
        ])
        .unwrap();

        assert_eq!(config.socket_addr().unwrap(), "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.database, PathBuf::from(":memory:"));
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
        assert!(config.no_cors);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["filament-tracker", "--port", "http"]).is_err());
    }
}
