//! Process configuration. Every constant in the wire protocol has a
//! compiled-in default; each is overridable from the environment via
//! `clap`'s `env` derive support. An invalid value fails startup with a
//! readable error before any socket opens — never a silent fallback.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

const DEFAULT_TURN_TIMEOUT_SECS: u64 = poker_core::TURN_TIMEOUT_SECS;
const DEFAULT_HEARTBEAT_TIMEOUT_SECS: u64 = poker_core::HEARTBEAT_TIMEOUT_SECS;

#[derive(Debug, Parser)]
#[command(name = "poker-server", about = "Multi-room Texas Hold'em server")]
pub struct Cli {
    /// Address to bind the HTTP/WebSocket listener on.
    #[arg(long, env = "POKER_BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: String,

    /// Directory to serve static assets from.
    #[arg(long, env = "POKER_STATIC_DIR", default_value = "public")]
    pub static_dir: String,

    /// Seconds before an idle turn is auto-resolved (check or fold).
    #[arg(long, env = "POKER_TURN_TIMEOUT_SECS", default_value_t = DEFAULT_TURN_TIMEOUT_SECS)]
    pub turn_timeout_secs: u64,

    /// Seconds of silence before a connection is marked heartbeat-timed-out.
    #[arg(long, env = "POKER_HEARTBEAT_TIMEOUT_SECS", default_value_t = DEFAULT_HEARTBEAT_TIMEOUT_SECS)]
    pub heartbeat_timeout_secs: u64,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {0:?}")]
    InvalidBindAddr(String),
    #[error("turn timeout must be between 1 and 600 seconds, got {0}")]
    TurnTimeoutOutOfRange(u64),
    #[error("heartbeat timeout must be between 1 and 600 seconds, got {0}")]
    HeartbeatTimeoutOutOfRange(u64),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: String,
    pub turn_timeout: Duration,
    pub heartbeat_timeout: Duration,
}

impl ServerConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let bind_addr = cli
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(cli.bind_addr.clone()))?;
        if cli.turn_timeout_secs == 0 || cli.turn_timeout_secs > 600 {
            return Err(ConfigError::TurnTimeoutOutOfRange(cli.turn_timeout_secs));
        }
        if cli.heartbeat_timeout_secs == 0 || cli.heartbeat_timeout_secs > 600 {
            return Err(ConfigError::HeartbeatTimeoutOutOfRange(
                cli.heartbeat_timeout_secs,
            ));
        }
        Ok(ServerConfig {
            bind_addr,
            static_dir: cli.static_dir,
            turn_timeout: Duration::from_secs(cli.turn_timeout_secs),
            heartbeat_timeout: Duration::from_secs(cli.heartbeat_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(turn: u64, heartbeat: u64) -> Cli {
        Cli {
            bind_addr: "127.0.0.1:8080".to_string(),
            static_dir: "public".to_string(),
            turn_timeout_secs: turn,
            heartbeat_timeout_secs: heartbeat,
        }
    }

    #[test]
    fn rejects_out_of_range_turn_timeout_rather_than_clamping() {
        let err = ServerConfig::from_cli(cli(0, 30)).unwrap_err();
        assert!(matches!(err, ConfigError::TurnTimeoutOutOfRange(0)));
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let mut c = cli(60, 30);
        c.bind_addr = "not-an-address".to_string();
        assert!(ServerConfig::from_cli(c).is_err());
    }

    #[test]
    fn accepts_defaults() {
        assert!(ServerConfig::from_cli(cli(60, 30)).is_ok());
    }
}
