//! Server configuration from the command line and environment.

use std::net::{Ipv4Addr, SocketAddr};

use clap::Parser;

/// Well-known port of the line protocol.
pub const DEFAULT_PORT: u16 = 4242;
/// Port of the HTTP admin surface.
pub const DEFAULT_HTTP_PORT: u16 = 3030;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "sketchnet-server", version, about = "Shared canvas relay server")]
pub struct ServerConfig {
    /// Address for the line-protocol listener.
    #[arg(long, env = "SKETCHNET_LISTEN", default_value = "0.0.0.0:4242")]
    pub listen: SocketAddr,

    /// Address for the HTTP admin surface.
    #[arg(long, env = "SKETCHNET_HTTP", default_value = "0.0.0.0:3030")]
    pub http: SocketAddr,

    /// Disable the HTTP admin surface.
    #[arg(long)]
    pub no_http: bool,
}

impl ServerConfig {
    /// HTTP address, unless disabled.
    pub fn http_addr(&self) -> Option<SocketAddr> {
        (!self.no_http).then_some(self.http)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            http: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_HTTP_PORT)),
            no_http: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let config = ServerConfig::try_parse_from([
            "sketchnet-server",
            "--listen",
            "127.0.0.1:5000",
            "--no-http",
        ])
        .unwrap();
        assert_eq!(config.listen, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.http_addr(), None);
    }

    #[test]
    fn test_default_matches_cli_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen.port(), DEFAULT_PORT);
        assert_eq!(config.http_addr().map(|a| a.port()), Some(DEFAULT_HTTP_PORT));
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(ServerConfig::try_parse_from(["sketchnet-server", "--listen", "nowhere"]).is_err());
    }
}
