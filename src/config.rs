use crate::storage::resolve_data_path;
use std::{env, net::SocketAddr, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().unwrap_or_else(|err| {
                warn!("invalid PORT value {value:?} ({err}), using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            Err(_) => {
                info!("PORT not set, using default: {DEFAULT_PORT}");
                DEFAULT_PORT
            }
        };

        Self {
            port,
            data_path: resolve_data_path(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
