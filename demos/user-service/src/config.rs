use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Deployment environment. Development allows cross-origin calls from any
/// origin; production allows none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Users exposed as JSON-over-HTTP RPC endpoints.")]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long = "env", env = "ENV", value_enum, default_value_t = Environment::Dev)]
    pub environment: Environment,

    /// Requests running longer than this are abandoned and their context cancelled.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: Environment::Dev,
            request_timeout_secs: 30,
        }
    }
}
