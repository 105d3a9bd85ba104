//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Process configuration: `PORT` and `POSTGRES_URL`, parsed from the environment (with an
// optional `.env` file) via `clap`'s derive API. `finalize_timeout` and the subscriber idle
// timeout are build-time constants (`domain::services::{FINALIZE_TIMEOUT, SUBSCRIBER_IDLE_TIMEOUT}`),
// not configuration.
//--------------------------------------------------------------------------------------------------

use clap::Parser;

#[derive(Debug, Clone, Parser)]
pub struct Config {
    #[clap(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    #[clap(long, env = "POSTGRES_URL")]
    pub postgres_url: String,
}

impl Config {
    /// Loads `.env` (if present) and parses configuration from the environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}
