use std::env;

use anyhow::{bail, Context};
use tracing::warn;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;

/// Destination and credentials for report output.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    pub spreadsheet_id: String,
    pub client_email: String,
    /// PEM text with `\n` escapes already expanded.
    pub private_key: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// `None` when no spreadsheet destination is configured.
    pub reports: Option<ReportConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL not found")?;
        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {}", port))?,
            None => DEFAULT_PORT,
        };

        let reports = match var("SPREADSHEET_ID") {
            Some(spreadsheet_id) => {
                let client_email = var("GOOGLE_CLIENT_EMAIL")
                    .context("GOOGLE_CLIENT_EMAIL is required when SPREADSHEET_ID is set")?;
                let private_key = var("GOOGLE_PRIVATE_KEY")
                    .context("GOOGLE_PRIVATE_KEY is required when SPREADSHEET_ID is set")?;
                let private_key = unescape_private_key(&private_key);
                if !private_key.contains("PRIVATE KEY") {
                    bail!("GOOGLE_PRIVATE_KEY does not look like a PEM private key");
                }
                Some(ReportConfig {
                    spreadsheet_id,
                    client_email,
                    private_key,
                })
            }
            None => {
                warn!("SPREADSHEET_ID is not set; report endpoints will fail until it is configured");
                None
            }
        };

        Ok(Self {
            database_url,
            host,
            port,
            reports,
        })
    }
}

/// Keys kept in env files usually carry literal `\n` sequences.
pub fn unescape_private_key(key: &str) -> String {
    key.replace("\\n", "\n")
}
