use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use serde::Deserialize;

/// Command line flags. Anything given here overrides the environment.
#[derive(Debug, Default, Parser)]
#[command(name = "sitebook", version, about = "Construction project manager")]
pub struct Cli {
    /// Postgres connection URL of the hosted backend
    #[arg(long)]
    pub database_url: Option<String>,

    /// Where the signed-in session is remembered between runs
    #[arg(long)]
    pub session_file: Option<PathBuf>,

    /// Log destination (the terminal is taken by the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Tracing filter, e.g. `info` or `sitebook=debug,sqlx=warn`
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".sitebook-session.json")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("sitebook.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load from an explicit set of variables instead of the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::from_iter::<_, Config>(vars)?)
    }

    pub fn apply_cli(mut self, cli: Cli) -> Self {
        if let Some(url) = cli.database_url {
            self.database_url = url;
        }
        if let Some(path) = cli.session_file {
            self.session_file = path;
        }
        if let Some(path) = cli.log_file {
            self.log_file = path;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Load configuration from the environment and apply command line overrides.
///
/// Variables from a `.env` file are loaded first if it exists. A
/// `--database-url` flag satisfies the otherwise required `DATABASE_URL`.
pub fn init(cli: Cli) -> Result<Config> {
    dotenv().ok();

    init_from(cli, std::env::vars())
}

fn init_from<I>(cli: Cli, vars: I) -> Result<Config>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut vars: Vec<(String, String)> = vars.into_iter().collect();
    if let Some(url) = &cli.database_url {
        vars.retain(|(key, _)| !key.eq_ignore_ascii_case("DATABASE_URL"));
        vars.push(("DATABASE_URL".to_string(), url.clone()));
    }

    Ok(Config::from_vars(vars)?.apply_cli(cli))
}
