use std::{ffi::OsString, time::Duration};

use clap::{CommandFactory, Parser};
use loader_model::{DatabasePath, Priority, RunConfig};
use loader_observe::{LoggerConfig, LoggerFormat};
use loader_spanner::DEFAULT_ENDPOINT;

use crate::{duration::parse_duration, error::ConfigError};

/// Drive a fixed read query against Cloud Spanner from concurrent workers for a fixed duration.
#[derive(Parser, Debug, Clone)]
#[command(name = "spanner-loader", disable_version_flag = true)]
pub struct Args {
    /// Number of concurrent workers (and sessions)
    #[arg(short = 'c', long = "concurrency", default_value_t = 1)]
    pub concurrency: usize,

    /// How long to generate load, e.g. 30s, 5m, 1m30s
    #[arg(short = 'd', long = "duration", default_value = "60s", value_parser = parse_duration)]
    pub duration: Duration,

    /// SQL query every worker runs repeatedly (required)
    #[arg(long, default_value = "")]
    pub query: String,

    /// GCP project id
    #[arg(long, env = "GCP_PROJECT_ID")]
    pub project: Option<String>,

    /// Cloud Spanner instance id
    #[arg(long, env = "SPANNER_INSTANCE")]
    pub instance: Option<String>,

    /// Cloud Spanner database id
    #[arg(long, env = "SPANNER_DATABASE")]
    pub database: Option<String>,

    /// CPU priority of the issued queries: low, medium, high
    #[arg(long, env = "CPU_PRIORITY", default_value = "high")]
    pub priority: String,

    /// Spanner REST endpoint; point it at an emulator for local runs
    #[arg(long, env = "SPANNER_REST_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// OAuth2 access token sent as a bearer credential
    #[arg(long = "access-token", env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Log filter directive, e.g. info or loader.worker=debug
    #[arg(long = "log-level", env = "LOADER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format: text or json
    #[arg(long = "log-format", env = "LOADER_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Print the build version and exit
    #[arg(long)]
    pub version: bool,
}

/// Fully validated inputs of one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub run: RunConfig,
    pub database: DatabasePath,
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl Args {
    /// Parse the process arguments, accepting Go-style single-dash long flags.
    pub fn load() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn logger_config(&self) -> Result<LoggerConfig, ConfigError> {
        let format: LoggerFormat = self.log_format.parse()?;
        Ok(LoggerConfig::new(format, self.log_level.clone()))
    }

    /// Validate and merge flags (already merged with env by clap) into [`Settings`].
    ///
    /// Checks run in a fixed order: query, priority, target identifiers, then run bounds.
    pub fn resolve(&self) -> Result<Settings, ConfigError> {
        if self.query.trim().is_empty() {
            return Err(loader_model::ModelError::EmptyQuery.into());
        }
        let priority: Priority = self.priority.parse()?;

        let database = DatabasePath::new(
            self.project.clone().unwrap_or_default(),
            self.instance.clone().unwrap_or_default(),
            self.database.clone().unwrap_or_default(),
        )?;

        let run = RunConfig::new(self.concurrency, self.duration, self.query.clone(), priority)?;

        Ok(Settings {
            run,
            database,
            endpoint: self.endpoint.clone(),
            access_token: self.access_token.clone(),
        })
    }
}

/// Rewrite `-query`/`-query=...` style flags to clap's `--query` form.
///
/// Only names of declared long options are rewritten, so clustered short flags such as `-c4` pass through.
/// Everything after a bare `--` is left untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cmd = Args::command();
    let longs: Vec<&str> = cmd.get_arguments().filter_map(|a| a.get_long()).collect();

    let mut out = Vec::new();
    let mut passthrough = false;
    for (i, arg) in args.into_iter().map(Into::into).enumerate() {
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }

        let rewritten = arg.to_str().and_then(|s| {
            if s == "--" {
                return None;
            }
            let flag = s.strip_prefix('-').filter(|f| !f.starts_with('-'))?;
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            (name.len() > 1 && longs.contains(&name)).then(|| OsString::from(format!("-{s}")))
        });

        if arg == "--" {
            passthrough = true;
        }
        out.push(rewritten.unwrap_or(arg));
    }
    out
}
