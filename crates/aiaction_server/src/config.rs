//! Command-line and environment configuration.

use aiaction_core::{Backend, UpcomingPolicy};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// AI in Action meetup app server.
#[derive(Parser, Debug, Clone)]
#[command(name = "aiaction_server", version, about, long_about = None)]
pub struct Config {
    /// Store data in SQLite instead of seeded in-memory repositories.
    #[arg(long, env = "AIACTION_SQLITE")]
    pub sqlite: bool,

    /// SQLite database file (only used with --sqlite).
    #[arg(long, env = "AIACTION_DB_PATH", default_value = "ai-in-action.db")]
    pub db_path: PathBuf,

    /// Interface to bind.
    #[arg(long, env = "AIACTION_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "AIACTION_PORT", default_value_t = 8080)]
    pub port: u16,

    /// trace|debug|info|warn|error. Defaults by build mode.
    #[arg(long, env = "AIACTION_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files. Logs go to stderr when unset.
    #[arg(long, env = "AIACTION_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Recompute upcoming/past from the event date on every read.
    #[arg(long, env = "AIACTION_RECOMPUTE_UPCOMING")]
    pub recompute_upcoming: bool,

    /// Per-request storage deadline in seconds.
    #[arg(long, env = "AIACTION_REQUEST_TIMEOUT_SECS", default_value_t = 5)]
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn backend(&self) -> Backend {
        if self.sqlite {
            Backend::Sqlite(self.db_path.clone())
        } else {
            Backend::Memory
        }
    }

    pub fn upcoming_policy(&self) -> UpcomingPolicy {
        if self.recompute_upcoming {
            UpcomingPolicy::Recompute
        } else {
            UpcomingPolicy::Stored
        }
    }

    /// At least one second.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
