//! Server configuration from flags and environment
//!
//! Every flag can also be set through the environment variable named next to
//! it; a `.env` file is loaded first when present.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use latex_engine::{EngineConfig, DEFAULT_WORKSPACE_ROOT};

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Command-line arguments for the OverTeX server
#[derive(Parser, Debug, Clone)]
#[command(name = "overtex-server")]
#[command(about = "OverTeX API server: compiles LaTeX projects on request")]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Deployment environment; production switches logs to JSON
    #[arg(long, env = "APP_ENV", value_enum, default_value = "development")]
    pub environment: Environment,

    /// Root directory every output directory is resolved under
    #[arg(long, env = "TEX_WORKSPACE_ROOT", default_value = DEFAULT_WORKSPACE_ROOT)]
    pub workspace_root: PathBuf,

    /// Compiler timeout in milliseconds
    #[arg(long, env = "BUILD_TIMEOUT", default_value = "60000")]
    pub build_timeout_ms: u64,

    /// PDF served by GET /api/pdf (default: <workspace root>/tex/main.pdf)
    #[arg(long, env = "PDF_PATH")]
    pub pdf_path: Option<PathBuf>,

    /// Comma-separated list of allowed CORS origins
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = "http://localhost:5173,http://127.0.0.1:5173"
    )]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_FILE_SIZE", default_value = "10485760")]
    pub max_body_bytes: usize,

    /// Window of the general /api rate limit in milliseconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_MS", default_value = "900000")]
    pub rate_limit_window_ms: u64,

    /// Requests allowed per IP in each window
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value = "100")]
    pub rate_limit_max_requests: u32,

    /// Build requests allowed per IP per minute
    #[arg(long, env = "BUILD_RATE_LIMIT_PER_MINUTE", default_value = "10")]
    pub build_rate_limit_per_minute: u32,

    /// Log level directive (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable verbose logging (overrides --log-level)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Token bucket for one rate-limited route group: one request is replenished
/// every `period_ms`, up to `burst` requests at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub period_ms: u64,
    pub burst: u32,
}

impl Quota {
    /// `max_requests` per `window_ms`
    pub fn per_window(window_ms: u64, max_requests: u32) -> Result<Self> {
        if window_ms == 0 || max_requests == 0 {
            bail!(
                "rate limit needs a non-zero window and request count (got {}ms / {})",
                window_ms,
                max_requests
            );
        }
        Ok(Self {
            period_ms: (window_ms / u64::from(max_requests)).max(1),
            burst: max_requests,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimits {
    /// Every /api route
    pub api: Quota,
    /// POST /api/build on top of `api`
    pub build: Quota,
}

/// Router-level settings
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub cors_origins: Vec<String>,
    pub max_body_bytes: usize,
    /// `None` disables rate limiting (the limiter needs the peer address)
    pub rate_limits: Option<RateLimits>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            max_body_bytes: 10 * 1024 * 1024,
            rate_limits: None,
        }
    }
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.workspace_root.clone())
            .with_build_timeout(Duration::from_millis(self.build_timeout_ms))
    }

    pub fn pdf_path(&self) -> PathBuf {
        self.pdf_path
            .clone()
            .unwrap_or_else(|| self.workspace_root.join("tex").join("main.pdf"))
    }

    pub fn rate_limits(&self) -> Result<RateLimits> {
        Ok(RateLimits {
            api: Quota::per_window(self.rate_limit_window_ms, self.rate_limit_max_requests)?,
            build: Quota::per_window(60_000, self.build_rate_limit_per_minute)?,
        })
    }

    pub fn http_options(&self) -> Result<HttpOptions> {
        let cors_origins = self
            .cors_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(HttpOptions {
            cors_origins,
            max_body_bytes: self.max_body_bytes,
            rate_limits: Some(self.rate_limits()?),
        })
    }

    pub fn log_directive(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        }
    }
}
