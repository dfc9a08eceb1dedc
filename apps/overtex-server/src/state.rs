//! Application state for the OverTeX server

use std::path::PathBuf;
use std::time::Instant;

use latex_engine::LatexService;

use crate::config::Environment;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub latex: LatexService,
    /// File served by GET /api/pdf
    pub pdf_path: PathBuf,
    pub environment: Environment,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(latex: LatexService, pdf_path: impl Into<PathBuf>, environment: Environment) -> Self {
        Self {
            latex,
            pdf_path: pdf_path.into(),
            environment,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
