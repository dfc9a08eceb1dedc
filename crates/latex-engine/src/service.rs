//! The build orchestrator

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use build_types::{BuildRequest, BuildResult, LatexCommand};
use tracing::{debug, info, warn};

use crate::error::{BuildFailure, ValidationError};
use crate::invocation::Invocation;
use crate::logs::parse_logs;
use crate::runner::{ProcessOutput, ProcessRunner, TokioProcessRunner};
use crate::validate::validate_path;

pub const DEFAULT_WORKSPACE_ROOT: &str = "/workspaces/overtex";
pub const BUILD_SUCCESS_MESSAGE: &str = "Build completed successfully";

/// Orchestrator settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Every output directory is resolved below this root
    pub workspace_root: PathBuf,
    pub build_timeout: Duration,
    /// Timeout for `--version` availability probes
    pub probe_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            build_timeout: Duration::from_secs(60),
            probe_timeout: Duration::from_secs(10),
        }
    }
}

impl EngineConfig {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            ..Default::default()
        }
    }

    pub fn with_build_timeout(mut self, timeout: Duration) -> Self {
        self.build_timeout = timeout;
        self
    }
}

/// Validates build requests, runs the compiler and reports the outcome.
///
/// Holds no queue or lock: concurrent builds run their compilers in parallel,
/// and builds sharing an output directory race on its files.
#[derive(Clone)]
pub struct LatexService {
    config: EngineConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl LatexService {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_runner(config, Arc::new(TokioProcessRunner))
    }

    pub fn with_runner(config: EngineConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Absolute output directory for a (validated) fragment
    pub fn output_dir(&self, output_dir: &str) -> PathBuf {
        resolve_under(&self.config.workspace_root, output_dir)
    }

    /// Conventional location of the PDF produced for `source_file`.
    ///
    /// Derived from the names only; nothing checks that the compiler wrote it.
    pub fn pdf_path(&self, source_file: &str, output_dir: &str) -> PathBuf {
        let file_name = Path::new(source_file)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(".tex").unwrap_or(&file_name);
        self.output_dir(output_dir).join(format!("{}.pdf", stem))
    }

    /// Compiler invocation for a (validated) request
    pub fn invocation(
        &self,
        source_file: &str,
        output_dir: &str,
        command: LatexCommand,
    ) -> Invocation {
        let absolute_output_dir = self.output_dir(output_dir);
        let absolute_source = resolve_under(&absolute_output_dir, source_file);
        Invocation::latex_build(command, &absolute_source, &absolute_output_dir)
    }

    pub async fn build_request(&self, request: &BuildRequest) -> Result<BuildResult, ValidationError> {
        self.build(
            &request.source_file,
            &request.output_dir,
            request.command.unwrap_or_default(),
        )
        .await
    }

    /// Compile `source_file` inside `output_dir`.
    ///
    /// Returns `Err` only for unsafe paths, before anything is spawned.
    /// Every process-level failure is reported as `Ok` with `success: false`.
    pub async fn build(
        &self,
        source_file: &str,
        output_dir: &str,
        command: LatexCommand,
    ) -> Result<BuildResult, ValidationError> {
        validate_path(source_file)?;
        validate_path(output_dir)?;

        let invocation = self.invocation(source_file, output_dir, command);
        info!(
            "Building {} in {} with {}",
            source_file, output_dir, command
        );
        debug!("Invocation: {}", invocation);

        let result = match self.runner.run(&invocation, self.config.build_timeout).await {
            Ok(output) if output.success() => {
                let output_path = self.pdf_path(source_file, output_dir);
                info!("Build finished: {}", output_path.display());
                BuildResult::succeeded(
                    BUILD_SUCCESS_MESSAGE,
                    parse_logs(&output.combined()),
                    output_path.to_string_lossy().into_owned(),
                )
            }
            Ok(output) => {
                let failure = BuildFailure::Exited {
                    program: invocation.program.clone(),
                    code: output.exit_code,
                };
                failed_build(&failure, Some(&output))
            }
            Err(failure) => failed_build(&failure, failure.partial_output()),
        };

        Ok(result)
    }

    /// Whether latexmk answers `--version`
    pub async fn check_latex_installed(&self) -> bool {
        self.check_installed(LatexCommand::Latexmk).await
    }

    /// Best-effort availability probe; every error counts as "not installed"
    pub async fn check_installed(&self, command: LatexCommand) -> bool {
        let probe = Invocation::version_probe(command);
        match self.runner.run(&probe, self.config.probe_timeout).await {
            Ok(output) if output.success() => true,
            Ok(output) => {
                warn!("{} exited with {:?}", probe, output.exit_code);
                false
            }
            Err(err) => {
                warn!("{} unavailable: {}", command, err);
                false
            }
        }
    }
}

/// Logs come from whatever the process wrote, falling back to the error text
fn failed_build(failure: &BuildFailure, output: Option<&ProcessOutput>) -> BuildResult {
    let message = format!("Build failed: {}", failure);
    warn!("{}", message);

    let logs = output
        .map(|output| parse_logs(&output.combined()))
        .filter(|logs| !logs.is_empty())
        .unwrap_or_else(|| parse_logs(&failure.to_string()));

    BuildResult::failed(message, logs)
}

/// Join `fragment` below `root`, keeping only its normal components.
///
/// A leading `/` cannot escape the root and `.` segments are dropped.
fn resolve_under(root: &Path, fragment: &str) -> PathBuf {
    let mut resolved = root.to_path_buf();
    for component in Path::new(fragment).components() {
        if let Component::Normal(part) = component {
            resolved.push(part);
        }
    }
    resolved
}
