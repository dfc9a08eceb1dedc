//! LaTeX build orchestration
//!
//! Runs a LaTeX tool (latexmk, pdflatex, xelatex or lualatex) as a child
//! process on behalf of an untrusted caller and reports the outcome as a
//! [`BuildResult`]:
//!
//! - Path fragments are checked against traversal/injection patterns before
//!   anything is spawned ([`validate_path`])
//! - The compiler is invoked with an argument vector, never through a shell
//! - Output is normalized into trimmed, non-empty lines ([`parse_logs`])
//! - Process failures (non-zero exit, timeout, spawn errors) become
//!   `BuildResult { success: false, .. }` instead of errors

pub mod error;
pub mod invocation;
pub mod logs;
pub mod runner;
pub mod service;
pub mod validate;

pub use build_types::{BuildRequest, BuildResult, LatexCommand};
pub use error::{BuildFailure, ValidationError};
pub use invocation::Invocation;
pub use logs::parse_logs;
pub use runner::{ProcessOutput, ProcessRunner, TokioProcessRunner};
pub use service::{EngineConfig, LatexService, BUILD_SUCCESS_MESSAGE, DEFAULT_WORKSPACE_ROOT};
pub use validate::validate_path;
