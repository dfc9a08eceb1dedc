//! Error types for validation and process execution

use std::time::Duration;

use thiserror::Error;

use crate::runner::ProcessOutput;

/// Rejected path input; raised before any process is spawned
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid file path: potential security risk detected")]
    UnsafePath(String),
}

/// Reasons a compiler run did not succeed
///
/// These never escape [`crate::LatexService::build`]; they are folded into
/// the failure message of the returned `BuildResult`.
#[derive(Error, Debug)]
pub enum BuildFailure {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// `partial` holds whatever the process wrote before it was killed
    #[error("{program} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        program: String,
        timeout: Duration,
        partial: ProcessOutput,
    },

    #[error("{program} {}", exit_description(.code))]
    Exited { program: String, code: Option<i32> },

    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl BuildFailure {
    /// Output captured before the failure, if any
    pub fn partial_output(&self) -> Option<&ProcessOutput> {
        match self {
            BuildFailure::Timeout { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_messages() {
        let exited = BuildFailure::Exited {
            program: "latexmk".into(),
            code: Some(12),
        };
        assert_eq!(exited.to_string(), "latexmk exited with status 12");

        let killed = BuildFailure::Exited {
            program: "xelatex".into(),
            code: None,
        };
        assert_eq!(killed.to_string(), "xelatex was terminated by a signal");
    }

    #[test]
    fn test_timeout_message() {
        let err = BuildFailure::Timeout {
            program: "latexmk".into(),
            timeout: Duration::from_secs(60),
            partial: ProcessOutput {
                exit_code: None,
                stdout: "Latexmk: applying rule 'pdflatex'\n".into(),
                stderr: String::new(),
            },
        };
        assert_eq!(err.to_string(), "latexmk timed out after 60000ms");
        assert_eq!(
            err.partial_output().map(|partial| partial.stdout.as_str()),
            Some("Latexmk: applying rule 'pdflatex'\n")
        );
    }

    #[test]
    fn test_validation_message_hides_input() {
        let err = ValidationError::UnsafePath("../../etc/passwd".into());
        assert!(!err.to_string().contains("passwd"));
    }
}
