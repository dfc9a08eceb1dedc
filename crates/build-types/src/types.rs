use serde::{Deserialize, Serialize};

use crate::command::LatexCommand;

/// Request body of `POST /api/build`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub source_file: String,
    pub output_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<LatexCommand>,
}

impl BuildRequest {
    pub fn new(source_file: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            output_dir: output_dir.into(),
            command: None,
        }
    }

    pub fn with_command(mut self, command: LatexCommand) -> Self {
        self.command = Some(command);
        self
    }
}

/// Outcome of one compiler invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub success: bool,
    pub message: String,
    /// Compiler output, one trimmed non-empty line per entry, in emission order
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

impl BuildResult {
    pub fn succeeded(message: impl Into<String>, logs: Vec<String>, output_path: String) -> Self {
        Self {
            success: true,
            message: message.into(),
            logs,
            output_path: Some(output_path),
        }
    }

    pub fn failed(message: impl Into<String>, logs: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            logs,
            output_path: None,
        }
    }
}

/// Snapshot of a client build session
///
/// Also the body of `GET /api/build/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub is_building: bool,
    pub success: Option<bool>,
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Vec<String>,
}
