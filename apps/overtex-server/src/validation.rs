//! Shape validation for `POST /api/build` bodies
//!
//! Allow-list checks on the raw request; the orchestrator applies its own
//! traversal/injection denylist afterwards.

use build_types::{BuildRequest, LatexCommand};
use lazy_static::lazy_static;
use regex::Regex;

use crate::api::BuildApiRequest;
use crate::error::ApiError;

pub const MAX_PATH_LEN: usize = 255;

lazy_static! {
    static ref SOURCE_FILE_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_.-]+\.tex$").unwrap();
    static ref OUTPUT_DIR_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9_./-]+$").unwrap();
}

pub fn is_valid_source_file(name: &str) -> bool {
    name.len() <= MAX_PATH_LEN && SOURCE_FILE_PATTERN.is_match(name)
}

pub fn is_valid_output_dir(dir: &str) -> bool {
    dir.len() <= MAX_PATH_LEN && OUTPUT_DIR_PATTERN.is_match(dir)
}

/// Turn a raw body into a [`BuildRequest`], collecting every problem found
pub fn validate_build_request(raw: BuildApiRequest) -> Result<BuildRequest, ApiError> {
    let source_file = raw.source_file.filter(|s| !s.is_empty());
    let output_dir = raw.output_dir.filter(|s| !s.is_empty());
    let (Some(source_file), Some(output_dir)) = (source_file, output_dir) else {
        return Err(ApiError::MissingFields);
    };

    let mut issues = Vec::new();
    if !is_valid_source_file(&source_file) {
        issues.push("Invalid file name");
    }
    if !is_valid_output_dir(&output_dir) {
        issues.push("Invalid directory path");
    }
    let command = match raw.command.as_deref() {
        None => None,
        Some(name) => match name.parse::<LatexCommand>() {
            Ok(command) => Some(command),
            Err(_) => {
                issues.push("Invalid command");
                None
            }
        },
    };

    if !issues.is_empty() {
        return Err(ApiError::Validation(issues.join(", ")));
    }

    Ok(BuildRequest {
        source_file,
        output_dir,
        command,
    })
}
