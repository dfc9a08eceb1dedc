//! Path fragment checks applied before a build is started

use crate::error::ValidationError;

/// Substrings rejected in any path fragment handed to the compiler
pub const FORBIDDEN_PATH_PATTERNS: [&str; 3] = ["..", ";", "|"];

/// Reject fragments that attempt directory traversal or command chaining.
///
/// This is a denylist, not a sandbox. Shell metacharacters are harmless here
/// because the compiler is spawned with an argument vector.
pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    if FORBIDDEN_PATH_PATTERNS
        .iter()
        .any(|pattern| path.contains(pattern))
    {
        return Err(ValidationError::UnsafePath(path.to_string()));
    }
    Ok(())
}
