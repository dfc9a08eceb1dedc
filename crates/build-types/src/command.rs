//! LaTeX build tools that a build request may name

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Compiler executable used for a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatexCommand {
    /// latexmk driving pdflatex (asks for PDF output explicitly)
    #[default]
    Latexmk,
    Pdflatex,
    Xelatex,
    Lualatex,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown build command '{0}'. Must be one of: latexmk, pdflatex, xelatex, lualatex")]
pub struct UnknownCommand(pub String);

impl LatexCommand {
    pub const ALL: [LatexCommand; 4] = [
        LatexCommand::Latexmk,
        LatexCommand::Pdflatex,
        LatexCommand::Xelatex,
        LatexCommand::Lualatex,
    ];

    /// Executable name as found on `PATH`
    pub fn program(&self) -> &'static str {
        match self {
            LatexCommand::Latexmk => "latexmk",
            LatexCommand::Pdflatex => "pdflatex",
            LatexCommand::Xelatex => "xelatex",
            LatexCommand::Lualatex => "lualatex",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == LatexCommand::Latexmk
    }
}

impl fmt::Display for LatexCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for LatexCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LatexCommand::ALL
            .into_iter()
            .find(|cmd| cmd.program() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_latexmk() {
        assert_eq!(LatexCommand::default(), LatexCommand::Latexmk);
        assert!(LatexCommand::default().is_default());
        assert!(!LatexCommand::Xelatex.is_default());
    }

    #[test]
    fn test_parse_known_tools() {
        for cmd in LatexCommand::ALL {
            assert_eq!(cmd.program().parse::<LatexCommand>().unwrap(), cmd);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("XeLaTeX".parse::<LatexCommand>().is_err());
    }

    #[test]
    fn test_parse_rejects_arbitrary_programs() {
        let err = "rm".parse::<LatexCommand>().unwrap_err();
        assert_eq!(err, UnknownCommand("rm".to_string()));
        assert!(err.to_string().contains("latexmk"));
    }

    #[test]
    fn test_serde_uses_tool_name() {
        let json = serde_json::to_string(&LatexCommand::Lualatex).unwrap();
        assert_eq!(json, "\"lualatex\"");
        let cmd: LatexCommand = serde_json::from_str("\"pdflatex\"").unwrap();
        assert_eq!(cmd, LatexCommand::Pdflatex);
    }
}
