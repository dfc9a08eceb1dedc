//! Compiler command lines as executable + argument vector

use std::fmt;
use std::path::{Path, PathBuf};

use build_types::LatexCommand;

/// A fully resolved child process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Compile `source` into `output_dir`, running from inside `output_dir`.
    ///
    /// latexmk is asked for PDF output explicitly; the other engines produce
    /// PDF by default and get the same remaining flags.
    pub fn latex_build(command: LatexCommand, source: &Path, output_dir: &Path) -> Self {
        let mut invocation = Invocation::new(command.program());
        if command.is_default() {
            invocation = invocation.arg("-pdf");
        }
        invocation
            .arg("-interaction=nonstopmode")
            .arg(format!("-output-directory={}", output_dir.to_string_lossy()))
            .arg(source.to_string_lossy())
            .current_dir(output_dir)
    }

    /// `<tool> --version`, used to probe whether the tool is installed
    pub fn version_probe(command: LatexCommand) -> Self {
        Invocation::new(command.program()).arg("--version")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_latexmk_requests_pdf() {
        let inv = Invocation::latex_build(
            LatexCommand::Latexmk,
            Path::new("/ws/tex/main.tex"),
            Path::new("/ws/tex"),
        );

        assert_eq!(inv.program, "latexmk");
        assert_eq!(
            inv.args,
            vec![
                "-pdf",
                "-interaction=nonstopmode",
                "-output-directory=/ws/tex",
                "/ws/tex/main.tex",
            ]
        );
        assert_eq!(inv.working_dir, Some(PathBuf::from("/ws/tex")));
    }

    #[test]
    fn test_alternate_engine_keeps_flags() {
        let inv = Invocation::latex_build(
            LatexCommand::Xelatex,
            Path::new("/ws/tex/main.tex"),
            Path::new("/ws/tex"),
        );

        assert_eq!(inv.program, "xelatex");
        assert_eq!(
            inv.args,
            vec![
                "-interaction=nonstopmode",
                "-output-directory=/ws/tex",
                "/ws/tex/main.tex",
            ]
        );
    }

    #[test]
    fn test_source_with_spaces_stays_one_argument() {
        let inv = Invocation::latex_build(
            LatexCommand::Pdflatex,
            Path::new("/ws/tex/my thesis.tex"),
            Path::new("/ws/tex"),
        );
        assert_eq!(inv.args.last().unwrap(), "/ws/tex/my thesis.tex");
    }

    #[test]
    fn test_version_probe() {
        let inv = Invocation::version_probe(LatexCommand::Lualatex);
        assert_eq!(inv.to_string(), "lualatex --version");
        assert_eq!(inv.working_dir, None);
    }
}
