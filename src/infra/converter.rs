// ============================================================
// Layer 6 — Web Model Converter
// ============================================================
// Hands the exported decoder to an external command that turns it
// into a browser-loadable graph model:
//
//   tensorflowjs_converter \
//       --input_format=tf_saved_model --output_format=tfjs_graph_model \
//       <saved model dir> <web model dir>
//
// The tool is optional. When it is missing or exits non-zero the
// failure is reported and training still counts as successful, so
// `convert` returns an outcome instead of an error.

use std::{
    fmt,
    path::{Path, PathBuf},
    process::Command,
};

pub const DEFAULT_PROGRAM: &str = "tensorflowjs_converter";
pub const DEFAULT_FLAGS: [&str; 2] = [
    "--input_format=tf_saved_model",
    "--output_format=tfjs_graph_model",
];

/// Result of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The tool exited successfully.
    Converted { output_dir: PathBuf },
    /// The tool ran but exited with a failure status.
    Failed { code: Option<i32> },
    /// The tool could not be started at all.
    Unavailable { reason: String },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }
}

impl fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted { output_dir } => {
                write!(f, "web model saved to '{}'", output_dir.display())
            }
            Self::Failed { code: Some(c) } => {
                write!(f, "converter exited with status {c}; make sure it is installed correctly")
            }
            Self::Failed { code: None } => write!(f, "converter was terminated by a signal"),
            Self::Unavailable { reason } => {
                write!(f, "converter could not be started ({reason}); make sure it is installed")
            }
        }
    }
}

/// The external conversion command.
#[derive(Debug, Clone)]
pub struct WebConverter {
    program: String,
    flags:   Vec<String>,
}

impl WebConverter {
    pub fn new(program: impl Into<String>, flags: Vec<String>) -> Self {
        Self { program: program.into(), flags }
    }

    /// Full argument vector, program first.
    pub fn command_line(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut argv = vec![self.program.clone()];
        argv.extend(self.flags.iter().cloned());
        argv.push(input.display().to_string());
        argv.push(output.display().to_string());
        argv
    }

    /// Run the tool once. Its own output goes straight to the console.
    pub fn convert(&self, input: &Path, output: &Path) -> ConversionOutcome {
        tracing::info!("Running: {}", self.command_line(input, output).join(" "));

        let status = Command::new(&self.program)
            .args(&self.flags)
            .arg(input)
            .arg(output)
            .status();

        let outcome = match status {
            Ok(s) if s.success() => ConversionOutcome::Converted { output_dir: output.to_path_buf() },
            Ok(s)  => ConversionOutcome::Failed { code: s.code() },
            Err(e) => ConversionOutcome::Unavailable { reason: e.to_string() },
        };

        if outcome.is_success() {
            tracing::info!("Conversion finished: {outcome}");
        } else {
            tracing::error!("Conversion failed: {outcome}");
        }
        outcome
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_line() {
        let flags = DEFAULT_FLAGS.iter().map(|s| s.to_string()).collect();
        let argv  = WebConverter::new(DEFAULT_PROGRAM, flags)
            .command_line(Path::new("in_dir"), Path::new("out_dir"));
        assert_eq!(
            argv,
            vec![
                "tensorflowjs_converter",
                "--input_format=tf_saved_model",
                "--output_format=tfjs_graph_model",
                "in_dir",
                "out_dir",
            ],
        );
    }

    #[test]
    fn test_missing_program_is_reported_not_raised() {
        let conv = WebConverter::new("glyph-cae-no-such-converter", vec![]);
        let outcome = conv.convert(Path::new("a"), Path::new("b"));
        assert!(matches!(outcome, ConversionOutcome::Unavailable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_maps_to_outcome() {
        let ok = WebConverter::new("true", vec![]).convert(Path::new("a"), Path::new("b"));
        assert_eq!(ok, ConversionOutcome::Converted { output_dir: PathBuf::from("b") });

        let bad = WebConverter::new("false", vec![]).convert(Path::new("a"), Path::new("b"));
        assert_eq!(bad, ConversionOutcome::Failed { code: Some(1) });
        assert!(!bad.is_success());
    }
}
