use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{tool} not found; searched: {}", display_paths(.attempted))]
    ToolNotFound {
        tool: String,
        attempted: Vec<PathBuf>,
    },

    #[error("{component} not found; searched: {}", display_paths(.attempted))]
    SdkComponentNotFound {
        component: String,
        attempted: Vec<PathBuf>,
    },

    #[error("Unknown architecture \"{arch}\" for board {board}")]
    UnknownArchitecture { arch: String, board: String },

    #[error("Unknown board model \"{board}\"")]
    UnknownBoard { board: String },

    #[error("Invalid board profile {board}: missing required field {field}")]
    InvalidBoardProfile { board: String, field: String },

    #[error("{tool} failed with code {}", display_code(.code))]
    ExternalProcessFailure { tool: String, code: Option<i32> },

    #[error("Malformed {kind} flags \"{flags}\": {source}")]
    MalformedFlagOverride {
        kind: String,
        flags: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("Build units {first} and {second} would share the build directory {key}")]
    UnitConflict {
        first: String,
        second: String,
        key: String,
    },

    #[error("Invalid dependency pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to render {template}: {reason}")]
    Template { template: String, reason: String },

    #[error("I/O error at {}: {source}", .path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    pub fn at_path(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        BuildError::Path {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(nothing)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_lists_attempted_paths() {
        let err = BuildError::ToolNotFound {
            tool: "avr-gcc".to_string(),
            attempted: vec![
                PathBuf::from("/opt/arduino/hardware/tools/avr/bin/avr-gcc"),
                PathBuf::from("PATH:avr-gcc"),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("/opt/arduino/hardware/tools/avr/bin/avr-gcc"));
        assert!(message.contains("PATH:avr-gcc"));
    }

    #[test]
    fn test_process_failure_reports_exit_code() {
        let err = BuildError::ExternalProcessFailure {
            tool: "make".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "make failed with code 2");

        let killed = BuildError::ExternalProcessFailure {
            tool: "make".to_string(),
            code: None,
        };
        assert_eq!(killed.to_string(), "make failed with code signal");
    }
}
