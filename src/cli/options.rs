use crate::config::{default_sdk_roots, BuildConfig};
use crate::error::{BuildError, Result};
use crate::flags::RawFlagOverrides;
use crate::toolchain::ToolKey;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Firmware build tool for Arduino-style projects
#[derive(Parser)]
#[command(name = "fwbuild")]
#[command(about = "Build Arduino-style firmware with automatic library dependency tracking")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct FwbuildCli {
    #[command(subcommand)]
    pub command: Commands,

    /// SDK installation directory; repeat to search several, highest priority first
    #[arg(short = 'd', long = "sdk-dir", global = true)]
    pub sdk_dirs: Vec<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build firmware from the project sources
    ///
    /// Sources are read from the project's `src` directory. Libraries
    /// included from there, from the project's `lib` directory or from the
    /// SDK are detected and built automatically. Artifacts are placed in
    /// `.build/<board>`.
    Build(BuildArgs),

    /// Remove build artifacts
    Clean {
        /// Project directory
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Only remove artifacts of this board
        #[arg(short, long)]
        board: Option<String>,
    },

    /// List boards defined by the SDK
    ListBoards,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Project directory
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// Board model to build for
    #[arg(short, long, default_value = "uno")]
    pub board: String,

    /// Build driver to use
    #[arg(long)]
    pub make: Option<String>,

    /// C compiler to use
    #[arg(long)]
    pub cc: Option<String>,

    /// C++ compiler to use
    #[arg(long)]
    pub cxx: Option<String>,

    /// Archiver to use
    #[arg(long)]
    pub ar: Option<String>,

    /// Linker to use
    #[arg(long)]
    pub ld: Option<String>,

    /// Image converter to use
    #[arg(long)]
    pub objcopy: Option<String>,

    /// Extra preprocessor flags, appended after the defaults
    #[arg(short = 'f', long, default_value = "", allow_hyphen_values = true)]
    pub cppflags: String,

    /// Extra C compiler flags
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub cflags: String,

    /// Extra C++ compiler flags
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub cxxflags: String,

    /// Extra linker flags, passed through with `-Wl,`
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub ldflags: String,

    /// Output format of the build summary
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl BuildArgs {
    pub fn tool_overrides(&self) -> BTreeMap<ToolKey, String> {
        [
            (ToolKey::Make, &self.make),
            (ToolKey::Cc, &self.cc),
            (ToolKey::Cxx, &self.cxx),
            (ToolKey::Ar, &self.ar),
            (ToolKey::Ld, &self.ld),
            (ToolKey::Objcopy, &self.objcopy),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }

    /// Relative project and SDK directories are resolved against the
    /// current directory here, once.
    pub fn to_config(&self, cli: &FwbuildCli) -> Result<BuildConfig> {
        let sdk_roots = sdk_roots(cli)
            .iter()
            .map(|root| absolute(root))
            .collect::<Result<Vec<_>>>()?;

        Ok(BuildConfig {
            project_dir: absolute(&self.project)?,
            board: self.board.clone(),
            sdk_roots,
            tool_overrides: self.tool_overrides(),
            flags: RawFlagOverrides {
                cppflags: self.cppflags.clone(),
                cflags: self.cflags.clone(),
                cxxflags: self.cxxflags.clone(),
                ldflags: self.ldflags.clone(),
            },
            verbose: cli.verbose,
        })
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| BuildError::at_path(path, e))
}

/// Roots given with `--sdk-dir`, or the conventional install locations.
pub fn sdk_roots(cli: &FwbuildCli) -> Vec<PathBuf> {
    if cli.sdk_dirs.is_empty() {
        default_sdk_roots()
    } else {
        cli.sdk_dirs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_args(cli: &FwbuildCli) -> &BuildArgs {
        match &cli.command {
            Commands::Build(args) => args,
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_build_options_map_to_config() {
        let cli = FwbuildCli::parse_from([
            "fwbuild",
            "build",
            "-b",
            "mega2560",
            "--sdk-dir",
            "/opt/arduino-1.6.4",
            "--sdk-dir",
            "/opt/arduino-1.0.5",
            "--cxx",
            "/usr/bin/avr-g++",
            "-f",
            "-DFOO=1 -DBAR",
            "--ldflags=--gc-sections",
            "-v",
        ]);
        let config = build_args(&cli).to_config(&cli).unwrap();

        assert_eq!(config.board, "mega2560");
        assert_eq!(
            config.sdk_roots,
            vec![PathBuf::from("/opt/arduino-1.6.4"), PathBuf::from("/opt/arduino-1.0.5")]
        );
        assert_eq!(config.tool_overrides.get(&ToolKey::Cxx).map(String::as_str), Some("/usr/bin/avr-g++"));
        assert!(!config.tool_overrides.contains_key(&ToolKey::Cc));
        assert_eq!(config.flags.cppflags, "-DFOO=1 -DBAR");
        assert_eq!(config.flags.ldflags, "--gc-sections");
        assert!(config.verbose);
    }

    #[test]
    fn test_relative_directories_become_absolute() {
        let cli = FwbuildCli::parse_from(["fwbuild", "build", "--sdk-dir", "sdk/arduino"]);
        let config = build_args(&cli).to_config(&cli).unwrap();
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(config.project_dir, cwd);
        assert_eq!(config.sdk_roots, vec![cwd.join("sdk/arduino")]);
        assert_eq!(config.build_dir(), cwd.join(".build/uno"));
    }

    #[test]
    fn test_build_defaults() {
        let cli = FwbuildCli::parse_from(["fwbuild", "build"]);
        let args = build_args(&cli);
        assert_eq!(args.board, "uno");
        assert_eq!(args.project, PathBuf::from("."));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.tool_overrides().is_empty());
    }
}
