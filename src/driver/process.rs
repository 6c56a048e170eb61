use crate::error::{BuildError, Result};
use std::path::Path;
use std::process::Command;
use tracing::{debug, error};

/// Run `cmd` to completion, failing with the tool's exit code when it does
/// not exit cleanly. Output is inherited so compiler diagnostics reach the
/// terminal untouched.
pub fn run_tool(tool: &str, mut cmd: Command) -> Result<()> {
    debug!("Running {:?}", cmd);

    let program = Path::new(cmd.get_program()).to_path_buf();
    let status = cmd
        .status()
        .map_err(|e| BuildError::at_path(&program, e))?;

    if !status.success() {
        error!("{} exited with {}", tool, status);
        return Err(BuildError::ExternalProcessFailure {
            tool: tool.to_string(),
            code: status.code(),
        });
    }

    Ok(())
}
