use proclife_core::ProcessError;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Run a short-lived command to completion and return its stdout
///
/// stdout and stderr are captured separately. Any failure, whether spawning
/// or a non-zero exit, comes back as [`ProcessError::Execute`] carrying both
/// streams so the caller has everything needed for a diagnostic. There is no
/// timeout; this is not meant for long-running processes.
pub async fn execute<S: AsRef<str>>(binary: &str, args: &[S]) -> Result<String, ProcessError> {
    let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
    debug!(binary, ?args, "executing one-shot command");

    let failed = |stdout: String, stderr: String, reason: String| ProcessError::Execute {
        binary: binary.to_string(),
        args: args.clone(),
        stdout,
        stderr,
        reason,
    };

    let output = Command::new(binary)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| failed(String::new(), String::new(), e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(failed(stdout, stderr, output.status.to_string()));
    }

    Ok(stdout)
}
