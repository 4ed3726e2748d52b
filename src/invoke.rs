//! External tool invocation with ordered executable fallback.
//!
//! ## Why candidate lists?
//!
//! Different installations expose the same converter under different binary
//! names (32- vs 64-bit Ghostscript builds, `soffice` vs `libreoffice`
//! wrappers). Trying alternates in order raises the success rate without any
//! per-deployment configuration. A candidate "fails" only when the process
//! cannot be launched or exits non-zero; the first zero exit wins and no
//! further candidate is attempted.
//!
//! Stderr is captured through [`tokio::process::Command::output`], which
//! drains stdout and stderr concurrently with waiting on the child — a child
//! writing megabytes of diagnostics can never deadlock the invocation. On
//! total failure the reported diagnostic is that of the *last* attempted
//! candidate (the most specific binary the deployment got closest to
//! running), or a synthesized `exit code N` when it wrote nothing.

use crate::error::ConvertError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// How long a capability probe may take before the tool counts as absent.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Run the first working candidate of `candidates` with `args` in `cwd`.
///
/// Spawns one OS process per attempted candidate; no pooling, no retries
/// beyond the list itself. Returns `Ok(())` on the first zero exit, or
/// [`ConvertError::ToolUnavailable`] carrying the last candidate's
/// diagnostic when all candidates are exhausted.
pub async fn run(
    candidates: &[String],
    args: &[String],
    cwd: &Path,
) -> Result<(), ConvertError> {
    debug_assert!(!candidates.is_empty(), "empty candidate list");
    let mut last_tool = String::new();
    let mut last_diag = String::from("no executable candidates configured");

    for tool in candidates {
        last_tool = tool.clone();
        debug!(%tool, ?args, cwd = %cwd.display(), "invoking external tool");

        let spawned = Command::new(tool)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false)
            .output()
            .await;

        match spawned {
            Ok(output) if output.status.success() => {
                debug!(%tool, "external tool succeeded");
                return Ok(());
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                last_diag = if stderr.is_empty() {
                    match output.status.code() {
                        Some(code) => format!("exit code {code}"),
                        None => "terminated by signal".to_string(),
                    }
                } else {
                    stderr.to_string()
                };
                warn!(%tool, diag = %last_diag, "external tool exited non-zero");
            }
            Err(e) => {
                last_diag = e.to_string();
                warn!(%tool, error = %e, "external tool failed to launch");
            }
        }
    }

    Err(ConvertError::ToolUnavailable {
        tool: last_tool,
        detail: last_diag,
    })
}

/// Best-effort availability check: launch `tool --version` with a short
/// timeout and report whether it looked alive.
///
/// "Alive" means exited zero *or* produced stdout — some tools print a
/// version banner yet exit non-zero when called without real work. This is
/// advisory telemetry only; it says "process launched and answered", not
/// "conversions will succeed".
pub async fn probe(tool: &str) -> bool {
    let attempt = Command::new(tool)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    match tokio::time::timeout(PROBE_TIMEOUT, attempt).await {
        Ok(Ok(output)) => output.status.success() || !output.stdout.is_empty(),
        Ok(Err(_)) | Err(_) => false,
    }
}

/// Probe an ordered candidate list: available if any candidate answers.
pub async fn probe_any(candidates: &[String]) -> bool {
    for tool in candidates {
        if probe(tool).await {
            return true;
        }
    }
    false
}
