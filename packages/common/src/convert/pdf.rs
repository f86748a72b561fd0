use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};

use super::error::ConversionError;
use crate::config::RenderConfig;

/// Renders documents to PDF by running an external headless office process.
///
/// Every render gets its own scratch directory holding the input, the output and the
/// renderer's user profile. The directory is a [`tempfile::TempDir`], so it is removed on
/// every exit path including timeouts and early returns.
///
/// On unix the renderer runs in its own process group, and a timeout kills the whole group.
/// Office launchers hand the work to a forked worker that would otherwise outlive them.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    scratch_dir: Option<PathBuf>,
}

impl PdfRenderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            scratch_dir: config.scratch_dir.clone(),
        }
    }

    /// Override the render timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn scratch(&self) -> Result<tempfile::TempDir, ConversionError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docvault-render-");
        let dir = match &self.scratch_dir {
            Some(parent) => {
                fs::create_dir_all(parent).await?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Render a `.docx` document to PDF bytes.
    pub async fn render_docx(&self, docx: &[u8]) -> Result<Vec<u8>, ConversionError> {
        let scratch = self.scratch().await?;
        let input = scratch.path().join("source.docx");
        let output = scratch.path().join("source.pdf");
        let profile = scratch.path().join("profile");

        fs::write(&input, docx).await?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(format!("-env:UserInstallation=file://{}", profile.display()))
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(scratch.path())
            .arg(&input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|err| {
            ConversionError::Render(format!("failed to start {}: {err}", self.program))
        })?;
        let pid = child.id();

        // Dropping the pending future on timeout drops the child, which kills it.
        let result = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(program = %self.program, timeout = ?self.timeout, "PDF render timed out");
                #[cfg(unix)]
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                return Err(ConversionError::Timeout(self.timeout));
            }
        };

        if !result.status.success() {
            return Err(ConversionError::Render(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        match fs::read(&output).await {
            Ok(pdf) => {
                debug!(input_size = docx.len(), output_size = pdf.len(), "PDF rendered");
                Ok(pdf)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ConversionError::MissingOutput)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// SIGKILL every process in the group led by `pgid`.
#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // SAFETY: kill(2) takes plain integers and touches no memory of ours.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
        debug!(pgid, "Renderer process group already gone");
    }
}
