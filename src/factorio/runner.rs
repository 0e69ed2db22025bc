//! Running the game inside a prepared instance directory.

use anyhow::Result;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use super::instance::GAME_BINARY;
use crate::core::ExportError;

/// Name of the save the game creates for the control stage.
const SAVE_NAME: &str = "dump.zip";

/// Runs the game and captures its output.
pub trait GameRunner: Send + Sync {
    /// Run the game in the prepared `working_directory` and return everything
    /// it printed.
    fn run(&self, working_directory: &Path) -> impl Future<Output = Result<String>> + Send;
}

/// Runs the real game binary as a child process.
///
/// Two runs are needed: `--create` loads the data stage and writes a save,
/// `--benchmark` loads that save for a single tick, which fires the control
/// stage. The output of both runs is concatenated.
#[derive(Debug, Clone)]
pub struct ProcessGameRunner {
    executable: PathBuf,
    timeout: Duration,
}

impl ProcessGameRunner {
    /// Create a runner whose processes get killed after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            executable: PathBuf::from(GAME_BINARY),
            timeout,
        }
    }

    /// Use another executable, relative to the working directory or absolute.
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    async fn execute(&self, working_directory: &Path, args: &[&str]) -> Result<String, ExportError> {
        let executable = working_directory.join(&self.executable);
        tracing::debug!(target: "factorio", "Running {} {}", executable.display(), args.join(" "));

        let mut command = Command::new(&executable);
        command
            .args(args)
            .current_dir(working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| ExportError::GameProcess {
                reason: format!("Failed to start {}: {e}", executable.display()),
            })?,
            Err(_) => {
                return Err(ExportError::GameTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let reason = if stderr.trim().is_empty() {
                let lines: Vec<&str> = stdout.lines().collect();
                lines[lines.len().saturating_sub(5)..].join("\n")
            } else {
                stderr.trim().to_string()
            };
            return Err(ExportError::GameProcess {
                reason: format!("{} ({})", reason, output.status),
            });
        }

        Ok(format!("{stdout}{stderr}"))
    }
}

impl GameRunner for ProcessGameRunner {
    async fn run(&self, working_directory: &Path) -> Result<String> {
        let save = working_directory.join(SAVE_NAME);
        let save = save.to_string_lossy();
        let config = working_directory.join("config").join("config.ini");
        let config = config.to_string_lossy();
        let mods = working_directory.join("mods");
        let mods = mods.to_string_lossy();

        let mut output = self
            .execute(
                working_directory,
                &["--no-log-rotation", "--config", &config, "--mod-directory", &mods, "--create", &save],
            )
            .await?;
        output.push_str(
            &self
                .execute(
                    working_directory,
                    &[
                        "--no-log-rotation",
                        "--config",
                        &config,
                        "--mod-directory",
                        &mods,
                        "--benchmark",
                        &save,
                        "--benchmark-ticks",
                        "1",
                    ],
                )
                .await?,
        );
        Ok(output)
    }
}
