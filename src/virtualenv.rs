//! Running external commands, optionally inside a Python virtual
//! environment.
use async_trait::async_trait;
use log::*;
#[cfg(test)]
use mockall::automock;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tokio::{process::Command, sync::OnceCell};

use crate::error::{FreshenError, Result};

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Converts a failed run into `CommandFailed`.
    pub fn check(self, command: &str) -> Result<Self> {
        if self.success {
            return Ok(self);
        }

        Err(FreshenError::CommandFailed {
            command: command.to_string(),
            status: self
                .code
                .map(|c| format!("exit status {c}"))
                .unwrap_or_else(|| "terminated by signal".into()),
            output: format!("{}{}", self.stdout, self.stderr),
        })
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` in `cwd` and captures its output. Only
    /// failure to start the process is an error.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandOutput>;
}

async fn run_command(
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &[(&str, OsString)],
) -> Result<CommandOutput> {
    debug!("running {program} {} in {}", args.join(" "), cwd.display());

    let mut command = Command::new(program);
    command.args(args).current_dir(cwd);

    for (key, value) in env {
        command.env(key, value);
    }

    let output = command.output().await?;

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs commands with the inherited environment.
#[derive(Debug, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandOutput> {
        run_command(program, args, cwd, &[]).await
    }
}

/// A virtual environment created on first use. An existing directory at
/// the target path is reused as is.
#[derive(Debug)]
pub struct VirtualEnv {
    path: PathBuf,
    created: OnceCell<()>,
}

impl VirtualEnv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            created: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn env(&self) -> Result<Vec<(&'static str, OsString)>> {
        let bin = self.path.join("bin");
        let current = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![bin];
        paths.extend(std::env::split_paths(&current));

        let path = std::env::join_paths(paths)
            .map_err(|e| FreshenError::Other(e.into()))?;

        Ok(vec![
            ("PATH", path),
            ("VIRTUAL_ENV", self.path.clone().into_os_string()),
        ])
    }

    async fn create(&self) -> Result<()> {
        if self.path.is_dir() {
            return Ok(());
        }

        info!("creating virtual environment in {}", self.path.display());

        let cwd = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&cwd).await?;

        let args = vec![
            "-m".to_string(),
            "venv".to_string(),
            self.path.display().to_string(),
        ];
        run_command("python3", &args, &cwd, &[])
            .await?
            .check("python3 -m venv")?;

        let args = vec!["install".to_string(), "wheel".to_string()];
        run_command("pip", &args, &self.path, &self.env()?)
            .await?
            .check("pip install wheel")?;

        Ok(())
    }
}

#[async_trait]
impl CommandRunner for VirtualEnv {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandOutput> {
        self.created.get_or_try_init(|| self.create()).await?;
        run_command(program, args, cwd, &self.env()?).await
    }
}
