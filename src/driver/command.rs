//! Reconciler command line.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::DriverConfig;

/// `<interpreter> <script> --config-file <path> [extra args]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCommand {
    interpreter: String,
    script: String,
    config_file: PathBuf,
    extra_args: Vec<String>,
}

impl DriverCommand {
    pub fn new(
        interpreter: impl Into<String>,
        script: impl Into<String>,
        config_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            config_file: config_file.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &DriverConfig, config_file: &Path) -> Self {
        Self::new(&config.interpreter, &config.script, config_file)
            .with_extra_args(config.extra_args.clone())
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    pub fn program(&self) -> &str {
        &self.interpreter
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.script.clone().into(),
            "--config-file".into(),
            self.config_file.clone().into_os_string(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    /// Diagnostics arrive on stderr; stdin and stdout are discarded.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        cmd.args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}
