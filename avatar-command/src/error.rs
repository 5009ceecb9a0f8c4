use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("avatar-command: Failed to execute Command {:?}.", .0)]
    CommandExecutionFailure(Vec<String>, #[source] std::io::Error),
    #[error(
        "avatar-command: Command {:?} failed with {}.",
        command,
        code.map_or_else(|| "no exit code".to_owned(), |c| format!("exit code {c}"))
    )]
    CommandFailure {
        command: Vec<String>,
        code: Option<i32>,
    },
    #[error("avatar-command: Failed to forward output of {:?}.", .0)]
    Output(Vec<String>, #[source] std::io::Error),
    #[error("avatar-command: No {} executable is found. {}", tool, hint)]
    ToolNotFound { tool: String, hint: String },
    #[error("avatar-command: Configured {} executable {:?} does not exist.", .0, .1)]
    NoToolFile(String, PathBuf),
}

impl Error {
    /// Exit code of the failed command, if the command ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::CommandFailure { code, .. } => *code,
            _ => None,
        }
    }
}
