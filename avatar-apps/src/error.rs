use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("avatar-apps: Failed to parse {:?} as toml.", .0)]
    TomlParseFailure(PathBuf, #[source] toml::de::Error),
    #[error("avatar-apps: No File {:?} is found.", .0)]
    NoFile(PathBuf, #[source] std::io::Error),
    #[error("avatar-apps: No ParentDirectory {:?} is found.", .0)]
    NoParentDirectory(PathBuf),
    #[error(transparent)]
    AvatarCore(#[from] avatar_core::Error),
}

impl Error {
    /// Exit code of the external command that caused this error, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::AvatarCore(e) => e.exit_code(),
            _ => None,
        }
    }
}

impl From<avatar_command::Error> for Error {
    fn from(e: avatar_command::Error) -> Self {
        Error::AvatarCore(e.into())
    }
}
