use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::Error;

/// An external executable the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Program name looked up in the search directories.
    pub program: &'static str,
    /// Environment variable that may hold the executable path.
    pub env_key: &'static str,
    /// Config file key that may hold the executable path.
    pub config_key: &'static str,
}

impl Tool {
    pub const fn new(
        program: &'static str,
        env_key: &'static str,
        config_key: &'static str,
    ) -> Self {
        Self {
            program,
            env_key,
            config_key,
        }
    }

    /// Finds the executable for this tool.
    ///
    /// Lookup order: `explicit`, then the tool's environment variable, then
    /// `extra_dirs`, then `PATH`. An explicit or environment value that is a
    /// bare program name is itself searched for in `extra_dirs` and `PATH`.
    pub fn resolve(
        &self,
        explicit: Option<&Path>,
        extra_dirs: &[PathBuf],
    ) -> Result<PathBuf, Error> {
        self.resolve_from(
            explicit,
            env::var_os(self.env_key),
            extra_dirs,
            env::var_os("PATH"),
        )
    }

    fn resolve_from(
        &self,
        explicit: Option<&Path>,
        env_value: Option<OsString>,
        extra_dirs: &[PathBuf],
        path_var: Option<OsString>,
    ) -> Result<PathBuf, Error> {
        let mut dirs = extra_dirs.to_vec();
        if let Some(path_var) = &path_var {
            dirs.extend(env::split_paths(path_var));
        }

        let requested = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_value.filter(|v| !v.is_empty()).map(PathBuf::from));
        let resolved = match requested {
            Some(requested) if is_bare_name(&requested) => search_dirs(&requested, &dirs),
            Some(requested) => {
                if requested.is_file() {
                    Some(requested)
                } else {
                    return Err(Error::NoToolFile(self.program.to_owned(), requested));
                }
            }
            None => search_dirs(Path::new(self.program), &dirs),
        };

        match resolved {
            Some(path) => {
                debug!(tool = self.program, ?path, "Resolved tool");
                Ok(path)
            }
            None => Err(Error::ToolNotFound {
                tool: self.program.to_owned(),
                hint: format!(
                    "Install it, or set `{}` in the config file or the {} environment variable.",
                    self.config_key, self.env_key
                ),
            }),
        }
    }
}

fn is_bare_name(path: &Path) -> bool {
    path.components().count() == 1 && !path.is_absolute()
}

fn search_dirs(name: &Path, dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in dirs {
        for candidate in candidates(&dir.join(name)) {
            if is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(windows)]
fn candidates(path: &Path) -> Vec<PathBuf> {
    if path.extension().is_some() {
        vec![path.to_path_buf()]
    } else {
        vec![path.to_path_buf(), path.with_extension("exe")]
    }
}

#[cfg(not(windows))]
fn candidates(path: &Path) -> Vec<PathBuf> {
    vec![path.to_path_buf()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const FFMPEG: Tool = Tool::new("ffmpeg", "AVATAR_PITCH_FFMPEG", "speech.ffmpeg_path");

    fn fake_executable(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }
        path
    }

    #[test]
    fn test_resolve_from_extra_dirs_before_path() {
        let extra = tempfile::tempdir().unwrap();
        let on_path = tempfile::tempdir().unwrap();
        let expected = fake_executable(extra.path(), "ffmpeg");
        fake_executable(on_path.path(), "ffmpeg");

        let path_var = env::join_paths([on_path.path()]).unwrap();
        let resolved = FFMPEG
            .resolve_from(None, None, &[extra.path().to_owned()], Some(path_var))
            .unwrap();
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_resolve_from_path() {
        let on_path = tempfile::tempdir().unwrap();
        let expected = fake_executable(on_path.path(), "ffmpeg");

        let path_var = env::join_paths([on_path.path()]).unwrap();
        let resolved = FFMPEG.resolve_from(None, None, &[], Some(path_var)).unwrap();
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_explicit_wins_over_env() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = fake_executable(dir.path(), "my-ffmpeg");
        let from_env = fake_executable(dir.path(), "env-ffmpeg");

        let resolved = FFMPEG
            .resolve_from(Some(&explicit), Some(from_env.into_os_string()), &[], None)
            .unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_env_value() {
        let dir = tempfile::tempdir().unwrap();
        let from_env = fake_executable(dir.path(), "env-ffmpeg");

        let resolved = FFMPEG
            .resolve_from(None, Some(from_env.clone().into_os_string()), &[], None)
            .unwrap();
        assert_eq!(resolved, from_env);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope").join("ffmpeg");
        let err = FFMPEG
            .resolve_from(Some(&missing), None, &[], None)
            .unwrap_err();
        assert!(
            matches!(err, Error::NoToolFile(ref tool, ref p) if tool == "ffmpeg" && *p == missing),
            "{err:?}"
        );
    }

    #[test]
    fn test_not_found_names_config_key_and_env() {
        let empty = tempfile::tempdir().unwrap();
        let path_var = env::join_paths([empty.path()]).unwrap();
        let err = FFMPEG.resolve_from(None, None, &[], Some(path_var)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("ffmpeg"), "{message}");
        assert!(message.contains("speech.ffmpeg_path"), "{message}");
        assert!(message.contains("AVATAR_PITCH_FFMPEG"), "{message}");
    }
}
