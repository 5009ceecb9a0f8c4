use std::{
    io,
    path::{Path, PathBuf},
};

use tempfile::TempPath;
use tracing::debug;

use crate::Error;

/// The temporary WAV file that carries speech from the speech step to the
/// video step.
///
/// The file is removed when this value is dropped, so a failing step does
/// not leak it. A kept file is left on disk.
#[derive(Debug)]
pub struct TempAudio {
    path: PathBuf,
    guard: Option<TempPath>,
}

impl TempAudio {
    /// Creates an empty `.wav` file with a unique name in `dir`.
    pub fn create_in(dir: &Path, keep: bool) -> Result<Self, Error> {
        let temp_path = tempfile::Builder::new()
            .prefix("avatar-pitch-")
            .suffix(".wav")
            .tempfile_in(dir)
            .map_err(|e| Error::TempAudio(dir.to_owned(), e))?
            .into_temp_path();
        let path = temp_path.to_path_buf();
        debug!(?path, keep, "Created temporary audio file");
        if keep {
            let path = temp_path
                .keep()
                .map_err(|e| Error::TempAudio(dir.to_owned(), e.error))?;
            Ok(Self { path, guard: None })
        } else {
            Ok(Self {
                path,
                guard: Some(temp_path),
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_kept(&self) -> bool {
        self.guard.is_none()
    }

    /// Removes the file unless it is kept, and returns the kept path.
    ///
    /// A file that is already gone is not an error.
    pub fn release(self) -> Result<Option<PathBuf>, Error> {
        let Self { path, guard } = self;
        let Some(guard) = guard else {
            return Ok(Some(path));
        };
        match guard.close() {
            Ok(()) => {
                debug!(?path, "Removed temporary audio file");
                Ok(None)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(?path, "Temporary audio file was already removed");
                Ok(None)
            }
            Err(e) => Err(Error::Cleanup(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let audio = TempAudio::create_in(dir.path(), false).unwrap();
        let path = audio.path().to_owned();
        assert!(path.is_file());
        assert_eq!(path.extension().unwrap(), "wav");
        assert!(path.starts_with(dir.path()));

        assert_eq!(audio.release().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_release_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let audio = TempAudio::create_in(dir.path(), false).unwrap();
        std::fs::remove_file(audio.path()).unwrap();
        assert_eq!(audio.release().unwrap(), None);
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let audio = TempAudio::create_in(dir.path(), false).unwrap();
        let path = audio.path().to_owned();
        drop(audio);
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_file_survives() {
        let dir = tempfile::tempdir().unwrap();
        let audio = TempAudio::create_in(dir.path(), true).unwrap();
        assert!(audio.is_kept());
        let path = audio.path().to_owned();
        assert_eq!(audio.release().unwrap(), Some(path.clone()));
        assert!(path.is_file());
    }

    #[test]
    fn test_create_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = TempAudio::create_in(&missing, false).unwrap_err();
        assert!(matches!(err, Error::TempAudio(ref p, _) if *p == missing), "{err:?}");
    }
}
