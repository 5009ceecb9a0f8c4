use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::Gender;

/// A step of the pipeline, used to tell failures apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SelectVoice,
    SynthesizeSpeech,
    SynthesizeVideo,
    Cleanup,
    PlaceOutput,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::SelectVoice => "voice selection",
            Step::SynthesizeSpeech => "speech synthesis",
            Step::SynthesizeVideo => "video synthesis",
            Step::Cleanup => "cleanup",
            Step::PlaceOutput => "output placement",
        })
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("avatar-core: No voice for nationality={:?} gender={}.", nationality, gender)]
    NoVoice { nationality: String, gender: Gender },
    #[error("avatar-core: Unknown gender {:?} (expected male or female).", .0)]
    UnknownGender(String),
    #[error("avatar-core: Unknown preprocess mode {:?}.", .0)]
    UnknownPreprocess(String),
    #[error("avatar-core: No File {:?} is found.", .0)]
    NoFile(PathBuf),
    #[error("avatar-core: {} produced no output at {:?}.", .0, .1)]
    MissingOutput(String, PathBuf),
    #[error("avatar-core: Failed to create temporary audio file in {:?}.", .0)]
    TempAudio(PathBuf, #[source] io::Error),
    #[error("avatar-core: Failed to remove {:?}.", .0)]
    Cleanup(PathBuf, #[source] io::Error),
    #[error("avatar-core: {} failed", step)]
    Step {
        step: Step,
        #[source]
        source: Box<Error>,
    },
    #[error(transparent)]
    Command(#[from] avatar_command::Error),
    #[error("avatar-core: io error")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Wraps this error with the pipeline step it happened in.
    pub fn in_step(self, step: Step) -> Self {
        Error::Step {
            step,
            source: Box::new(self),
        }
    }

    /// The outermost pipeline step this error is attributed to.
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Exit code of the external command that caused this error, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::Step { source, .. } => source.exit_code(),
            Error::Command(e) => e.exit_code(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_through_step() {
        let err = Error::from(avatar_command::Error::CommandFailure {
            command: vec!["python".into(), "inference.py".into()],
            code: Some(7),
        })
        .in_step(Step::SynthesizeVideo);
        assert_eq!(err.step(), Some(Step::SynthesizeVideo));
        assert_eq!(err.exit_code(), Some(7));
        assert!(err.to_string().contains("video synthesis failed"), "{err}");
    }

    #[test]
    fn test_no_exit_code() {
        let err = Error::NoVoice {
            nationality: "martian".into(),
            gender: Gender::Female,
        }
        .in_step(Step::SelectVoice);
        assert_eq!(err.exit_code(), None);
        assert_eq!(err.to_string(), "avatar-core: voice selection failed");
        // the cause is reported once, through the source chain
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "avatar-core: voice selection failed: avatar-core: No voice for nationality=\"martian\" gender=female."
        );
    }
}
