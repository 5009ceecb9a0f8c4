use std::path::{Path, PathBuf};

use auto_impl::auto_impl;

use crate::{Error, Gender, RenderJob, Voice};

#[auto_impl(&, Box, Arc)]
pub trait VoiceSelector: Send + Sync {
    /// Maps a nationality/accent and a gender to a concrete voice.
    fn select_voice(&self, nationality: &str, gender: Gender) -> Result<Voice, Error>;
}

#[auto_impl(&, Box, Arc)]
pub trait SpeechSynthesizer: Send + Sync {
    /// Engine name shown in progress messages.
    fn name(&self) -> &str;

    /// Renders `text` with `voice` into a WAV file at `output`.
    ///
    /// `output` already exists (empty) when this is called and must be
    /// overwritten. Blocks until the audio is complete.
    fn synthesize(&self, text: &str, voice: &Voice, output: &Path) -> Result<(), Error>;
}

#[auto_impl(&, Box, Arc)]
pub trait AvatarRenderer: Send + Sync {
    /// Model name shown in progress messages.
    fn name(&self) -> &str;

    /// Animates `job.source_image` to `job.driven_audio`, writing into
    /// `job.result_dir`.
    ///
    /// Returns the videos produced by this call, newest last. The renderer
    /// chooses the file names.
    fn render(&self, job: &RenderJob<'_>) -> Result<Vec<PathBuf>, Error>;
}
