use std::{
    env,
    io::Write,
    path::{Path, PathBuf},
};

use fs_err as fs;
use tracing::{info, warn};

use crate::{
    AvatarRenderer, Error, Gender, ProgressReporter, RenderJob, RenderOptions, SpeechSynthesizer,
    Step, TempAudio, VoiceSelector,
};

/// What to render, as given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchRequest {
    pub image: PathBuf,
    pub text: String,
    pub gender: Gender,
    pub nationality: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Directory for the temporary audio file. The OS temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    /// Leave the temporary audio file on disk.
    pub keep_audio: bool,
    /// Move the newest produced video to the requested output path when the
    /// avatar model named it differently.
    pub place_output: bool,
    pub render: RenderOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitchOutcome {
    /// The output path that was requested.
    pub output: PathBuf,
    /// Videos produced by the avatar model, newest last.
    pub videos: Vec<PathBuf>,
    /// The temporary audio file, if it was kept.
    pub kept_audio: Option<PathBuf>,
}

/// Runs speech synthesis, video synthesis and cleanup in order.
///
/// Every step is terminal on failure; there are no retries.
#[derive(Debug)]
pub struct Pipeline<V, S, A> {
    voices: V,
    speech: S,
    avatar: A,
    config: PipelineConfig,
}

impl<V, S, A> Pipeline<V, S, A>
where
    V: VoiceSelector,
    S: SpeechSynthesizer,
    A: AvatarRenderer,
{
    pub fn new(voices: V, speech: S, avatar: A, config: PipelineConfig) -> Self {
        Self {
            voices,
            speech,
            avatar,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run<W: Write>(
        &self,
        request: &PitchRequest,
        progress: &mut ProgressReporter<W>,
    ) -> Result<PitchOutcome, Error> {
        progress.start()?;

        progress.step(
            1,
            format_args!("Generating speech audio with {}...", self.speech.name()),
        )?;
        let voice = self
            .voices
            .select_voice(&request.nationality, request.gender)
            .map_err(|e| e.in_step(Step::SelectVoice))?;
        info!(
            %voice,
            nationality = %request.nationality,
            gender = %request.gender,
            "Selected voice"
        );
        let temp_dir = self.config.temp_dir.clone().unwrap_or_else(env::temp_dir);
        let audio = TempAudio::create_in(&temp_dir, self.config.keep_audio)
            .map_err(|e| e.in_step(Step::SynthesizeSpeech))?;
        self.speech
            .synthesize(&request.text, &voice, audio.path())
            .and_then(|()| ensure_non_empty(self.speech.name(), audio.path()))
            .map_err(|e| e.in_step(Step::SynthesizeSpeech))?;

        progress.step(
            2,
            format_args!("Generating video with {}...", self.avatar.name()),
        )?;
        let result_dir = result_dir(&request.output);
        let mut videos = fs::create_dir_all(&result_dir)
            .map_err(Error::from)
            .and_then(|()| {
                self.avatar.render(&RenderJob {
                    source_image: &request.image,
                    driven_audio: audio.path(),
                    result_dir: &result_dir,
                    options: &self.config.render,
                })
            })
            .map_err(|e| e.in_step(Step::SynthesizeVideo))?;
        info!(?videos, "Avatar model finished");

        progress.step(3, "Cleaning up temporary files...")?;
        let kept_audio = audio.release().map_err(|e| e.in_step(Step::Cleanup))?;
        if let Some(path) = &kept_audio {
            info!(?path, "Kept temporary audio file");
        }

        if self.config.place_output {
            place_output(&mut videos, &request.output)
                .map_err(|e| e.in_step(Step::PlaceOutput))?;
        }
        for video in &videos {
            progress.result(video)?;
        }
        progress.complete(&request.output)?;

        Ok(PitchOutcome {
            output: request.output.clone(),
            videos,
            kept_audio,
        })
    }
}

/// The directory the avatar model writes into: the parent of `output`, or
/// the current directory when `output` is a bare file name.
pub fn result_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => PathBuf::from("."),
    }
}

fn ensure_non_empty(producer: &str, path: &Path) -> Result<(), Error> {
    match path.metadata() {
        Ok(m) if m.len() > 0 => Ok(()),
        _ => Err(Error::MissingOutput(producer.to_owned(), path.to_owned())),
    }
}

fn place_output(videos: &mut Vec<PathBuf>, output: &Path) -> Result<(), Error> {
    if output.exists() {
        return Ok(());
    }
    let Some(newest) = videos.pop() else {
        warn!(?output, "No video was produced to place at the requested output");
        return Ok(());
    };
    fs::rename(&newest, output)?;
    info!(from = ?newest, to = ?output, "Moved produced video to requested output");
    videos.push(output.to_owned());
    Ok(())
}
