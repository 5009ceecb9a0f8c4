use std::{
    io::Write,
    path::{Path, PathBuf},
    process::Command,
};

use avatar_command::{CommandRunner, Tool};
use avatar_core::{Error, SpeechSynthesizer, Voice};
use tracing::debug;

/// The `edge-tts` executable.
pub const EDGE_TTS: Tool = Tool::new("edge-tts", "AVATAR_PITCH_EDGE_TTS", "speech.edge_tts_path");
/// The `ffmpeg` executable used to convert edge-tts output to WAV.
pub const FFMPEG: Tool = Tool::new("ffmpeg", "AVATAR_PITCH_FFMPEG", "speech.ffmpeg_path");

/// A [`SpeechSynthesizer`] running the `edge-tts` command line tool.
///
/// The text is handed over in a file, so text starting with `-` or longer
/// than the command line allows is safe. Both commands run in silent mode:
/// their output is only shown when they fail.
#[derive(Debug, Clone)]
pub struct EdgeTts {
    edge_tts: PathBuf,
    ffmpeg: PathBuf,
    rate: Option<String>,
    volume: Option<String>,
    pitch: Option<String>,
    runner: CommandRunner,
}

impl EdgeTts {
    /// Creates a new `EdgeTts` from resolved executable paths.
    pub fn new(edge_tts: impl Into<PathBuf>, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            edge_tts: edge_tts.into(),
            ffmpeg: ffmpeg.into(),
            rate: None,
            volume: None,
            pitch: None,
            runner: CommandRunner::silent(),
        }
    }

    /// Finds both executables, see [`Tool::resolve`].
    pub fn resolve(
        edge_tts: Option<&Path>,
        ffmpeg: Option<&Path>,
        extra_dirs: &[PathBuf],
    ) -> Result<Self, Error> {
        Ok(Self::new(
            EDGE_TTS.resolve(edge_tts, extra_dirs)?,
            FFMPEG.resolve(ffmpeg, extra_dirs)?,
        ))
    }

    /// Speaking rate relative to normal, e.g. `+10%` or `-5%`.
    pub fn rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    /// Volume relative to normal, e.g. `+0%`.
    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.volume = Some(volume.into());
        self
    }

    /// Pitch shift, e.g. `+5Hz`.
    pub fn pitch(mut self, pitch: impl Into<String>) -> Self {
        self.pitch = Some(pitch.into());
        self
    }

    /// The `edge-tts` invocation rendering `text_file` to `media`.
    pub fn edge_tts_command(&self, voice: &Voice, text_file: &Path, media: &Path) -> Command {
        let mut cmd = Command::new(&self.edge_tts);
        cmd.arg("--voice")
            .arg(voice.as_str())
            .arg("--file")
            .arg(text_file)
            .arg("--write-media")
            .arg(media);
        // `=` keeps negative values from being read as flags.
        if let Some(rate) = &self.rate {
            cmd.arg(format!("--rate={rate}"));
        }
        if let Some(volume) = &self.volume {
            cmd.arg(format!("--volume={volume}"));
        }
        if let Some(pitch) = &self.pitch {
            cmd.arg(format!("--pitch={pitch}"));
        }
        cmd
    }

    /// The `ffmpeg` invocation converting `media` to a WAV file at `output`.
    pub fn ffmpeg_command(&self, media: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
            .arg(media)
            .arg(output);
        cmd
    }
}

impl SpeechSynthesizer for EdgeTts {
    fn name(&self) -> &str {
        "edge-tts"
    }

    fn synthesize(&self, text: &str, voice: &Voice, output: &Path) -> Result<(), Error> {
        let work_dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut text_file = tempfile::Builder::new()
            .prefix("avatar-pitch-text-")
            .suffix(".txt")
            .tempfile_in(work_dir)?;
        text_file.write_all(text.as_bytes())?;
        text_file.flush()?;
        let text_file = text_file.into_temp_path();

        let media = tempfile::Builder::new()
            .prefix("avatar-pitch-")
            .suffix(".mp3")
            .tempfile_in(work_dir)?
            .into_temp_path();

        debug!(%voice, ?media, "Rendering speech with edge-tts");
        self.runner
            .run(&mut self.edge_tts_command(voice, &text_file, &media))?;
        debug!(?output, "Converting speech to WAV");
        self.runner.run(&mut self.ffmpeg_command(&media, output))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use avatar_command::command_line;

    use super::*;

    #[test]
    fn test_edge_tts_command() {
        let tts = EdgeTts::new("/opt/bin/edge-tts", "/opt/bin/ffmpeg");
        let cmd = tts.edge_tts_command(
            &Voice::new("en-GB-SoniaNeural"),
            Path::new("/tmp/text.txt"),
            Path::new("/tmp/speech.mp3"),
        );
        assert_eq!(
            command_line(&cmd),
            vec![
                "/opt/bin/edge-tts",
                "--voice",
                "en-GB-SoniaNeural",
                "--file",
                "/tmp/text.txt",
                "--write-media",
                "/tmp/speech.mp3",
            ]
        );
    }

    #[test]
    fn test_edge_tts_command_with_prosody() {
        let tts = EdgeTts::new("edge-tts", "ffmpeg")
            .rate("-10%")
            .volume("+0%")
            .pitch("+5Hz");
        let args = command_line(&tts.edge_tts_command(
            &Voice::new("en-US-GuyNeural"),
            Path::new("t.txt"),
            Path::new("m.mp3"),
        ));
        assert_eq!(
            &args[args.len() - 3..],
            ["--rate=-10%", "--volume=+0%", "--pitch=+5Hz"]
        );
    }

    #[test]
    fn test_ffmpeg_command() {
        let tts = EdgeTts::new("edge-tts", "ffmpeg");
        let cmd = tts.ffmpeg_command(Path::new("m.mp3"), Path::new("out.wav"));
        assert_eq!(
            command_line(&cmd),
            vec![
                "ffmpeg",
                "-y",
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                "m.mp3",
                "out.wav"
            ]
        );
    }
}
