use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use avatar_core::{Pipeline, PipelineConfig, Preprocess, RenderOptions};
use avatar_edge_tts::{EdgeTts, VoiceCatalog, VoicePair, DEFAULT_NATIONALITY};
use avatar_sadtalker::SadTalker;
use fs_err as fs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Error;

/// The pipeline built from a [`PitchConfig`].
pub type PitchPipeline = Pipeline<VoiceCatalog, EdgeTts, SadTalker>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PitchConfig {
    // TOML format has a restriction that if a table itself contains tables,
    // all keys with non-table values must be emitted first.
    /// Directory for the temporary audio file. The OS temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    /// Leave the temporary audio file on disk.
    #[serde(default)]
    pub keep_audio: bool,
    /// Move the newest produced video to the requested output path.
    #[serde(default)]
    pub place_output: bool,
    /// Extra directories searched for executables before `PATH`.
    #[serde(default)]
    pub tool_dirs: Vec<PathBuf>,

    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// edge-tts executable. Falls back to AVATAR_PITCH_EDGE_TTS, then `PATH`.
    pub edge_tts_path: Option<PathBuf>,
    /// ffmpeg executable. Falls back to AVATAR_PITCH_FFMPEG, then `PATH`.
    pub ffmpeg_path: Option<PathBuf>,
    /// Speaking rate, e.g. `+10%`.
    pub rate: Option<String>,
    /// Volume, e.g. `-5%`.
    pub volume: Option<String>,
    /// Pitch, e.g. `+2Hz`.
    pub pitch: Option<String>,
    /// Nationality used for empty or unknown nationalities.
    #[serde(default = "default_nationality")]
    pub default_nationality: String,
    /// Voices added to, or replacing, the built-in catalog.
    #[serde(default)]
    pub voices: BTreeMap<String, VoicePair>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            edge_tts_path: None,
            ffmpeg_path: None,
            rate: None,
            volume: None,
            pitch: None,
            default_nationality: default_nationality(),
            voices: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AvatarConfig {
    /// Python interpreter of the SadTalker environment. Falls back to
    /// AVATAR_PITCH_PYTHON, then `PATH`.
    pub python_path: Option<PathBuf>,
    /// SadTalker checkout containing `inference.py`.
    #[serde(default = "default_sadtalker_dir")]
    pub sadtalker_dir: PathBuf,
    /// Relative to `sadtalker_dir` unless absolute.
    #[serde(default = "default_checkpoint_dir")]
    pub checkpoint_dir: PathBuf,
    #[serde(default)]
    pub preprocess: Preprocess,
    #[serde(default)]
    pub still_mode: bool,
    /// Face enhancer, e.g. `gfpgan`.
    pub enhancer: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Face model resolution, 256 or 512.
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub pose_style: u32,
    #[serde(default = "default_expression_scale")]
    pub expression_scale: f64,
    #[serde(default)]
    pub cpu: bool,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            python_path: None,
            sadtalker_dir: default_sadtalker_dir(),
            checkpoint_dir: default_checkpoint_dir(),
            preprocess: render.preprocess,
            still_mode: render.still_mode,
            enhancer: render.enhancer,
            batch_size: render.batch_size,
            size: render.size,
            pose_style: render.pose_style,
            expression_scale: render.expression_scale,
            cpu: render.cpu,
        }
    }
}

impl AvatarConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            preprocess: self.preprocess,
            still_mode: self.still_mode,
            enhancer: self.enhancer.clone(),
            batch_size: self.batch_size,
            size: self.size,
            pose_style: self.pose_style,
            expression_scale: self.expression_scale,
            cpu: self.cpu,
        }
    }
}

fn default_nationality() -> String {
    DEFAULT_NATIONALITY.to_owned()
}

fn default_sadtalker_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_checkpoint_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

fn default_batch_size() -> u32 {
    RenderOptions::default().batch_size
}

fn default_size() -> u32 {
    RenderOptions::default().size
}

fn default_expression_scale() -> f64 {
    RenderOptions::default().expression_scale
}

impl PitchConfig {
    pub fn try_new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_str(
            &fs::read_to_string(path.as_ref())
                .map_err(|e| Error::NoFile(path.as_ref().to_owned(), e))?,
            &path,
        )
    }

    /// Parses `s` as the contents of the config file at `path`.
    pub fn from_str<P: AsRef<Path>>(s: &str, path: P) -> Result<Self, Error> {
        let mut config: PitchConfig =
            toml::from_str(s).map_err(|e| Error::TomlParseFailure(path.as_ref().to_owned(), e))?;
        config.resolve_paths(path)?;
        debug!(?config, "Loaded config");
        Ok(config)
    }

    /// Makes relative paths relative to the directory of `path`.
    ///
    /// Executable paths that are bare program names stay as they are, so
    /// they are still looked up in `tool_dirs` and `PATH`.
    pub fn resolve_paths<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        let base = path.as_ref();
        if let Some(temp_dir) = &mut self.temp_dir {
            *temp_dir = resolve_relative_path(base, temp_dir)?;
        }
        for dir in &mut self.tool_dirs {
            *dir = resolve_relative_path(base, dir)?;
        }
        for exe in [
            &mut self.speech.edge_tts_path,
            &mut self.speech.ffmpeg_path,
            &mut self.avatar.python_path,
        ]
        .into_iter()
        .flatten()
        {
            if exe.components().count() > 1 {
                *exe = resolve_relative_path(base, exe)?;
            }
        }
        self.avatar.sadtalker_dir = resolve_relative_path(base, &self.avatar.sadtalker_dir)?;
        Ok(())
    }

    pub fn create_voice_catalog(&self) -> Result<VoiceCatalog, Error> {
        let mut catalog = VoiceCatalog::builtin();
        for (nationality, voices) in &self.speech.voices {
            catalog.insert(nationality, voices.clone());
        }
        catalog.set_fallback(&self.speech.default_nationality)?;
        Ok(catalog)
    }

    pub fn create_speech_synthesizer(&self) -> Result<EdgeTts, Error> {
        let speech = &self.speech;
        let mut tts = EdgeTts::resolve(
            speech.edge_tts_path.as_deref(),
            speech.ffmpeg_path.as_deref(),
            &self.tool_dirs,
        )?;
        if let Some(rate) = &speech.rate {
            tts = tts.rate(rate);
        }
        if let Some(volume) = &speech.volume {
            tts = tts.volume(volume);
        }
        if let Some(pitch) = &speech.pitch {
            tts = tts.pitch(pitch);
        }
        Ok(tts)
    }

    pub fn create_avatar_renderer(&self) -> Result<SadTalker, Error> {
        Ok(SadTalker::resolve(
            self.avatar.python_path.as_deref(),
            &self.avatar.sadtalker_dir,
            &self.avatar.checkpoint_dir,
            &self.tool_dirs,
        )?)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            temp_dir: self.temp_dir.clone(),
            keep_audio: self.keep_audio,
            place_output: self.place_output,
            render: self.avatar.render_options(),
        }
    }

    /// Resolves every external tool and builds the pipeline.
    pub fn create_pipeline(&self) -> Result<PitchPipeline, Error> {
        Ok(Pipeline::new(
            self.create_voice_catalog()?,
            self.create_speech_synthesizer()?,
            self.create_avatar_renderer()?,
            self.pipeline_config(),
        ))
    }
}

fn resolve_relative_path(base_path: &Path, path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }
    Ok(base_path
        .parent()
        .ok_or_else(|| Error::NoParentDirectory(base_path.to_owned()))?
        .join(path))
}
