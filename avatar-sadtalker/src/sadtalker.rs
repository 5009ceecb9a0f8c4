use std::{
    collections::HashSet,
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
    time::SystemTime,
};

use avatar_command::{CommandRunner, Tool};
use avatar_core::{AvatarRenderer, Error, RenderJob, RenderOptions};
use fs_err as fs;
use tracing::{debug, info};

/// The Python interpreter of the SadTalker environment.
pub const PYTHON: Tool = Tool::new("python", "AVATAR_PITCH_PYTHON", "avatar.python_path");

/// Entry point of a SadTalker checkout.
pub const INFERENCE_SCRIPT: &str = "inference.py";

/// An [`AvatarRenderer`] running SadTalker's `inference.py`.
///
/// The script runs from the SadTalker checkout directory in live mode.
/// SadTalker names its result after the current time, so the renderer
/// reports the `.mp4` files that appeared in the result directory during the
/// run.
#[derive(Debug, Clone)]
pub struct SadTalker {
    python: PathBuf,
    root: PathBuf,
    checkpoint_dir: PathBuf,
    runner: CommandRunner,
}

impl SadTalker {
    /// Creates a new `SadTalker`.
    ///
    /// `checkpoint_dir` is relative to `root` unless absolute.
    pub fn new(
        python: impl Into<PathBuf>,
        root: impl Into<PathBuf>,
        checkpoint_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            python: python.into(),
            root: root.into(),
            checkpoint_dir: checkpoint_dir.into(),
            runner: CommandRunner::live(),
        }
    }

    /// Checks that `root` is a SadTalker checkout and finds the interpreter.
    pub fn resolve(
        python: Option<&Path>,
        root: &Path,
        checkpoint_dir: &Path,
        extra_dirs: &[PathBuf],
    ) -> Result<Self, Error> {
        let script = root.join(INFERENCE_SCRIPT);
        if !script.is_file() {
            return Err(Error::NoFile(script));
        }
        Ok(Self::new(
            PYTHON.resolve(python, extra_dirs)?,
            root,
            checkpoint_dir,
        ))
    }

    /// The `inference.py` invocation for `job`. Paths in `job` must be
    /// absolute, since the command runs from the checkout directory.
    pub fn command(&self, job: &RenderJob<'_>) -> Command {
        let options: &RenderOptions = job.options;
        let mut cmd = Command::new(&self.python);
        cmd.current_dir(&self.root)
            .env("KMP_DUPLICATE_LIB_OK", "TRUE")
            .arg(INFERENCE_SCRIPT)
            .arg("--driven_audio")
            .arg(job.driven_audio)
            .arg("--source_image")
            .arg(job.source_image)
            .arg("--result_dir")
            .arg(job.result_dir)
            .arg("--checkpoint_dir")
            .arg(&self.checkpoint_dir)
            .arg("--preprocess")
            .arg(options.preprocess.as_str())
            .arg("--batch_size")
            .arg(options.batch_size.to_string())
            .arg("--size")
            .arg(options.size.to_string())
            .arg("--pose_style")
            .arg(options.pose_style.to_string())
            .arg("--expression_scale")
            .arg(options.expression_scale.to_string());
        if options.still_mode {
            cmd.arg("--still");
        }
        if let Some(enhancer) = &options.enhancer {
            cmd.arg("--enhancer").arg(enhancer);
        }
        if options.cpu {
            cmd.arg("--cpu");
        }
        cmd
    }
}

impl AvatarRenderer for SadTalker {
    fn name(&self) -> &str {
        "SadTalker"
    }

    fn render(&self, job: &RenderJob<'_>) -> Result<Vec<PathBuf>, Error> {
        let source_image = existing_absolute(job.source_image)?;
        let driven_audio = existing_absolute(job.driven_audio)?;
        let result_dir = existing_absolute(job.result_dir)?;
        let absolute = RenderJob {
            source_image: &source_image,
            driven_audio: &driven_audio,
            result_dir: &result_dir,
            options: job.options,
        };

        let before = list_videos(&result_dir)?;
        info!(?source_image, ?driven_audio, ?result_dir, "Running SadTalker");
        self.runner.run(&mut self.command(&absolute))?;
        let produced = new_videos(&before, list_videos(&result_dir)?);
        debug!(?produced, "SadTalker finished");
        Ok(produced)
    }
}

/// `path` made absolute against the current directory.
///
/// Unlike `canonicalize` this never produces `\\?\` paths on Windows, which
/// the model's video tooling does not accept.
fn existing_absolute(path: &Path) -> Result<PathBuf, Error> {
    if !path.exists() {
        return Err(Error::NoFile(path.to_owned()));
    }
    Ok(std::path::absolute(path)?)
}

fn list_videos(dir: &Path) -> Result<Vec<(PathBuf, SystemTime)>, Error> {
    let mut videos = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_mp4 = path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case(OsStr::new("mp4")));
        if is_mp4 && path.is_file() {
            let modified = fs::metadata(&path)?.modified()?;
            videos.push((path, modified));
        }
    }
    Ok(videos)
}

/// Videos in `after` that are new or were rewritten since `before`, oldest
/// first.
fn new_videos(
    before: &[(PathBuf, SystemTime)],
    after: Vec<(PathBuf, SystemTime)>,
) -> Vec<PathBuf> {
    let before: HashSet<_> = before.iter().collect();
    let mut produced: Vec<_> = after
        .into_iter()
        .filter(|video| !before.contains(video))
        .collect();
    produced.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    produced.into_iter().map(|(path, _)| path).collect()
}
