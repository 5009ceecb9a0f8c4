use std::{path::PathBuf, sync::Mutex};

use anyhow::anyhow;

use crate::{error::Error, traits::AvatarRenderer, RenderJob, RenderOptions};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub source_image: PathBuf,
    pub driven_audio: PathBuf,
    /// Whether the driven audio existed when the renderer was called.
    pub audio_existed: bool,
    pub result_dir: PathBuf,
    pub options: RenderOptions,
}

/// Dummy AvatarRenderer for debug or tests.
///
/// Writes `dummy-N.mp4` into the result directory and records the call, or
/// fails without writing anything when `fail` is set.
#[derive(Debug, Default)]
pub struct DummyAvatarRenderer {
    pub calls: Mutex<Vec<RenderCall>>,
    pub fail: bool,
}

impl DummyAvatarRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl AvatarRenderer for DummyAvatarRenderer {
    fn name(&self) -> &str {
        "dummy-avatar"
    }

    fn render(&self, job: &RenderJob<'_>) -> Result<Vec<PathBuf>, Error> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(RenderCall {
            source_image: job.source_image.to_owned(),
            driven_audio: job.driven_audio.to_owned(),
            audio_existed: job.driven_audio.is_file(),
            result_dir: job.result_dir.to_owned(),
            options: job.options.clone(),
        });
        if self.fail {
            return Err(anyhow!("dummy avatar renderer failed").into());
        }
        let video = job.result_dir.join(format!("dummy-{}.mp4", calls.len()));
        std::fs::write(&video, b"")?;
        Ok(vec![video])
    }
}
