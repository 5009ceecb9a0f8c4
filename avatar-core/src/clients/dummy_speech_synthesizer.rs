use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{error::Error, traits::SpeechSynthesizer, Voice};

/// Header of a silent 8 kHz mono 16-bit WAV file without samples.
const EMPTY_WAV: &[u8] = &[
    b'R', b'I', b'F', b'F', 36, 0, 0, 0, b'W', b'A', b'V', b'E', b'f', b'm', b't', b' ', 16, 0, 0,
    0, 1, 0, 1, 0, 0x40, 0x1f, 0, 0, 0x80, 0x3e, 0, 0, 2, 0, 16, 0, b'd', b'a', b't', b'a', 0, 0,
    0, 0,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCall {
    pub text: String,
    pub voice: Voice,
    pub output: PathBuf,
}

/// Dummy SpeechSynthesizer for debug or tests.
///
/// Writes an empty WAV file to the requested output and records the call.
#[derive(Debug, Default)]
pub struct DummySpeechSynthesizer {
    pub calls: Mutex<Vec<SpeechCall>>,
    /// Skip writing the output file.
    pub write_nothing: bool,
}

impl DummySpeechSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl SpeechSynthesizer for DummySpeechSynthesizer {
    fn name(&self) -> &str {
        "dummy-tts"
    }

    fn synthesize(&self, text: &str, voice: &Voice, output: &Path) -> Result<(), Error> {
        self.calls.lock().unwrap().push(SpeechCall {
            text: text.to_owned(),
            voice: voice.clone(),
            output: output.to_owned(),
        });
        if !self.write_nothing {
            std::fs::write(output, EMPTY_WAV)?;
        }
        Ok(())
    }
}
