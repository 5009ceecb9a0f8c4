use std::{
    fmt,
    io::{self, Write},
    path::Path,
};

use tracing::info;

/// Number of steps announced by [`ProgressReporter`].
pub const TOTAL_STEPS: usize = 4;

/// Writes the line-oriented progress protocol read by callers of the
/// `generate_video` binary.
#[derive(Debug)]
pub struct ProgressReporter<W> {
    out: W,
}

impl ProgressReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn start(&mut self) -> io::Result<()> {
        self.line(format_args!(
            "[Progress] Starting video pitch generation pipeline ({TOTAL_STEPS} steps)"
        ))
    }

    pub fn step(&mut self, step: usize, message: impl fmt::Display) -> io::Result<()> {
        info!(step, total = TOTAL_STEPS, "{message}");
        self.line(format_args!("[{step}/{TOTAL_STEPS}] {message}"))
    }

    /// Reports a video written by the avatar model.
    pub fn result(&mut self, path: &Path) -> io::Result<()> {
        self.line(format_args!("[Result] {}", path.display()))
    }

    pub fn complete(&mut self, output: &Path) -> io::Result<()> {
        self.step(
            TOTAL_STEPS,
            format_args!("Video generated at {}", output.display()),
        )?;
        self.line(format_args!("[✅] Complete!"))
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.out.write_fmt(args)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
