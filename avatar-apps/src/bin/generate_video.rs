use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context as _, Result};
use avatar_apps::{
    utils::{get_apps_config_path, init_tracing},
    PitchConfig,
};
use avatar_core::{Gender, PitchRequest, ProgressReporter};
use clap::Parser;
use tracing::debug;

/// Generate a talking avatar video from an image and a pitch text.
#[derive(Parser, Debug)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct GenerateVideoArgs {
    /// Path to the avatar image.
    #[clap(long, required_unless_present = "show_default_config")]
    image: Option<PathBuf>,
    /// Pitch text to be spoken.
    #[clap(
        long,
        required_unless_present = "show_default_config",
        allow_hyphen_values = true
    )]
    text: Option<String>,
    /// Output video path. The video is written to its directory.
    #[clap(long, required_unless_present = "show_default_config")]
    output: Option<PathBuf>,
    /// Voice gender (male/female).
    #[clap(long, default_value = "male")]
    gender: Gender,
    /// Voice accent/nationality, e.g. british or en-IN.
    #[clap(long, default_value = "")]
    nationality: String,
    /// Path to the setting file.
    #[clap(short, long)]
    config_path: Option<PathBuf>,
    /// Leave the temporary audio file on disk.
    #[clap(long)]
    keep_audio: bool,
    /// Prints the default setting as TOML.
    #[clap(long)]
    show_default_config: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let args = GenerateVideoArgs::parse();
    debug!(?args);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_code(&e)
        }
    }
}

fn run(args: GenerateVideoArgs) -> Result<()> {
    if args.show_default_config {
        print!("{}", toml::to_string(&PitchConfig::default())?);
        return Ok(());
    }

    let mut config = match get_apps_config_path(args.config_path) {
        Some(config_path) => PitchConfig::try_new(config_path)?,
        None => PitchConfig::default(),
    };
    config.keep_audio |= args.keep_audio;

    let request = PitchRequest {
        image: args.image.context("--image is required")?,
        text: args.text.context("--text is required")?,
        gender: args.gender,
        nationality: args.nationality,
        output: args.output.context("--output is required")?,
    };

    let pipeline = config.create_pipeline()?;
    let outcome = pipeline.run(&request, &mut ProgressReporter::stdout())?;
    debug!(?outcome);
    Ok(())
}

/// The exit code of the failed subprocess, or 1.
fn exit_code(e: &anyhow::Error) -> ExitCode {
    let code = if let Some(e) = e.downcast_ref::<avatar_apps::Error>() {
        e.exit_code()
    } else if let Some(e) = e.downcast_ref::<avatar_core::Error>() {
        e.exit_code()
    } else {
        None
    };
    match code.and_then(|c| u8::try_from(c).ok()) {
        Some(c) if c != 0 => ExitCode::from(c),
        _ => ExitCode::FAILURE,
    }
}
