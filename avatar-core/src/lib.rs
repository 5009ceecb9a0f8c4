#![doc = include_str!("../README.md")]

mod clients;
mod error;
mod pipeline;
mod progress;
mod temp_audio;
mod traits;
mod types;

pub use clients::*;
pub use error::*;
pub use pipeline::*;
pub use progress::*;
pub use temp_audio::*;
pub use traits::*;
pub use types::*;

// re-export
pub use avatar_command::{CommandRunner, OutputMode, Tool};
