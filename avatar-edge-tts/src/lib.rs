#![doc = include_str!("../README.md")]
#![warn(missing_docs, rust_2018_idioms)]

mod edge_tts;
mod voices;

pub use crate::{edge_tts::*, voices::*};
