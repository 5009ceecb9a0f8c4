#![doc = include_str!("../README.md")]

mod error;
mod pitch_config;
pub mod utils;

pub use crate::{error::*, pitch_config::*};
