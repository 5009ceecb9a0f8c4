#![doc = include_str!("../README.md")]

mod error;
mod progress;
mod runner;
mod tool;

pub use crate::{error::*, progress::*, runner::*, tool::*};
