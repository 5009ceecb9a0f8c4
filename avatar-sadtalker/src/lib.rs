#![doc = include_str!("../README.md")]
#![warn(missing_docs, rust_2018_idioms)]

mod sadtalker;

pub use crate::sadtalker::*;
