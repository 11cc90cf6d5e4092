//! Core type definitions used across the crate.

mod opcode;
mod sample;

pub use opcode::*;
pub use sample::*;
