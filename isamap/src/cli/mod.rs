//! Command-line surface of the host binary

pub mod args;

pub use args::{Args, Command};
