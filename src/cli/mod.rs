//! Command-line interface module.

mod args;
pub mod apply;
pub mod check;
pub mod common;
pub mod init;
pub mod replay;
pub mod watch;

pub use args::{Cli, Commands, PageArgs};
