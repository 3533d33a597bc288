//! CLI subcommands.

pub mod common;
pub mod levels;
pub mod locate;
pub mod select;
pub mod tiles;
