//! CLI subcommands

pub mod posts;
pub mod read;
pub mod search;
