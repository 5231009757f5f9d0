#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod modfile;
pub mod ops;
pub mod paths;
pub mod validation;

pub use error::*;

pub fn run() -> Result<()> {
    use clap::Parser;

    let cli = cli::SyncCli::parse();
    command::sync::execute(cli.args)
}
