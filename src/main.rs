//! tcache - a persisted lookup cache for test-reference resolution
//!
//! tcache sits in front of slower test finders: once a reference has been
//! resolved into test info records, the answer is served from a JSON store
//! on disk instead of repeating discovery.

use anyhow::Result;
use clap::Parser;

mod cache;
mod cli;
mod core;
mod finders;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
