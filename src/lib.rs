pub mod array;
pub mod cli;
pub mod commands;
pub mod copy;
pub mod dims;
pub mod engine;
pub mod formats;
pub mod mapping;
pub mod model;
pub mod runtime;
pub mod workflow;

pub fn run_cli() -> Result<(), String> {
    cli::run_cli()
}
