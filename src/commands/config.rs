// src/commands/config.rs
//
// `quiver config`: print the effective engine configuration as TOML.

use std::path::Path;
use std::process::ExitCode;

use super::{finish, load_config};
use crate::errors::CliError;

pub fn print_config(file: Option<&Path>) -> ExitCode {
    finish(render(file))
}

fn render(file: Option<&Path>) -> Result<(), CliError> {
    let text = load_config(file)?.to_toml_string()?;
    if let Some(path) = file {
        println!("# from {}", path.display());
    }
    print!("{text}");
    Ok(())
}
