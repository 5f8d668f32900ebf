mod cli;

pub use cli::{Cli, CliError, Command};
