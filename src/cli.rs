use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tmc")]
#[command(version)]
#[command(about = "TMC command-line client")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Finish installing a freshly downloaded update
    #[arg(long = "internal-update", hide = true)]
    pub internal_update: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check for a newer tmc-cli release and offer to install it
    Update,
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
