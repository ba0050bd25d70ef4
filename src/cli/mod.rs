use clap::Parser;
use error_stack::Result;
use roster::http::StartServerError;

mod server;

/// Command line options for the roster backend.
#[derive(Debug, Parser)]
#[command(about = "Utility suite for the roster backend", version, author)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), StartServerError> {
        match self.subcommand {
            Subcommand::Server(args) => self::server::run(args),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    /// Expose the roster API HTTP server
    Server(self::server::ServerCommand),
}
