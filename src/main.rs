use clap::{Parser, Subcommand};

use sable::commands::{self, BuildArgs, CleanArgs, InitArgs, ServeArgs};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: SableCommand,
}

#[derive(Subcommand)]
enum SableCommand {
    /// Create a new sable project
    Init(InitArgs),

    /// Build the project
    Build(BuildArgs),

    /// Build and serve the project on a local port
    Serve(ServeArgs),

    /// Delete generated output
    Clean(CleanArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    match args.command {
        SableCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        SableCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        SableCommand::Serve(args) => {
            commands::serve::run(&args).await?;
        }
        SableCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}
