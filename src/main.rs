use clap::Parser;
use clap::Subcommand;
use commands::publish::Publish;
use commands::show::Show;

mod commands;
mod config;
mod core;
mod errors;
mod git;
mod parser;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "pickpush")]
#[command(
    about = "Cherry-pick fixed sets of commits onto fresh branches and publish them",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build every branch of the plan and push it
    Publish(Publish),
    /// Print the resolved plan without touching the repository
    Show(Show),
}

fn main() {
    env_logger::init();

    let args = Cli::parse();

    let result = match args.command {
        Commands::Publish(publish) => publish.execute(),
        Commands::Show(show) => show.execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
