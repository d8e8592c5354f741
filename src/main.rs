use std::io::IsTerminal;

use clap::Parser;
use tracing::error;

use farewatch::adapter::inbound::cli::command::{Cli, ColorChoice, Commands};
use farewatch::adapter::inbound::cli::output::{self, OutputConfig};
use farewatch::adapter::inbound::cli::{operator, run, watch};
use farewatch::error::Result;
use farewatch::infrastructure::operator::entry::Operator;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(
        cli.json,
        cli.quiet,
        cli.verbose,
        use_color(&cli.color),
    ));

    if operator::install(Box::new(Operator)).is_err() {
        output::error("operator already installed");
        std::process::exit(1);
    }

    if let Err(e) = dispatch(&cli).await {
        error!(error = %e, "Command failed");
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => run::execute(&cli.config, args).await,
        Commands::List => watch::list(&cli.config).await,
        Commands::Check(arg) => watch::check(&cli.config, &arg.id).await,
        Commands::Add(args) => watch::add(&cli.config, &args.file).await,
        Commands::Remove(arg) => watch::remove(&cli.config, &arg.id).await,
    }
}

fn use_color(choice: &ColorChoice) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
        }
    }
}
