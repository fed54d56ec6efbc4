use clap::Parser;
use overwatch_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;
use commands::{compare, impedance, locate, simulate, table};

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install log subscriber: {err}");
    }

    let result = match &cli.command {
        Commands::Table { command } => table::handle(command),
        Commands::Locate {
            table,
            frame,
            config,
            threshold,
            format,
        } => locate::handle(table, frame, config.as_deref(), *threshold, *format),
        Commands::Simulate {
            fault,
            noise,
            seed,
            config,
            out,
            format,
        } => simulate::handle(
            fault,
            *noise,
            *seed,
            config.as_deref(),
            out.as_deref(),
            *format,
        ),
        Commands::Compare(args) => compare::handle(args),
        Commands::Impedance {
            fault,
            policy,
            config,
            format,
        } => impedance::handle(fault, policy, config.as_deref(), *format),
    };

    if let Err(err) = result {
        error!("{err:#}");
        std::process::exit(1);
    }
}
