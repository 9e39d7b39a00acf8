mod analytics;
mod anomaly;
mod cli;
mod error;
mod filters;
mod fmt;
mod models;
mod settings;
mod store;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let ledger = cli.ledger.as_deref();

    let result = match &cli.command {
        Commands::Init { file } => cli::status::init(file),
        Commands::Demo { output } => cli::demo::run(output.as_deref()),
        Commands::Status => cli::status::run(ledger),
        Commands::Summary { filters } => cli::report::summary(ledger, filters),
        Commands::Timeline { freq, filters } => {
            cli::report::timeline(ledger, freq.as_deref(), filters)
        }
        Commands::Weekdays { filters } => cli::report::weekdays(ledger, filters),
        Commands::Categories { segment, filters } => {
            cli::report::categories(ledger, segment, filters)
        }
        Commands::Merchants { filters } => cli::report::merchants(ledger, filters),
        Commands::Histogram { filters } => cli::report::histogram(ledger, filters),
        Commands::Trend { group, filters } => cli::report::trend(ledger, group, filters),
        Commands::Benford {
            include_negatives_zeros,
            filters,
        } => cli::report::benford(ledger, *include_negatives_zeros, filters),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
