use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use api_versioning::lifecycle::startup::load_and_build;
use api_versioning::RouteTable;

#[derive(Parser)]
#[command(name = "routes-cli")]
#[command(about = "Inspect the route table built from an API versioning config", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every registered route
    Resolve {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Validate config and detect conflicts, print nothing on success
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let table = match load_and_build(&cli.config) {
        Ok((_, table)) => table,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Resolve { json: true } => match serde_json::to_string_pretty(table.routes()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        Commands::Resolve { json: false } => print_table(&table),
        Commands::Check => {}
    }

    ExitCode::SUCCESS
}

fn print_table(table: &RouteTable) {
    for route in table {
        let mut conditions: Vec<String> = Vec::new();
        for (name, values) in route.header_conditions().iter() {
            conditions.push(format!("header {}={}", name, join(values)));
        }
        for (name, values) in route.query_conditions().iter() {
            conditions.push(format!("query {}={}", name, join(values)));
        }

        println!(
            "{:<32} {:<12} {:<40} {}",
            route.handler().to_string(),
            route.methods().to_string(),
            route.paths().iter().cloned().collect::<Vec<_>>().join(","),
            conditions.join(" "),
        );
    }
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values.into_iter().map(String::as_str).collect::<Vec<_>>().join("|")
}
